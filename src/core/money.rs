//! Monetary constants and fixed-point helpers shared by every component.

use crate::core::error::EngineError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Maximum number of fractional digits carried by stored amounts.
pub const MONEY_SCALE: u32 = 4;

/// Fractional digits of the default minor unit (cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Largest amount accepted for an expense, a split or a settlement.
///
/// `Decimal` holds 96 bits of mantissa (about 7.9 × 10²⁸), so folding up to
/// 10¹⁶ records of this size into a balance, or multiplying one by a
/// percentage, cannot overflow.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Balances whose magnitude is below this value count as settled.
pub const SETTLED_EPSILON: Decimal = dec!(0.01);

/// Whether a balance lies inside the settled band `(-ε, +ε)`.
pub fn is_settled(balance: Decimal) -> bool {
    balance.abs() < SETTLED_EPSILON
}

/// Validate a monetary amount that must be strictly positive and carry at
/// most [`MONEY_SCALE`] fractional digits. Returns the normalized amount.
pub fn positive_amount(amount: Decimal) -> Result<Decimal, EngineError> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::InvalidAmount {
            amount,
            reason: "must be positive",
        });
    }
    fits_scale(amount)
}

/// Validate that an amount is at most [`MAX_AMOUNT`] in magnitude and has no
/// more than [`MONEY_SCALE`] fractional digits.
pub fn fits_scale(amount: Decimal) -> Result<Decimal, EngineError> {
    if amount.abs() > MAX_AMOUNT {
        return Err(EngineError::InvalidAmount {
            amount,
            reason: "amount out of range",
        });
    }
    let normalized = amount.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(EngineError::InvalidAmount {
            amount,
            reason: "more than 4 fractional digits",
        });
    }
    Ok(normalized)
}

/// The minor unit used when spreading a remainder: cents for amounts with up
/// to two fractional digits, otherwise the amount's own precision.
pub fn minor_unit_scale(amount: Decimal) -> u32 {
    amount
        .normalize()
        .scale()
        .clamp(MINOR_UNIT_SCALE, MONEY_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_band() {
        assert!(is_settled(Decimal::ZERO));
        assert!(is_settled(dec!(0.0099)));
        assert!(is_settled(dec!(-0.0099)));
        assert!(!is_settled(dec!(0.01)));
        assert!(!is_settled(dec!(-0.01)));
    }

    #[test]
    fn test_positive_amount() {
        assert_eq!(positive_amount(dec!(12.50)).unwrap(), dec!(12.5));
        assert!(positive_amount(Decimal::ZERO).is_err());
        assert!(positive_amount(dec!(-3)).is_err());
        assert!(positive_amount(dec!(1.00001)).is_err());
    }

    #[test]
    fn test_amount_upper_bound() {
        assert_eq!(positive_amount(MAX_AMOUNT).unwrap(), MAX_AMOUNT);
        assert_eq!(
            positive_amount(MAX_AMOUNT + dec!(0.0001)).unwrap_err(),
            EngineError::InvalidAmount {
                amount: MAX_AMOUNT + dec!(0.0001),
                reason: "amount out of range",
            }
        );
        assert!(positive_amount(Decimal::MAX).is_err());
        assert!(fits_scale(-Decimal::MAX).is_err());
    }

    #[test]
    fn test_minor_unit_scale() {
        assert_eq!(minor_unit_scale(dec!(100)), 2);
        assert_eq!(minor_unit_scale(dec!(100.00)), 2);
        assert_eq!(minor_unit_scale(dec!(10.005)), 3);
        assert_eq!(minor_unit_scale(dec!(1.2345)), 4);
    }
}
