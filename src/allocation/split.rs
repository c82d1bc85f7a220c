use crate::core::error::EngineError;
use crate::core::expense::{Expense, ExpenseSplit, SplitStrategy};
use crate::core::member::MemberId;
use crate::core::money::{fits_scale, minor_unit_scale, positive_amount, MONEY_SCALE};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A split strategy together with its per-member inputs.
///
/// Members missing from an input map count as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "inputs", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitMethod {
    Equal,
    Exact(HashMap<MemberId, Decimal>),
    Percentage(HashMap<MemberId, Decimal>),
    Shares(HashMap<MemberId, u32>),
}

impl SplitMethod {
    pub fn strategy(&self) -> SplitStrategy {
        match self {
            SplitMethod::Equal => SplitStrategy::Equal,
            SplitMethod::Exact(_) => SplitStrategy::Exact,
            SplitMethod::Percentage(_) => SplitStrategy::Percentage,
            SplitMethod::Shares(_) => SplitStrategy::Shares,
        }
    }
}

/// Which participants receive the leftover minor units of an equal split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemainderPolicy {
    /// The first participants in the order supplied by the caller.
    #[default]
    InOrder,
    /// A pseudo-random subset, reproducible for a given seed.
    Seeded(u64),
}

/// Configuration for a [`SplitAllocator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocatorConfig {
    pub remainder: RemainderPolicy,
}

/// Partitions an expense total into per-member owed shares.
///
/// For equal, percentage and share splits the returned amounts always sum
/// to the total exactly. Exact splits return the caller's amounts as given.
///
/// # Examples
///
/// ```
/// use split_engine::allocation::split::{SplitAllocator, SplitMethod};
/// use split_engine::core::member::MemberId;
/// use rust_decimal_macros::dec;
///
/// let members = vec![MemberId::new("a"), MemberId::new("b"), MemberId::new("c")];
/// let splits = SplitAllocator::default()
///     .allocate(dec!(100.00), &SplitMethod::Equal, &members)
///     .unwrap();
///
/// let amounts: Vec<_> = splits.iter().map(|s| s.amount).collect();
/// assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SplitAllocator {
    config: AllocatorConfig,
}

impl SplitAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Allocate `total` among `participants` using `method`.
    pub fn allocate(
        &self,
        total: Decimal,
        method: &SplitMethod,
        participants: &[MemberId],
    ) -> Result<Vec<ExpenseSplit>, EngineError> {
        let total = positive_amount(total)?;
        check_participants(participants)?;

        let splits = match method {
            SplitMethod::Equal => self.equal(total, participants),
            SplitMethod::Exact(amounts) => exact(total, amounts, participants)?,
            SplitMethod::Percentage(percentages) => percentage(total, percentages, participants)?,
            SplitMethod::Shares(shares) => by_shares(total, shares, participants)?,
        };

        for split in &splits {
            log::trace!("{} split: {} owes {}", method.strategy(), split.member, split.amount);
        }
        Ok(splits)
    }

    /// Like [`SplitAllocator::allocate`], but also rejects exact splits that
    /// do not add up to `total`.
    pub fn allocate_strict(
        &self,
        total: Decimal,
        method: &SplitMethod,
        participants: &[MemberId],
    ) -> Result<Vec<ExpenseSplit>, EngineError> {
        let splits = self.allocate(total, method, participants)?;
        let allocated: Decimal = splits.iter().map(|s| s.amount).sum();
        if allocated != total {
            return Err(EngineError::InconsistentAllocation {
                expected: total,
                allocated,
            });
        }
        Ok(splits)
    }

    /// Allocate and wrap the result in an [`Expense`] paid by `payer`.
    pub fn expense(
        &self,
        payer: MemberId,
        description: impl Into<String>,
        total: Decimal,
        date: NaiveDate,
        method: &SplitMethod,
        participants: &[MemberId],
    ) -> Result<Expense, EngineError> {
        let splits = self.allocate_strict(total, method, participants)?;
        Expense::new(payer, description, total, method.strategy(), date, splits)
    }

    fn equal(&self, total: Decimal, participants: &[MemberId]) -> Vec<ExpenseSplit> {
        let count = Decimal::from(participants.len());
        let scale = minor_unit_scale(total);
        let unit = Decimal::new(1, scale);

        let base = (total / count).round_dp_with_strategy(scale, RoundingStrategy::ToZero);
        // Always a whole number of units, smaller than the participant count.
        let leftover_units = ((total - base * count) / unit)
            .trunc()
            .to_usize()
            .unwrap_or(0);

        let mut order: Vec<usize> = (0..participants.len()).collect();
        if let RemainderPolicy::Seeded(seed) = self.config.remainder {
            order.shuffle(&mut StdRng::seed_from_u64(seed));
        }
        let mut extra = vec![false; participants.len()];
        for &index in order.iter().take(leftover_units) {
            extra[index] = true;
        }

        participants
            .iter()
            .zip(extra)
            .map(|(member, gets_extra)| {
                let amount = if gets_extra { base + unit } else { base };
                ExpenseSplit::new(member.clone(), amount)
            })
            .collect()
    }
}

fn check_participants(participants: &[MemberId]) -> Result<(), EngineError> {
    if participants.is_empty() {
        return Err(EngineError::NoParticipants);
    }
    let mut seen = HashSet::new();
    for member in participants {
        if !seen.insert(member) {
            return Err(EngineError::DuplicateParticipant(member.clone()));
        }
    }
    Ok(())
}

fn exact(
    total: Decimal,
    amounts: &HashMap<MemberId, Decimal>,
    participants: &[MemberId],
) -> Result<Vec<ExpenseSplit>, EngineError> {
    let mut splits = Vec::new();
    for member in participants {
        let amount = amounts.get(member).copied().unwrap_or(Decimal::ZERO);
        if amount < Decimal::ZERO {
            return Err(EngineError::InvalidAmount {
                amount,
                reason: "exact split amounts cannot be negative",
            });
        }
        if amount > Decimal::ZERO {
            splits.push(ExpenseSplit::new(member.clone(), fits_scale(amount)?));
        }
    }

    let allocated: Decimal = splits.iter().map(|s| s.amount).sum();
    if allocated != total {
        log::warn!(
            "exact split allocates {} of {}; leaving the difference to the caller",
            allocated,
            total
        );
    }
    Ok(splits)
}

fn percentage(
    total: Decimal,
    percentages: &HashMap<MemberId, Decimal>,
    participants: &[MemberId],
) -> Result<Vec<ExpenseSplit>, EngineError> {
    let hundred = Decimal::ONE_HUNDRED;
    let last = participants.len() - 1;
    let mut assigned = Decimal::ZERO;
    let mut splits = Vec::new();

    for (i, member) in participants.iter().enumerate() {
        let pct = percentages.get(member).copied().unwrap_or(Decimal::ZERO);
        if pct < Decimal::ZERO || pct > hundred {
            return Err(EngineError::InvalidPercentage {
                percentage: pct,
                reason: "must be between 0 and 100",
            });
        }

        let amount = if i == last {
            let rest = total - assigned;
            if rest < Decimal::ZERO {
                return Err(EngineError::InvalidPercentage {
                    percentage: pct,
                    reason: "percentages allocate more than the total",
                });
            }
            rest
        } else {
            let amount = total
                .checked_mul(pct)
                .and_then(|v| v.checked_div(hundred))
                .ok_or(EngineError::InvalidPercentage {
                    percentage: pct,
                    reason: "percentage out of range",
                })?
                .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
            assigned += amount;
            amount
        };

        if amount > Decimal::ZERO {
            splits.push(ExpenseSplit::new(member.clone(), amount).with_percentage(pct));
        }
    }
    Ok(splits)
}

fn by_shares(
    total: Decimal,
    shares: &HashMap<MemberId, u32>,
    participants: &[MemberId],
) -> Result<Vec<ExpenseSplit>, EngineError> {
    let counts: Vec<u32> = participants
        .iter()
        .map(|m| shares.get(m).copied().unwrap_or(0))
        .collect();
    let total_shares: u64 = counts.iter().map(|&c| u64::from(c)).sum();
    if total_shares == 0 {
        return Err(EngineError::InvalidShares);
    }

    let share_value = (total / Decimal::from(total_shares))
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
    let last = participants.len() - 1;
    let mut assigned = Decimal::ZERO;
    let mut splits = Vec::new();

    for (i, (member, count)) in participants.iter().zip(counts).enumerate() {
        let amount = if i == last {
            total - assigned
        } else {
            let amount = share_value * Decimal::from(count);
            assigned += amount;
            amount
        };

        if amount > Decimal::ZERO {
            splits.push(ExpenseSplit::new(member.clone(), amount).with_shares(count));
        }
    }
    Ok(splits)
}
