use crate::core::error::EngineError;
use crate::core::member::MemberId;
use crate::core::money::positive_amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded direct payment: `from` paid `amount` to `to`.
///
/// Settlements are zero-sum transfers. They raise the payer's balance and
/// lower the receiver's balance by the same amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SettlementRecord")]
pub struct Settlement {
    id: Uuid,
    from: MemberId,
    to: MemberId,
    amount: Decimal,
    settled_at: DateTime<Utc>,
}

impl Settlement {
    /// Record a settlement. The amount must be positive and the two members
    /// must differ.
    pub fn new(from: MemberId, to: MemberId, amount: Decimal) -> Result<Self, EngineError> {
        Self::with_id(Uuid::new_v4(), from, to, amount, Utc::now())
    }

    /// Create a settlement with a specific ID and timestamp.
    pub fn with_id(
        id: Uuid,
        from: MemberId,
        to: MemberId,
        amount: Decimal,
        settled_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let amount = positive_amount(amount)?;
        if from == to {
            return Err(EngineError::SelfSettlement(from));
        }
        Ok(Self {
            id,
            from,
            to,
            amount,
            settled_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn from(&self) -> &MemberId {
        &self.from
    }

    pub fn to(&self) -> &MemberId {
        &self.to
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn settled_at(&self) -> DateTime<Utc> {
        self.settled_at
    }

    pub fn involves(&self, member: &MemberId) -> bool {
        &self.from == member || &self.to == member
    }
}

#[derive(Deserialize)]
struct SettlementRecord {
    id: Uuid,
    from: MemberId,
    to: MemberId,
    amount: Decimal,
    settled_at: DateTime<Utc>,
}

impl TryFrom<SettlementRecord> for Settlement {
    type Error = EngineError;

    fn try_from(record: SettlementRecord) -> Result<Self, Self::Error> {
        Settlement::with_id(
            record.id,
            record.from,
            record.to,
            record.amount,
            record.settled_at,
        )
    }
}
