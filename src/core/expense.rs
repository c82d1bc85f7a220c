use crate::core::error::EngineError;
use crate::core::member::MemberId;
use crate::core::money::{fits_scale, positive_amount};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// How an expense's total is divided among its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitStrategy {
    Equal,
    Exact,
    Percentage,
    Shares,
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitStrategy::Equal => "EQUAL",
            SplitStrategy::Exact => "EXACT",
            SplitStrategy::Percentage => "PERCENTAGE",
            SplitStrategy::Shares => "SHARES",
        };
        f.write_str(name)
    }
}

/// One member's owed share of an expense.
///
/// `percentage` is set only for percentage splits and `shares` only for
/// share-based splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub member: MemberId,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u32>,
}

impl ExpenseSplit {
    pub fn new(member: MemberId, amount: Decimal) -> Self {
        Self {
            member,
            amount,
            percentage: None,
            shares: None,
        }
    }

    pub fn with_percentage(mut self, percentage: Decimal) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn with_shares(mut self, shares: u32) -> Self {
        self.shares = Some(shares);
        self
    }
}

/// An expense paid by one member and owed, split by split, by the
/// participants.
///
/// Expenses are immutable once created: the splits always sum exactly to
/// `amount`. Editing an expense means removing it and recording a new one.
///
/// # Examples
///
/// ```
/// use split_engine::core::expense::{Expense, ExpenseSplit, SplitStrategy};
/// use split_engine::core::member::MemberId;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let expense = Expense::new(
///     MemberId::new("alice"),
///     "Groceries",
///     dec!(30),
///     SplitStrategy::Exact,
///     NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
///     vec![
///         ExpenseSplit::new(MemberId::new("alice"), dec!(10)),
///         ExpenseSplit::new(MemberId::new("bob"), dec!(20)),
///     ],
/// ).unwrap();
///
/// assert_eq!(expense.split_total(), dec!(30));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ExpenseRecord")]
pub struct Expense {
    id: Uuid,
    payer: MemberId,
    description: String,
    amount: Decimal,
    strategy: SplitStrategy,
    date: NaiveDate,
    created_at: DateTime<Utc>,
    splits: Vec<ExpenseSplit>,
}

impl Expense {
    /// Create an expense from its final splits.
    ///
    /// Fails if the amount is not positive, if there are no splits, if a
    /// member owes more than one split, or if the splits do not add up to
    /// the amount exactly.
    pub fn new(
        payer: MemberId,
        description: impl Into<String>,
        amount: Decimal,
        strategy: SplitStrategy,
        date: NaiveDate,
        splits: Vec<ExpenseSplit>,
    ) -> Result<Self, EngineError> {
        Self::with_id(
            Uuid::new_v4(),
            payer,
            description,
            amount,
            strategy,
            date,
            splits,
        )
    }

    /// Create an expense with a specific ID (useful for testing / replaying
    /// persisted records).
    pub fn with_id(
        id: Uuid,
        payer: MemberId,
        description: impl Into<String>,
        amount: Decimal,
        strategy: SplitStrategy,
        date: NaiveDate,
        splits: Vec<ExpenseSplit>,
    ) -> Result<Self, EngineError> {
        let amount = positive_amount(amount)?;
        if splits.is_empty() {
            return Err(EngineError::NoParticipants);
        }

        let mut seen = HashSet::new();
        for split in &splits {
            if split.amount < Decimal::ZERO {
                return Err(EngineError::InvalidAmount {
                    amount: split.amount,
                    reason: "split amounts cannot be negative",
                });
            }
            fits_scale(split.amount)?;
            if !seen.insert(&split.member) {
                return Err(EngineError::DuplicateParticipant(split.member.clone()));
            }
        }

        let allocated: Decimal = splits.iter().map(|s| s.amount).sum();
        if allocated != amount {
            return Err(EngineError::InconsistentAllocation {
                expected: amount,
                allocated,
            });
        }

        Ok(Self {
            id,
            payer,
            description: description.into(),
            amount,
            strategy,
            date,
            created_at: Utc::now(),
            splits,
        })
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payer(&self) -> &MemberId {
        &self.payer
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn splits(&self) -> &[ExpenseSplit] {
        &self.splits
    }

    /// Sum of all split amounts. Always equal to [`Expense::amount`].
    pub fn split_total(&self) -> Decimal {
        self.splits.iter().map(|s| s.amount).sum()
    }

    /// The amount owed by `member`, zero if they are not a participant.
    pub fn share_of(&self, member: &MemberId) -> Decimal {
        self.splits
            .iter()
            .find(|s| &s.member == member)
            .map(|s| s.amount)
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether `member` paid for or owes part of this expense.
    pub fn involves(&self, member: &MemberId) -> bool {
        &self.payer == member || self.splits.iter().any(|s| &s.member == member)
    }
}

/// Serialized form of an [`Expense`], validated on the way in.
#[derive(Deserialize)]
struct ExpenseRecord {
    id: Uuid,
    payer: MemberId,
    #[serde(default)]
    description: String,
    amount: Decimal,
    strategy: SplitStrategy,
    date: NaiveDate,
    created_at: DateTime<Utc>,
    splits: Vec<ExpenseSplit>,
}

impl TryFrom<ExpenseRecord> for Expense {
    type Error = EngineError;

    fn try_from(record: ExpenseRecord) -> Result<Self, Self::Error> {
        let mut expense = Expense::with_id(
            record.id,
            record.payer,
            record.description,
            record.amount,
            record.strategy,
            record.date,
            record.splits,
        )?;
        expense.created_at = record.created_at;
        Ok(expense)
    }
}
