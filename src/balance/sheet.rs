use crate::core::expense::Expense;
use crate::core::member::MemberId;
use crate::core::money::is_settled;
use crate::core::settlement::Settlement;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tracks the net position of each member of a group.
///
/// A positive balance means the group owes the member (net creditor).
/// A negative balance means the member owes the group (net debtor).
/// Members without an entry have a zero balance.
///
/// Balances are always derived from expenses and settlements and are never
/// the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    positions: HashMap<MemberId, Decimal>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an expense: the payer is credited the full amount, every
    /// participant is debited their split.
    pub fn apply_expense(&mut self, expense: &Expense) {
        self.credit(expense.payer(), expense.amount());
        for split in expense.splits() {
            self.credit(&split.member, -split.amount);
        }
    }

    /// Apply a settlement: the payer owes less, the receiver is owed less.
    pub fn apply_settlement(&mut self, settlement: &Settlement) {
        self.credit(settlement.from(), settlement.amount());
        self.credit(settlement.to(), -settlement.amount());
    }

    /// Add `amount` (which may be negative) to a member's position.
    pub fn credit(&mut self, member: &MemberId, amount: Decimal) {
        *self
            .positions
            .entry(member.clone())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Net position of a member, zero if unknown.
    pub fn balance(&self, member: &MemberId) -> Decimal {
        self.positions
            .get(member)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn positions(&self) -> &HashMap<MemberId, Decimal> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of all positions. Zero for any sheet built from valid records.
    pub fn total(&self) -> Decimal {
        self.positions.values().sum()
    }

    /// Verify that the sheet is balanced: the sum of all positions is zero.
    pub fn is_balanced(&self) -> bool {
        self.total() == Decimal::ZERO
    }

    /// Total owed to creditors (equal to the total owed by debtors).
    pub fn total_outstanding(&self) -> Decimal {
        self.positions
            .values()
            .filter(|v| **v > Decimal::ZERO)
            .sum()
    }

    /// Whether every member sits inside the settled band.
    pub fn is_settled(&self) -> bool {
        self.positions.values().all(|v| is_settled(*v))
    }
}

impl FromIterator<(MemberId, Decimal)> for BalanceSheet {
    fn from_iter<T: IntoIterator<Item = (MemberId, Decimal)>>(iter: T) -> Self {
        let mut sheet = Self::new();
        for (member, amount) in iter {
            sheet.credit(&member, amount);
        }
        sheet
    }
}

impl From<HashMap<MemberId, Decimal>> for BalanceSheet {
    fn from(positions: HashMap<MemberId, Decimal>) -> Self {
        Self { positions }
    }
}
