use crate::balance::sheet::BalanceSheet;
use crate::core::error::EngineError;
use crate::core::group::{Group, GroupId, GroupRegistry};
use crate::core::member::MemberId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of a group's balance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member: MemberId,
    pub name: String,
    pub balance: Decimal,
}

impl MemberBalance {
    pub fn is_creditor(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    pub fn is_debtor(&self) -> bool {
        self.balance < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.balance == Decimal::ZERO
    }

    pub fn absolute(&self) -> Decimal {
        self.balance.abs()
    }
}

impl fmt::Display for MemberBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_creditor() {
            "is owed"
        } else if self.is_debtor() {
            "owes"
        } else {
            "is settled"
        };
        write!(f, "{:<20} {:>12}  {}", self.name, self.balance, status)
    }
}

/// Folds a group's expenses and settlements into net balances.
///
/// Stateless: every call recomputes from the records it is given.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Net balance of every member who appears in the group's records.
    ///
    /// # Algorithm
    ///
    /// 1. For each expense, credit the payer the full amount and debit each
    ///    split's member by their share.
    /// 2. For each settlement, credit the payer and debit the receiver.
    ///
    /// The result is guaranteed to be balanced: sum of all positions = 0.
    pub fn compute_balances(group: &Group) -> BalanceSheet {
        let mut sheet = BalanceSheet::new();
        for expense in group.expenses() {
            sheet.apply_expense(expense);
        }
        for settlement in group.settlements() {
            sheet.apply_settlement(settlement);
        }

        log::debug!(
            "group {}: {} expenses, {} settlements folded into {} balances",
            group.id(),
            group.expenses().len(),
            group.settlements().len(),
            sheet.len()
        );
        sheet
    }

    /// [`BalanceAggregator::compute_balances`] for a group looked up by id.
    pub fn compute_balances_by_id(
        registry: &GroupRegistry,
        group_id: &GroupId,
    ) -> Result<BalanceSheet, EngineError> {
        Ok(Self::compute_balances(registry.get(group_id)?))
    }

    /// A single member's net balance, zero if they have no activity.
    pub fn user_balance_in_group(group: &Group, member: &MemberId) -> Decimal {
        Self::compute_balances(group).balance(member)
    }

    /// Balance rows for every group member, creditors first.
    ///
    /// Members without any activity are listed with a zero balance. Equal
    /// balances are ordered by member id.
    pub fn detailed_balances(group: &Group) -> Vec<MemberBalance> {
        let sheet = Self::compute_balances(group);
        let mut rows: Vec<MemberBalance> = group
            .members()
            .iter()
            .map(|m| MemberBalance {
                member: m.id.clone(),
                name: m.name.clone(),
                balance: sheet.balance(&m.id),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.balance
                .cmp(&a.balance)
                .then_with(|| a.member.cmp(&b.member))
        });
        rows
    }

    /// A member's net position summed over every group they belong to.
    pub fn overall_balance(registry: &GroupRegistry, member: &MemberId) -> Decimal {
        registry
            .groups_of(member)
            .into_iter()
            .map(|g| Self::user_balance_in_group(g, member))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::split::{SplitAllocator, SplitMethod};
    use crate::core::member::Member;
    use crate::core::settlement::Settlement;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn id(s: &str) -> MemberId {
        MemberId::new(s)
    }

    fn trio(group_id: &str) -> Group {
        let mut group = Group::new(group_id, "Trio");
        for (m, name) in [("a", "Ana"), ("b", "Ben"), ("c", "Cleo"), ("d", "Dev")] {
            group.add_member(Member::new(m, name)).unwrap();
        }
        group
    }

    fn add_equal(group: &mut Group, payer: &str, amount: Decimal, among: &[&str]) {
        let participants: Vec<MemberId> = among.iter().map(|m| id(m)).collect();
        let expense = SplitAllocator::default()
            .expense(
                id(payer),
                "shared",
                amount,
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                &SplitMethod::Equal,
                &participants,
            )
            .unwrap();
        group.record_expense(expense).unwrap();
    }

    #[test]
    fn test_compute_balances() {
        let mut group = trio("g");
        add_equal(&mut group, "a", dec!(90), &["a", "b", "c"]);

        let sheet = BalanceAggregator::compute_balances(&group);
        assert_eq!(sheet.balance(&id("a")), dec!(60));
        assert_eq!(sheet.balance(&id("b")), dec!(-30));
        assert_eq!(sheet.balance(&id("c")), dec!(-30));
        assert!(sheet.is_balanced());

        group
            .record_settlement(Settlement::new(id("b"), id("a"), dec!(30)).unwrap())
            .unwrap();
        let sheet = BalanceAggregator::compute_balances(&group);
        assert_eq!(sheet.balance(&id("a")), dec!(30));
        assert_eq!(sheet.balance(&id("b")), Decimal::ZERO);
        assert_eq!(sheet.balance(&id("c")), dec!(-30));
    }

    #[test]
    fn test_detailed_balances_order() {
        let mut group = trio("g");
        add_equal(&mut group, "a", dec!(90), &["a", "b", "c"]);
        add_equal(&mut group, "c", dec!(20), &["b", "c"]);

        let rows = BalanceAggregator::detailed_balances(&group);
        let order: Vec<(&str, Decimal)> = rows
            .iter()
            .map(|r| (r.member.as_str(), r.balance))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a", dec!(60)),
                ("d", Decimal::ZERO),
                ("c", dec!(-20)),
                ("b", dec!(-40)),
            ]
        );
        assert!(rows[0].is_creditor());
        assert!(rows[1].is_zero());
        assert_eq!(rows[3].absolute(), dec!(40));
    }

    #[test]
    fn test_user_balance_defaults_to_zero() {
        let group = trio("g");
        assert_eq!(
            BalanceAggregator::user_balance_in_group(&group, &id("a")),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_lookup_by_id() {
        let mut registry = GroupRegistry::new();
        registry.insert(trio("known"));
        assert!(BalanceAggregator::compute_balances_by_id(&registry, &GroupId::new("known")).is_ok());
        assert_eq!(
            BalanceAggregator::compute_balances_by_id(&registry, &GroupId::new("missing"))
                .unwrap_err(),
            EngineError::GroupNotFound(GroupId::new("missing"))
        );
    }

    #[test]
    fn test_overall_balance_across_groups() {
        let mut first = trio("first");
        add_equal(&mut first, "a", dec!(30), &["a", "b", "c"]);
        let mut second = trio("second");
        add_equal(&mut second, "b", dec!(40), &["a", "b"]);

        let registry: GroupRegistry = [first, second].into_iter().collect();
        // a: +20 in first, -20 in second
        assert_eq!(BalanceAggregator::overall_balance(&registry, &id("a")), Decimal::ZERO);
        // b: -10 in first, +20 in second
        assert_eq!(BalanceAggregator::overall_balance(&registry, &id("b")), dec!(10));
    }
}
