use crate::balance::aggregator::BalanceAggregator;
use crate::core::group::{Group, GroupId};
use crate::core::member::MemberId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a member paid for and what they consumed within a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberActivity {
    /// Total of expenses this member paid for.
    pub paid: Decimal,
    /// Total of this member's splits across all expenses.
    pub owed_share: Decimal,
    /// Total this member has paid out in settlements.
    pub settled_out: Decimal,
    /// Total this member has received in settlements.
    pub settled_in: Decimal,
}

impl MemberActivity {
    /// Net position implied by the activity. Matches the aggregator's balance.
    pub fn net(&self) -> Decimal {
        self.paid - self.owed_share + self.settled_out - self.settled_in
    }
}

/// Aggregate statistics for a group snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: GroupId,
    pub member_count: usize,
    pub expense_count: usize,
    pub settlement_count: usize,
    pub total_expenses: Decimal,
    pub total_settled: Decimal,
    /// Sum still owed to creditors after all settlements.
    pub outstanding: Decimal,
    pub first_expense: Option<NaiveDate>,
    pub last_expense: Option<NaiveDate>,
    pub activity: HashMap<MemberId, MemberActivity>,
}

impl GroupSummary {
    pub fn from_group(group: &Group) -> Self {
        let mut activity: HashMap<MemberId, MemberActivity> = HashMap::new();

        for expense in group.expenses() {
            activity.entry(expense.payer().clone()).or_default().paid += expense.amount();
            for split in expense.splits() {
                activity.entry(split.member.clone()).or_default().owed_share += split.amount;
            }
        }
        for settlement in group.settlements() {
            activity
                .entry(settlement.from().clone())
                .or_default()
                .settled_out += settlement.amount();
            activity
                .entry(settlement.to().clone())
                .or_default()
                .settled_in += settlement.amount();
        }

        let dates = group.expenses().iter().map(|e| e.date());
        GroupSummary {
            group: group.id().clone(),
            member_count: group.member_count(),
            expense_count: group.expenses().len(),
            settlement_count: group.settlements().len(),
            total_expenses: group.total_expenses(),
            total_settled: group.total_settled(),
            outstanding: BalanceAggregator::compute_balances(group).total_outstanding(),
            first_expense: dates.clone().min(),
            last_expense: dates.max(),
            activity,
        }
    }

    /// Activity of one member, zeroed if they have none.
    pub fn activity_of(&self, member: &MemberId) -> MemberActivity {
        self.activity.get(member).cloned().unwrap_or_default()
    }
}

impl std::fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Group {} ===", self.group)?;
        writeln!(f, "Members:        {}", self.member_count)?;
        writeln!(f, "Expenses:       {} totalling {}", self.expense_count, self.total_expenses)?;
        writeln!(f, "Settlements:    {} totalling {}", self.settlement_count, self.total_settled)?;
        writeln!(f, "Outstanding:    {}", self.outstanding)?;
        if let (Some(first), Some(last)) = (self.first_expense, self.last_expense) {
            writeln!(f, "Period:         {} .. {}", first, last)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expense::{Expense, ExpenseSplit, SplitStrategy};
    use crate::core::member::Member;
    use crate::core::settlement::Settlement;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_totals() {
        let a = MemberId::new("a");
        let b = MemberId::new("b");
        let mut group = Group::new("g", "Pair");
        group.add_member(Member::new("a", "Ana")).unwrap();
        group.add_member(Member::new("b", "Ben")).unwrap();

        for (day, amount) in [(3, dec!(40)), (9, dec!(20))] {
            group
                .record_expense(
                    Expense::new(
                        a.clone(),
                        "rent",
                        amount,
                        SplitStrategy::Exact,
                        NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
                        vec![
                            ExpenseSplit::new(a.clone(), amount / dec!(2)),
                            ExpenseSplit::new(b.clone(), amount / dec!(2)),
                        ],
                    )
                    .unwrap(),
                )
                .unwrap();
        }
        group
            .record_settlement(Settlement::new(b.clone(), a.clone(), dec!(10)).unwrap())
            .unwrap();

        let summary = GroupSummary::from_group(&group);
        assert_eq!(summary.total_expenses, dec!(60));
        assert_eq!(summary.total_settled, dec!(10));
        assert_eq!(summary.outstanding, dec!(20));
        assert_eq!(summary.first_expense, NaiveDate::from_ymd_opt(2024, 4, 3));
        assert_eq!(summary.last_expense, NaiveDate::from_ymd_opt(2024, 4, 9));

        let ana = summary.activity_of(&a);
        assert_eq!(ana.paid, dec!(60));
        assert_eq!(ana.owed_share, dec!(30));
        assert_eq!(ana.net(), dec!(20));
        assert_eq!(summary.activity_of(&b).net(), dec!(-20));
        assert_eq!(summary.activity_of(&MemberId::new("x")), MemberActivity::default());
    }
}
