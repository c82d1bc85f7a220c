use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use split_engine::allocation::split::{AllocatorConfig, RemainderPolicy, SplitAllocator, SplitMethod};
use split_engine::balance::aggregator::BalanceAggregator;
use split_engine::balance::sheet::BalanceSheet;
use split_engine::core::group::Group;
use split_engine::core::member::{Member, MemberId};
use split_engine::core::money::SETTLED_EPSILON;
use split_engine::core::settlement::Settlement;
use split_engine::optimization::simplifier::DebtSimplifier;
use std::collections::HashMap;

const POOL: usize = 6;

fn member(i: usize) -> MemberId {
    MemberId::new(format!("M{}", i))
}

fn members(n: usize) -> Vec<MemberId> {
    (0..n).map(member).collect()
}

/// Generate a positive amount between 0.01 and 100,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generate a split method for `n` participants.
fn arb_method(n: usize) -> impl Strategy<Value = SplitMethod> {
    let ms = members(n);
    let for_pct = ms.clone();
    let for_shares = ms.clone();
    prop_oneof![
        Just(SplitMethod::Equal),
        prop::collection::vec(0u32..=100, n).prop_map(move |weights| {
            // Whole percentages scaled so they never exceed 100 in total.
            let sum: u32 = weights.iter().sum::<u32>().max(1);
            SplitMethod::Percentage(
                for_pct
                    .iter()
                    .zip(weights)
                    .map(|(m, w)| (m.clone(), Decimal::from(w * 100 / sum)))
                    .collect(),
            )
        }),
        prop::collection::vec(1u32..=5, n).prop_map(move |shares| {
            SplitMethod::Shares(for_shares.iter().cloned().zip(shares).collect())
        }),
    ]
}

/// An expense as (payer index, amount, participant count, method).
fn arb_expense() -> impl Strategy<Value = (usize, Decimal, usize, SplitMethod)> {
    (0..POOL, arb_amount(), 1..=POOL).prop_flat_map(|(payer, amount, n)| {
        arb_method(n).prop_map(move |method| (payer, amount, n, method))
    })
}

fn arb_settlement() -> impl Strategy<Value = (usize, usize, Decimal)> {
    (0..POOL, 0..POOL, arb_amount()).prop_filter("settlement needs two members", |(f, t, _)| f != t)
}

fn build_group(
    expenses: &[(usize, Decimal, usize, SplitMethod)],
    settlements: &[(usize, usize, Decimal)],
) -> Group {
    let mut group = Group::new("prop", "Property group");
    for m in members(POOL) {
        group.add_member(Member::new(m.as_str(), m.as_str())).unwrap();
    }
    let allocator = SplitAllocator::default();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for (payer, amount, n, method) in expenses {
        let expense = allocator
            .expense(member(*payer), "prop", *amount, date, method, &members(*n))
            .unwrap();
        group.record_expense(expense).unwrap();
    }
    for (from, to, amount) in settlements {
        let settlement = Settlement::new(member(*from), member(*to), *amount).unwrap();
        group.record_settlement(settlement).unwrap();
    }
    group
}

/// Zero-sum balances at cent precision across up to 12 members.
fn arb_balances() -> impl Strategy<Value = BalanceSheet> {
    prop::collection::vec(-1_000_000i64..1_000_000i64, 1..12).prop_map(|cents| {
        let closing: i64 = -cents.iter().sum::<i64>();
        cents
            .into_iter()
            .chain(std::iter::once(closing))
            .enumerate()
            .map(|(i, c)| (member(i), Decimal::new(c, 2)))
            .collect()
    })
}

proptest! {
    // ===================================================================
    // Splits always add up to the expense total, for 1..=50 participants.
    // ===================================================================
    #[test]
    fn equal_split_sums_exactly(amount in arb_amount(), n in 1usize..=50, seed in any::<u64>()) {
        for policy in [RemainderPolicy::InOrder, RemainderPolicy::Seeded(seed)] {
            let allocator = SplitAllocator::new(AllocatorConfig { remainder: policy });
            let splits = allocator.allocate(amount, &SplitMethod::Equal, &members(n)).unwrap();
            let total: Decimal = splits.iter().map(|s| s.amount).sum();
            prop_assert_eq!(total, amount);

            let max = splits.iter().map(|s| s.amount).max().unwrap();
            let min = splits.iter().map(|s| s.amount).min().unwrap();
            prop_assert!(max - min <= SETTLED_EPSILON, "spread {} too wide", max - min);
        }
    }

    #[test]
    fn weighted_splits_sum_exactly(amount in arb_amount(), n in 1usize..=50, raw in prop::collection::vec(0u32..=20, 50)) {
        let ms = members(n);
        let shares: HashMap<MemberId, u32> =
            ms.iter().cloned().zip(raw.iter().map(|w| w + 1)).collect();
        let splits = SplitAllocator::default()
            .allocate(amount, &SplitMethod::Shares(shares), &ms)
            .unwrap();
        prop_assert_eq!(splits.iter().map(|s| s.amount).sum::<Decimal>(), amount);

        let sum: u32 = raw.iter().take(n).sum::<u32>().max(1);
        let percentages: HashMap<MemberId, Decimal> = ms
            .iter()
            .cloned()
            .zip(raw.iter().map(|w| Decimal::from(w * 100 / sum)))
            .collect();
        let splits = SplitAllocator::default()
            .allocate(amount, &SplitMethod::Percentage(percentages), &ms)
            .unwrap();
        prop_assert_eq!(splits.iter().map(|s| s.amount).sum::<Decimal>(), amount);
    }

    // ===================================================================
    // The sum of all balances in a group is exactly zero.
    // ===================================================================
    #[test]
    fn balances_are_zero_sum(
        expenses in prop::collection::vec(arb_expense(), 0..25),
        settlements in prop::collection::vec(arb_settlement(), 0..10),
    ) {
        let group = build_group(&expenses, &settlements);
        let sheet = BalanceAggregator::compute_balances(&group);
        prop_assert_eq!(sheet.total(), Decimal::ZERO);
    }

    // ===================================================================
    // Aggregation is a pure function: same input, same output.
    // ===================================================================
    #[test]
    fn aggregation_is_idempotent(expenses in prop::collection::vec(arb_expense(), 1..15)) {
        let group = build_group(&expenses, &[]);
        prop_assert_eq!(
            BalanceAggregator::compute_balances(&group),
            BalanceAggregator::compute_balances(&group)
        );
    }

    // ===================================================================
    // Replaying the plan leaves everyone within ±ε of zero.
    // ===================================================================
    #[test]
    fn plan_cancels_balances(balances in arb_balances()) {
        let plan = DebtSimplifier::simplify(&balances);
        let after = plan.replay(&balances);
        for (m, remaining) in after.positions() {
            prop_assert!(remaining.abs() < SETTLED_EPSILON, "{} left with {}", m, remaining);
        }
        prop_assert!(plan.payments().iter().all(|p| p.amount >= SETTLED_EPSILON));
    }

    // ===================================================================
    // At most creditors + debtors - 1 payments.
    // ===================================================================
    #[test]
    fn plan_respects_transaction_bound(balances in arb_balances()) {
        let plan = DebtSimplifier::simplify(&balances);
        let parties = plan.creditor_count() + plan.debtor_count();
        prop_assert!(plan.len() <= parties.saturating_sub(1));
    }

    // ===================================================================
    // End to end: a real group's plan settles it.
    // ===================================================================
    #[test]
    fn group_plan_settles_group(
        expenses in prop::collection::vec(arb_expense(), 1..20),
        settlements in prop::collection::vec(arb_settlement(), 0..5),
    ) {
        let group = build_group(&expenses, &settlements);
        let sheet = BalanceAggregator::compute_balances(&group);
        let plan = DebtSimplifier::simplify(&sheet);
        let after = plan.replay(&sheet);
        // Splits carry up to four decimals, so sub-cent residue may remain.
        let residue: Decimal = after.positions().values().map(|v| v.abs()).sum();
        prop_assert!(residue < SETTLED_EPSILON * Decimal::from(2 * POOL));
    }
}
