//! A weekend trip from first receipt to settled-up.
//!
//! Records a handful of shared expenses, shows who owes what, and prints
//! the short list of payments that clears the group.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use split_engine::allocation::split::{SplitAllocator, SplitMethod};
use split_engine::balance::aggregator::BalanceAggregator;
use split_engine::balance::summary::GroupSummary;
use split_engine::core::error::EngineError;
use split_engine::core::group::Group;
use split_engine::core::member::{Member, MemberId};
use split_engine::core::settlement::Settlement;
use split_engine::optimization::simplifier::DebtSimplifier;
use std::collections::HashMap;

fn main() -> Result<(), EngineError> {
    println!("╔═══════════════════════════════════════╗");
    println!("║  split-engine: Weekend Trip Example  ║");
    println!("╚═══════════════════════════════════════╝\n");

    let mut group = Group::new("lake-2024", "Lake house weekend");
    for (id, name) in [("ana", "Ana"), ("ben", "Ben"), ("cleo", "Cleo"), ("dev", "Dev")] {
        group.add_member(Member::new(id, name))?;
    }
    let everyone: Vec<MemberId> = group.members().iter().map(|m| m.id.clone()).collect();
    let [ana, ben, cleo, dev] = [0, 1, 2, 3].map(|i| everyone[i].clone());

    let allocator = SplitAllocator::default();
    let day = |d| NaiveDate::from_ymd_opt(2024, 8, d).unwrap_or_default();

    // --- Scenario 1: Recording expenses ---
    println!("━━━ Scenario 1: Expenses ━━━\n");

    group.record_expense(allocator.expense(
        ana.clone(),
        "Cabin rental",
        dec!(480.00),
        day(16),
        &SplitMethod::Equal,
        &everyone,
    )?)?;
    group.record_expense(allocator.expense(
        ben.clone(),
        "Groceries",
        dec!(127.45),
        day(16),
        &SplitMethod::Shares(HashMap::from([
            (ana.clone(), 2),
            (ben.clone(), 2),
            (cleo.clone(), 1),
            (dev.clone(), 1),
        ])),
        &everyone,
    )?)?;
    group.record_expense(allocator.expense(
        cleo.clone(),
        "Kayak hire",
        dec!(90.00),
        day(17),
        &SplitMethod::Equal,
        &[ben.clone(), cleo.clone(), dev.clone()],
    )?)?;
    group.record_expense(allocator.expense(
        dev.clone(),
        "Dinner",
        dec!(152.80),
        day(17),
        &SplitMethod::Exact(HashMap::from([
            (ana.clone(), dec!(41.20)),
            (ben.clone(), dec!(35.60)),
            (cleo.clone(), dec!(38.00)),
            (dev.clone(), dec!(38.00)),
        ])),
        &everyone,
    )?)?;

    for expense in group.expenses() {
        println!(
            "  {:<14} {:>8} paid by {:<5} [{}]",
            expense.description(),
            expense.amount(),
            expense.payer(),
            expense.strategy()
        );
    }
    println!();

    // --- Scenario 2: Balances ---
    println!("━━━ Scenario 2: Balances ━━━\n");

    for row in BalanceAggregator::detailed_balances(&group) {
        let status = if row.is_creditor() {
            "GETS BACK"
        } else if row.is_debtor() {
            "OWES"
        } else {
            "SETTLED"
        };
        println!("  {:<6} {:>10}  [{}]", row.name, row.balance, status);
    }
    println!();

    // --- Scenario 3: Simplified payments ---
    println!("━━━ Scenario 3: Suggested Payments ━━━\n");

    let balances = BalanceAggregator::compute_balances(&group);
    let plan = DebtSimplifier::simplify(&balances);
    println!("{}", plan);

    // --- Scenario 4: Paying the first suggestion ---
    println!("━━━ Scenario 4: After One Payment ━━━\n");

    if let Some(first) = plan.payments().first() {
        group.record_settlement(Settlement::new(
            first.from.clone(),
            first.to.clone(),
            first.amount,
        )?)?;
        println!("  {} paid {} {}\n", first.from, first.to, first.amount);
    }

    let balances = BalanceAggregator::compute_balances(&group);
    println!("{}", DebtSimplifier::simplify(&balances));
    println!("{}", GroupSummary::from_group(&group));

    Ok(())
}
