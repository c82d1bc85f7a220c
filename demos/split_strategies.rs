//! The four split strategies side by side.
//!
//! Shows how each strategy partitions the same bill, where the leftover
//! cents go, and which inputs the allocator rejects.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use split_engine::allocation::split::{AllocatorConfig, RemainderPolicy, SplitAllocator, SplitMethod};
use split_engine::core::expense::ExpenseSplit;
use split_engine::core::member::MemberId;
use std::collections::HashMap;

fn print_splits(splits: &[ExpenseSplit]) {
    for split in splits {
        println!("  {:<8} {:>10}", split.member.as_str(), split.amount);
    }
    let total: Decimal = splits.iter().map(|s| s.amount).sum();
    println!("  {:<8} {:>10}\n", "total", total);
}

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  split-engine: Split Strategies Example  ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let members: Vec<MemberId> = ["ana", "ben", "cleo"].into_iter().map(MemberId::new).collect();
    let allocator = SplitAllocator::default();
    let bill = dec!(100.00);

    // --- Scenario 1: Equal ---
    println!("━━━ Scenario 1: EQUAL, {} among 3 ━━━\n", bill);
    match allocator.allocate(bill, &SplitMethod::Equal, &members) {
        Ok(splits) => print_splits(&splits),
        Err(e) => println!("  rejected: {}\n", e),
    }

    println!("━━━ Scenario 1b: EQUAL with a seeded remainder ━━━\n");
    let seeded = SplitAllocator::new(AllocatorConfig {
        remainder: RemainderPolicy::Seeded(2024),
    });
    match seeded.allocate(bill, &SplitMethod::Equal, &members) {
        Ok(splits) => print_splits(&splits),
        Err(e) => println!("  rejected: {}\n", e),
    }

    // --- Scenario 2: Exact ---
    println!("━━━ Scenario 2: EXACT ━━━\n");
    let exact = SplitMethod::Exact(HashMap::from([
        (members[0].clone(), dec!(50.00)),
        (members[1].clone(), dec!(30.00)),
        (members[2].clone(), dec!(20.00)),
    ]));
    match allocator.allocate_strict(bill, &exact, &members) {
        Ok(splits) => print_splits(&splits),
        Err(e) => println!("  rejected: {}\n", e),
    }

    // --- Scenario 3: Percentage ---
    println!("━━━ Scenario 3: PERCENTAGE 33/33/34 ━━━\n");
    let percentage = SplitMethod::Percentage(HashMap::from([
        (members[0].clone(), dec!(33)),
        (members[1].clone(), dec!(33)),
        (members[2].clone(), dec!(34)),
    ]));
    match allocator.allocate(bill, &percentage, &members) {
        Ok(splits) => print_splits(&splits),
        Err(e) => println!("  rejected: {}\n", e),
    }

    // --- Scenario 4: Shares ---
    println!("━━━ Scenario 4: SHARES 1/1/2 ━━━\n");
    let shares = SplitMethod::Shares(HashMap::from([
        (members[0].clone(), 1),
        (members[1].clone(), 1),
        (members[2].clone(), 2),
    ]));
    match allocator.allocate(bill, &shares, &members) {
        Ok(splits) => print_splits(&splits),
        Err(e) => println!("  rejected: {}\n", e),
    }

    // --- Scenario 5: Rejected inputs ---
    println!("━━━ Scenario 5: Rejected Inputs ━━━\n");
    let short = SplitMethod::Exact(HashMap::from([(members[0].clone(), dec!(40.00))]));
    let over = SplitMethod::Percentage(HashMap::from([
        (members[0].clone(), dec!(70)),
        (members[1].clone(), dec!(70)),
    ]));
    let no_shares = SplitMethod::Shares(HashMap::new());
    let cases: [(&str, Decimal, &SplitMethod, &[MemberId]); 5] = [
        ("negative total", dec!(-5), &SplitMethod::Equal, &members),
        ("no participants", bill, &SplitMethod::Equal, &[]),
        ("exact short", bill, &short, &members),
        ("over 100%", bill, &over, &members),
        ("zero shares", bill, &no_shares, &members),
    ];
    for (label, total, method, participants) in cases {
        match allocator.allocate_strict(total, method, participants) {
            Ok(_) => println!("  {:<16} accepted", label),
            Err(e) => println!("  {:<16} {}", label, e),
        }
    }
}
