//! Synthetic group histories for benchmarks and stress testing.
//!
//! Generation is seeded so a given configuration always produces the same
//! members, expenses and settlements (ids and timestamps aside).

use crate::allocation::split::{AllocatorConfig, RemainderPolicy, SplitAllocator, SplitMethod};
use crate::core::error::EngineError;
use crate::core::group::Group;
use crate::core::member::{Member, MemberId};
use crate::core::settlement::Settlement;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Configuration for generating a random group.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of members in the group.
    pub member_count: usize,
    /// Number of expenses to record.
    pub expense_count: usize,
    /// Number of settlements to record.
    pub settlement_count: usize,
    /// Minimum amount, in cents.
    pub min_cents: i64,
    /// Maximum amount, in cents.
    pub max_cents: i64,
    /// Date of the first expense.
    pub start_date: NaiveDate,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            member_count: 6,
            expense_count: 20,
            settlement_count: 3,
            min_cents: 100,
            max_cents: 50_000,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            seed: 42,
        }
    }
}

/// Generate a random group using every split strategy.
pub fn generate_random_group(config: &GeneratorConfig) -> Result<Group, EngineError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let allocator = SplitAllocator::new(AllocatorConfig {
        remainder: RemainderPolicy::Seeded(config.seed),
    });

    let mut group = Group::new(format!("GROUP-{}", config.seed), "Generated group");
    let members: Vec<MemberId> = (0..config.member_count.max(2))
        .map(|i| MemberId::new(format!("MEMBER-{:03}", i)))
        .collect();
    for member in &members {
        group.add_member(Member::new(member.as_str(), format!("Member {}", member)))?;
    }

    let low = config.min_cents.max(1);
    let high = config.max_cents.max(low + 1);
    for day in 0..config.expense_count {
        let amount = Decimal::new(rng.gen_range(low..high), 2);
        let payer = members[rng.gen_range(0..members.len())].clone();
        let count = rng.gen_range(1..=members.len());
        let participants: Vec<MemberId> =
            members.choose_multiple(&mut rng, count).cloned().collect();

        let method = match rng.gen_range(0..4) {
            0 => SplitMethod::Equal,
            1 => exact_inputs(&mut rng, amount, &participants),
            2 => percentage_inputs(&mut rng, &participants),
            _ => SplitMethod::Shares(
                participants
                    .iter()
                    .map(|m| (m.clone(), rng.gen_range(1..=4)))
                    .collect(),
            ),
        };

        let date = config.start_date + Duration::days(day as i64);
        let expense = allocator.expense(
            payer,
            format!("Expense #{}", day + 1),
            amount,
            date,
            &method,
            &participants,
        )?;
        group.record_expense(expense)?;
    }

    for _ in 0..config.settlement_count {
        let pair: Vec<&MemberId> = members.choose_multiple(&mut rng, 2).collect();
        let amount = Decimal::new(rng.gen_range(low..high), 2);
        group.record_settlement(Settlement::new(pair[0].clone(), pair[1].clone(), amount)?)?;
    }

    Ok(group)
}

/// Exact amounts that add up to `amount`: random cuts, last member takes the rest.
fn exact_inputs(rng: &mut StdRng, amount: Decimal, participants: &[MemberId]) -> SplitMethod {
    let mut left = amount;
    let mut amounts = HashMap::new();
    for (i, member) in participants.iter().enumerate() {
        let share = if i + 1 == participants.len() {
            left
        } else {
            (left * Decimal::new(rng.gen_range(0..=60), 2)).round_dp(2)
        };
        left -= share;
        amounts.insert(member.clone(), share);
    }
    SplitMethod::Exact(amounts)
}

/// Whole percentages summing to 100.
fn percentage_inputs(rng: &mut StdRng, participants: &[MemberId]) -> SplitMethod {
    let mut left = 100i64;
    let mut percentages = HashMap::new();
    for (i, member) in participants.iter().enumerate() {
        let pct = if i + 1 == participants.len() {
            left
        } else {
            rng.gen_range(0..=left)
        };
        left -= pct;
        percentages.insert(member.clone(), Decimal::from(pct));
    }
    SplitMethod::Percentage(percentages)
}
