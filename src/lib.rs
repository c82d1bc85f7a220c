//! # split-engine
//!
//! Shared-expense splitting, balance aggregation and debt simplification.
//!
//! Given a group's expenses (each split among participants) and its direct
//! settlements, this engine derives every member's net balance and suggests
//! a short list of payments that clears all debts.
//!
//! ## Architecture
//!
//! - **core** — Foundational records: members, expenses, settlements, groups
//! - **allocation** — Splitting an expense total into exact per-member shares
//! - **balance** — Net balances and group summaries
//! - **optimization** — Greedy debt simplification
//! - **simulation** — Seeded random groups for benchmarks and stress tests

pub mod allocation;
pub mod balance;
pub mod core;
pub mod optimization;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::allocation::split::{AllocatorConfig, RemainderPolicy, SplitAllocator, SplitMethod};
    pub use crate::balance::aggregator::{BalanceAggregator, MemberBalance};
    pub use crate::balance::sheet::BalanceSheet;
    pub use crate::core::error::EngineError;
    pub use crate::core::expense::{Expense, ExpenseSplit, SplitStrategy};
    pub use crate::core::group::{Group, GroupId, GroupRegistry};
    pub use crate::core::member::{Member, MemberId};
    pub use crate::core::money::SETTLED_EPSILON;
    pub use crate::core::settlement::Settlement;
    pub use crate::optimization::simplifier::{DebtSimplifier, SettlementPlan, SuggestedPayment};
}
