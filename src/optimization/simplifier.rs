use crate::balance::sheet::BalanceSheet;
use crate::core::member::MemberId;
use crate::core::money::SETTLED_EPSILON;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// A payment the simplifier suggests: `from` should pay `to` the `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedPayment {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

/// Ordered list of suggested payments that clears a set of balances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementPlan {
    payments: Vec<SuggestedPayment>,
    creditors: usize,
    debtors: usize,
}

impl SettlementPlan {
    pub fn payments(&self) -> &[SuggestedPayment] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Number of members that started with a credit of at least ε.
    pub fn creditor_count(&self) -> usize {
        self.creditors
    }

    /// Number of members that started with a debt of at least ε.
    pub fn debtor_count(&self) -> usize {
        self.debtors
    }

    /// Sum of all suggested payment amounts.
    pub fn total_transferred(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Balances after every suggested payment has been made.
    pub fn replay(&self, balances: &BalanceSheet) -> BalanceSheet {
        let mut after = balances.clone();
        for payment in &self.payments {
            after.credit(&payment.from, payment.amount);
            after.credit(&payment.to, -payment.amount);
        }
        after
    }

    /// Payments involving `member`, in plan order.
    pub fn payments_for<'a>(
        &'a self,
        member: &'a MemberId,
    ) -> impl Iterator<Item = &'a SuggestedPayment> + 'a {
        self.payments
            .iter()
            .filter(move |p| &p.from == member || &p.to == member)
    }
}

impl IntoIterator for SettlementPlan {
    type Item = SuggestedPayment;
    type IntoIter = std::vec::IntoIter<SuggestedPayment>;

    fn into_iter(self) -> Self::IntoIter {
        self.payments.into_iter()
    }
}

impl std::fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Plan ===")?;
        writeln!(f, "Creditors:      {}", self.creditors)?;
        writeln!(f, "Debtors:        {}", self.debtors)?;
        writeln!(f, "Payments:       {}", self.payments.len())?;
        writeln!(f, "Total:          {}", self.total_transferred())?;
        for payment in &self.payments {
            writeln!(f, "  {} -> {}: {}", payment.from, payment.to, payment.amount)?;
        }
        Ok(())
    }
}

/// A member waiting to be matched, ordered by remaining amount (largest
/// first) and then by id (smallest first).
#[derive(Debug, PartialEq, Eq)]
struct Party {
    remaining: Decimal,
    member: MemberId,
}

impl Ord for Party {
    fn cmp(&self, other: &Self) -> Ordering {
        self.remaining
            .cmp(&other.remaining)
            .then_with(|| other.member.cmp(&self.member))
    }
}

impl PartialOrd for Party {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reduces net balances to a short list of payments.
///
/// # Algorithm
///
/// 1. Members with a balance of at least +ε are creditors, at most −ε are
///    debtors; everyone else is already settled.
/// 2. Match the largest creditor with the largest debtor (ties by id).
/// 3. The payment is the smaller of the two remaining amounts.
/// 4. Whoever is left inside the ε band drops out; the other goes back.
/// 5. Stop when either side is empty.
///
/// Each round removes at least one party, so a plan never has more than
/// `creditors + debtors - 1` payments. Greedy matching is not always the
/// minimum number of transactions (that problem is NP-hard), but it is
/// never more than that bound.
pub struct DebtSimplifier;

impl DebtSimplifier {
    pub fn simplify(balances: &BalanceSheet) -> SettlementPlan {
        Self::simplify_map(balances.positions())
    }

    pub fn simplify_map(balances: &HashMap<MemberId, Decimal>) -> SettlementPlan {
        let mut creditors = BinaryHeap::new();
        let mut debtors = BinaryHeap::new();

        for (member, &balance) in balances {
            if balance >= SETTLED_EPSILON {
                creditors.push(Party {
                    remaining: balance,
                    member: member.clone(),
                });
            } else if balance <= -SETTLED_EPSILON {
                debtors.push(Party {
                    remaining: -balance,
                    member: member.clone(),
                });
            }
        }

        let mut plan = SettlementPlan {
            payments: Vec::new(),
            creditors: creditors.len(),
            debtors: debtors.len(),
        };

        while let (Some(mut creditor), Some(mut debtor)) = (creditors.pop(), debtors.pop()) {
            let payment = creditor.remaining.min(debtor.remaining);
            if payment >= SETTLED_EPSILON {
                log::trace!("{} pays {} {}", debtor.member, creditor.member, payment);
                plan.payments.push(SuggestedPayment {
                    from: debtor.member.clone(),
                    to: creditor.member.clone(),
                    amount: payment,
                });
            }

            creditor.remaining -= payment;
            debtor.remaining -= payment;
            if creditor.remaining >= SETTLED_EPSILON {
                creditors.push(creditor);
            }
            if debtor.remaining >= SETTLED_EPSILON {
                debtors.push(debtor);
            }
        }

        log::debug!(
            "simplified {} creditors and {} debtors into {} payments",
            plan.creditors,
            plan.debtors,
            plan.payments.len()
        );
        plan
    }
}
