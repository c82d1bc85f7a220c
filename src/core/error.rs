use crate::core::group::GroupId;
use crate::core::member::MemberId;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Input-validation failures raised by the engine.
///
/// Every operation is a pure function over its inputs, so these are the only
/// failure modes: nothing is retried and no partial state is left behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount {
        amount: Decimal,
        reason: &'static str,
    },
    #[error("member {0} cannot settle with themselves")]
    SelfSettlement(MemberId),
    #[error("split requires at least one participant")]
    NoParticipants,
    #[error("member {0} appears more than once in the split")]
    DuplicateParticipant(MemberId),
    #[error("total shares must be positive")]
    InvalidShares,
    #[error("invalid percentage {percentage}: {reason}")]
    InvalidPercentage {
        percentage: Decimal,
        reason: &'static str,
    },
    #[error("splits sum to {allocated}, expected {expected}")]
    InconsistentAllocation {
        expected: Decimal,
        allocated: Decimal,
    },
    #[error("member {0} is not part of the group")]
    UnknownMember(MemberId),
    #[error("member {0} is already part of the group")]
    DuplicateMember(MemberId),
    #[error("member {0} still has expenses or settlements in the group")]
    MemberInUse(MemberId),
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("expense {0} not found")]
    ExpenseNotFound(Uuid),
    #[error("settlement {0} not found")]
    SettlementNotFound(Uuid),
}
