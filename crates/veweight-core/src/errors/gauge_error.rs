//! Weight aggregator and vote allocation errors.

use super::error_code::{self, ErrorCode};
use super::ReplayError;

#[derive(Debug, thiserror::Error)]
pub enum GaugeError {
    #[error("category name must not be empty")]
    InvalidCategoryName,

    #[error("category not found: {0}")]
    CategoryNotFound(u32),

    #[error("gauge already registered: {0}")]
    GaugeAlreadyExists(String),

    #[error("gauge not found: {0}")]
    GaugeNotFound(String),

    #[error("vote weight {bps} bps is out of range (max 10000)")]
    WeightOutOfRange { bps: u16 },

    #[error("gauge weight {weight} is too large")]
    WeightTooLarge { weight: u128 },

    #[error("cannot vote on {target} so often: next vote allowed at {next_allowed}, now {now}")]
    VoteCooldown {
        target: String,
        next_allowed: u64,
        now: u64,
    },

    #[error("lock of {account} ends at {lock_end}, not after the next period {next_period}")]
    LockExpiresTooSoon {
        account: String,
        lock_end: u64,
        next_period: u64,
    },

    #[error("no usable voting power for {account} at {bps} bps")]
    NoVotingPower { account: String, bps: u16 },

    #[error("allocation of {account} would reach {requested} bps (max 10000)")]
    AllocationExceeded { account: String, requested: u32 },

    #[error("arithmetic overflow in {context}")]
    Overflow { context: &'static str },

    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),
}

impl ErrorCode for GaugeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCategoryName | Self::CategoryNotFound(_) => error_code::UNKNOWN_CATEGORY,
            Self::GaugeAlreadyExists(_) => error_code::GAUGE_EXISTS,
            Self::GaugeNotFound(_) => error_code::UNKNOWN_GAUGE,
            Self::WeightOutOfRange { .. } | Self::WeightTooLarge { .. } => {
                error_code::INVALID_WEIGHT
            }
            Self::VoteCooldown { .. } => error_code::VOTE_COOLDOWN,
            Self::LockExpiresTooSoon { .. } => error_code::LOCK_EXPIRED,
            Self::NoVotingPower { .. } => error_code::NO_VOTING_POWER,
            Self::AllocationExceeded { .. } => error_code::ALLOCATION_EXCEEDED,
            Self::Overflow { .. } => error_code::ARITHMETIC_OVERFLOW,
            Self::Replay(e) => e.error_code(),
        }
    }
}
