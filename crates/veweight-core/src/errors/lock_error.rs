//! Lock ledger errors.

use super::error_code::{self, ErrorCode};
use super::{CustodyError, ReplayError};

/// Errors raised by lock ledger operations. Validation variants are raised
/// before any state is touched.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("invalid amount: must be greater than 0")]
    InvalidAmount,

    #[error("account {account} already holds a lock; withdraw it first")]
    LockAlreadyExists { account: String },

    #[error("no existing lock found for {account}")]
    NoExistingLock { account: String },

    #[error("lock of {account} expired at {end} (now {now}); withdraw first")]
    LockExpired { account: String, end: u64, now: u64 },

    #[error("lock of {account} has not expired: ends at {end}, now {now}")]
    LockNotExpired { account: String, end: u64, now: u64 },

    #[error("unlock time {unlock_time} is not in the future (now {now})")]
    UnlockTimeNotInFuture { unlock_time: u64, now: u64 },

    #[error("unlock time {unlock_time} exceeds the maximum of {max}")]
    UnlockTimeTooFar { unlock_time: u64, max: u64 },

    #[error("unlock time can only increase: current {current}, requested {requested}")]
    UnlockTimeNotIncreased { current: u64, requested: u64 },

    #[error("arithmetic overflow in {context}")]
    Overflow { context: &'static str },

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),
}

impl ErrorCode for LockError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => error_code::INVALID_AMOUNT,
            Self::LockAlreadyExists { .. } => error_code::LOCK_EXISTS,
            Self::NoExistingLock { .. } => error_code::NO_LOCK,
            Self::LockExpired { .. } => error_code::LOCK_EXPIRED,
            Self::LockNotExpired { .. } => error_code::LOCK_NOT_EXPIRED,
            Self::UnlockTimeNotInFuture { .. }
            | Self::UnlockTimeTooFar { .. }
            | Self::UnlockTimeNotIncreased { .. } => error_code::INVALID_UNLOCK_TIME,
            Self::Overflow { .. } => error_code::ARITHMETIC_OVERFLOW,
            Self::Custody(e) => e.error_code(),
            Self::Replay(e) => e.error_code(),
        }
    }
}
