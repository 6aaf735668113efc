//! Timeline replay errors.

use super::error_code::{self, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// The gap since the last checkpoint needs more ticks than the cap allows.
    #[error("replay from {from} to {to} exceeds the horizon of {max_steps} periods")]
    HorizonExceeded { from: u64, to: u64, max_steps: u32 },

    /// The call observed a time earlier than the last recorded checkpoint.
    #[error("call time {now} is before the last checkpoint at {last}")]
    StaleContext { now: u64, last: u64 },
}

impl ErrorCode for ReplayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::HorizonExceeded { .. } => error_code::REPLAY_HORIZON_EXCEEDED,
            Self::StaleContext { .. } => error_code::STALE_CONTEXT,
        }
    }
}
