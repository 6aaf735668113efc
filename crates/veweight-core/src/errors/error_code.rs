//! ErrorCode trait for stable, machine-readable error identifiers.

/// Every error enum implements this to expose a structured code string
/// that off-ledger consumers can match on without parsing messages.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "LOCK_NOT_EXPIRED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CUSTODY_ERROR: &str = "CUSTODY_ERROR";
pub const REPLAY_HORIZON_EXCEEDED: &str = "REPLAY_HORIZON_EXCEEDED";
pub const STALE_CONTEXT: &str = "STALE_CONTEXT";
pub const INVALID_AMOUNT: &str = "INVALID_AMOUNT";
pub const LOCK_EXISTS: &str = "LOCK_EXISTS";
pub const NO_LOCK: &str = "NO_LOCK";
pub const LOCK_EXPIRED: &str = "LOCK_EXPIRED";
pub const LOCK_NOT_EXPIRED: &str = "LOCK_NOT_EXPIRED";
pub const INVALID_UNLOCK_TIME: &str = "INVALID_UNLOCK_TIME";
pub const ARITHMETIC_OVERFLOW: &str = "ARITHMETIC_OVERFLOW";
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN_CATEGORY";
pub const UNKNOWN_GAUGE: &str = "UNKNOWN_GAUGE";
pub const GAUGE_EXISTS: &str = "GAUGE_EXISTS";
pub const INVALID_WEIGHT: &str = "INVALID_WEIGHT";
pub const VOTE_COOLDOWN: &str = "VOTE_COOLDOWN";
pub const NO_VOTING_POWER: &str = "NO_VOTING_POWER";
pub const ALLOCATION_EXCEEDED: &str = "ALLOCATION_EXCEEDED";
