// Single source of truth for all default values.

use crate::constants;

// --- Ledger ---
pub const DEFAULT_PERIOD_SECS: u64 = constants::WEEK;
pub const DEFAULT_MAX_LOCK_DURATION_SECS: u64 = constants::MAX_LOCK_DURATION;
pub const DEFAULT_LEDGER_MAX_REPLAY_PERIODS: u32 = constants::LEDGER_MAX_REPLAY_PERIODS;

// --- Gauge ---
pub const DEFAULT_VOTE_COOLDOWN_SECS: u64 = constants::VOTE_COOLDOWN;
pub const DEFAULT_GAUGE_MAX_REPLAY_PERIODS: u32 = constants::GAUGE_MAX_REPLAY_PERIODS;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
