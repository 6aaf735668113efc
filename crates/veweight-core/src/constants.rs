/// veweight system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds in one period ("week"). Locks, votes and checkpoints align to it.
pub const WEEK: u64 = 7 * 86_400;

/// Maximum lock duration: four 365-day years.
pub const MAX_LOCK_DURATION: u64 = 4 * 365 * 86_400;

/// Fixed-point scale of relative weights (1.0 == `SCALE`).
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Full allocation in basis points.
pub const MAX_BPS: u16 = 10_000;

/// Replay cap of the lock ledger, in periods. Covers `MAX_LOCK_DURATION / WEEK` (208).
pub const LEDGER_MAX_REPLAY_PERIODS: u32 = 255;

/// Replay cap of the weight aggregator, in periods.
pub const GAUGE_MAX_REPLAY_PERIODS: u32 = 500;

/// Delay between two votes of one account on the same target.
pub const VOTE_COOLDOWN: u64 = 10 * 86_400;
