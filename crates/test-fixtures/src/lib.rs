//! Shared helpers for veweight tests: an in-memory custody, a recording
//! event handler, context helpers, and the golden scenario loader.

pub mod custody;
pub mod golden;
pub mod recorder;

pub use custody::InMemoryCustody;
pub use golden::{load_scenario, list_scenarios, Scenario, Step};
pub use recorder::{RecordedEvent, RecordingHandler};

use veweight_core::constants::WEEK;
use veweight_core::BlockContext;

/// One whole token at 18 decimals.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Seconds per block used by [`ctx_at`].
pub const BLOCK_TIME: u64 = 12;

/// A week-aligned start time well past zero, so that every test begins on
/// a period boundary.
pub const GENESIS: u64 = 2_000 * WEEK;

/// Context at `timestamp` with a block height that advances with time.
pub fn ctx_at(timestamp: u64) -> BlockContext {
    BlockContext::new(timestamp, timestamp / BLOCK_TIME)
}

/// `n` whole tokens.
pub fn tokens(n: u64) -> u128 {
    u128::from(n) * UNIT
}
