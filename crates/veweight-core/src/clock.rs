//! Call-time context: the wall-clock timestamp and block height a mutating
//! call observes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp (unix seconds) and block height available to a call.
///
/// Every mutating operation takes one of these explicitly so that state
/// transitions stay deterministic given the call sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub timestamp: u64,
    pub height: u64,
}

impl BlockContext {
    pub fn new(timestamp: u64, height: u64) -> Self {
        Self { timestamp, height }
    }

    /// Context at the current wall-clock time.
    pub fn now(height: u64) -> Self {
        let ts = Utc::now().timestamp().max(0) as u64;
        Self::new(ts, height)
    }

    /// The same context moved forward by `secs` seconds and `blocks` blocks.
    pub fn advance(self, secs: u64, blocks: u64) -> Self {
        Self::new(self.timestamp + secs, self.height + blocks)
    }

    /// Timestamp as a UTC datetime, for logs and display.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.timestamp)
    }
}

/// Convert unix seconds into a UTC datetime. `None` when out of chrono's range.
pub fn to_datetime(ts: u64) -> Option<DateTime<Utc>> {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_both_axes() {
        let ctx = BlockContext::new(100, 7).advance(50, 3);
        assert_eq!(ctx, BlockContext::new(150, 10));
    }

    #[test]
    fn datetime_renders_epoch() {
        let dt = BlockContext::new(0, 0).datetime().unwrap();
        assert_eq!(dt.to_rfc3339(), "1970-01-01T00:00:00+00:00");
    }
}
