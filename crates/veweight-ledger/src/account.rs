//! Per-account ledger record.

use serde::{Deserialize, Serialize};

use veweight_core::Point;

use crate::lock::Lock;

/// Everything the ledger tracks for one account: the current lock and one
/// point per mutation of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub lock: Lock,
    pub history: Vec<Point>,
}

impl AccountRecord {
    /// The most recently recorded point.
    pub fn latest(&self) -> Option<&Point> {
        self.history.last()
    }

    /// The latest point recorded at or before `t`.
    pub fn point_at(&self, t: u64) -> Option<&Point> {
        crate::query::latest_at(&self.history, t)
    }
}
