use serde::{Deserialize, Serialize};

use super::defaults;

/// Lock ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Period length in seconds. Lock ends and checkpoints align to it.
    pub period_secs: u64,
    /// Longest lock accepted, in seconds. Also the slope divisor.
    pub max_lock_duration_secs: u64,
    /// Maximum periods a single replay may walk.
    pub max_replay_periods: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            period_secs: defaults::DEFAULT_PERIOD_SECS,
            max_lock_duration_secs: defaults::DEFAULT_MAX_LOCK_DURATION_SECS,
            max_replay_periods: defaults::DEFAULT_LEDGER_MAX_REPLAY_PERIODS,
        }
    }
}

impl LedgerConfig {
    /// Periods spanned by the longest lock, rounded up.
    pub fn max_lock_periods(&self) -> u64 {
        self.max_lock_duration_secs.div_ceil(self.period_secs.max(1))
    }
}
