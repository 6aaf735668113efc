use serde::{Deserialize, Serialize};

use super::defaults;

/// Weight aggregator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Seconds an account must wait between two votes on the same target.
    pub vote_cooldown_secs: u64,
    /// Maximum periods a single weight-timeline replay may walk.
    pub max_replay_periods: u32,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            vote_cooldown_secs: defaults::DEFAULT_VOTE_COOLDOWN_SECS,
            max_replay_periods: defaults::DEFAULT_GAUGE_MAX_REPLAY_PERIODS,
        }
    }
}
