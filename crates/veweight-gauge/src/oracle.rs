//! The seam emission schedules and per-target reward accounting read from.

use veweight_core::TargetId;

use crate::controller::GaugeController;

pub trait RelativeWeightSource {
    /// Share of `target` at `t`, scaled by `SCALE` (1e18 is the whole).
    fn relative_weight(&self, target: &TargetId, t: u64) -> u128;
}

impl RelativeWeightSource for GaugeController {
    fn relative_weight(&self, target: &TargetId, t: u64) -> u128 {
        self.gauge_relative_weight(target, t)
    }
}
