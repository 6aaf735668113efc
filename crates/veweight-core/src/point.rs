//! Linear decay functions.
//!
//! A [`Point`] represents `bias - slope * (t - ts)`, clamped at zero when
//! evaluated. Every balance and weight in the system is one of these, or a
//! sum of them rolled forward by [`crate::replay::ReplayCursor`].
//!
//! # Examples
//!
//! ```
//! use veweight_core::Point;
//!
//! let p = Point::new(1_000, 10, 0);
//! assert_eq!(p.value_at(40), 600);
//! assert_eq!(p.value_at(500), 0); // clamped, never negative
//! ```

use serde::{Deserialize, Serialize};

/// A checkpointed linear decay function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Value at `ts`.
    pub bias: i128,
    /// Decrease per second.
    pub slope: i128,
    /// Reference timestamp (unix seconds).
    pub ts: u64,
    /// Block height at `ts`. Zero for aggregator slots, which carry no block.
    pub block: u64,
}

impl Point {
    pub fn new(bias: i128, slope: i128, ts: u64) -> Self {
        Self {
            bias,
            slope,
            ts,
            block: 0,
        }
    }

    /// A zero function anchored at `ts`.
    pub fn zero(ts: u64) -> Self {
        Self::new(0, 0, ts)
    }

    pub fn with_block(mut self, block: u64) -> Self {
        self.block = block;
        self
    }

    /// Evaluate at `t` by linear extrapolation from `ts`, clamped at zero.
    ///
    /// Times before `ts` are not extrapolated backwards: the function only
    /// describes the future of its checkpoint, so `bias` is returned.
    pub fn value_at(&self, t: u64) -> u128 {
        let dt = t.saturating_sub(self.ts) as i128;
        let value = self.bias.saturating_sub(self.slope.saturating_mul(dt));
        value.max(0) as u128
    }

    /// Move the reference time forward to `t`, decaying the bias and
    /// clamping it at zero. No-op when `t <= ts`.
    pub fn decay_to(&mut self, t: u64) {
        if t <= self.ts {
            return;
        }
        let dt = (t - self.ts) as i128;
        self.bias = self.bias.saturating_sub(self.slope.saturating_mul(dt)).max(0);
        self.ts = t;
    }

    /// Add a signed slope delta, clamping the slope at zero.
    pub fn apply_slope_delta(&mut self, delta: i128) {
        self.slope = self.slope.saturating_add(delta).max(0);
    }

    /// This point with `new - old` added to slope and bias, each clamped at
    /// zero. `None` when an intermediate sum overflows.
    pub fn merged(&self, old: &Point, new: &Point) -> Option<Point> {
        let slope = self.slope.checked_add(new.slope)?.checked_sub(old.slope)?;
        let bias = self.bias.checked_add(new.bias)?.checked_sub(old.bias)?;
        Some(Point {
            bias: bias.max(0),
            slope: slope.max(0),
            ..*self
        })
    }

    pub fn is_zero(&self) -> bool {
        self.bias == 0 && self.slope == 0
    }
}
