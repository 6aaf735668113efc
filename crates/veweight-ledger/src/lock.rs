//! A single account's lock and the decay function it contributes.

use serde::{Deserialize, Serialize};

use veweight_core::errors::LockError;
use veweight_core::Point;

/// Locked amount and period-aligned unlock time.
///
/// The default value is the empty lock: nothing deposited, or already
/// withdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lock {
    pub amount: u128,
    pub end: u64,
}

impl Lock {
    pub fn new(amount: u128, end: u64) -> Self {
        Self { amount, end }
    }

    /// Whether the lock holds anything, expired or not.
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.end <= now
    }

    /// The decay function this lock contributes at `now`.
    ///
    /// Slope is `amount / max_lock_duration` (floor). Bias is the slope times
    /// the remaining duration, or zero once the lock has expired.
    pub fn point_at(&self, now: u64, max_lock_duration: u64) -> Result<Point, LockError> {
        if self.is_empty() || self.is_expired(now) {
            return Ok(Point::zero(now));
        }
        let slope = i128::try_from(self.amount / u128::from(max_lock_duration))
            .map_err(|_| LockError::Overflow {
                context: "lock slope",
            })?;
        let bias = slope
            .checked_mul(i128::from(self.end - now))
            .ok_or(LockError::Overflow {
                context: "lock bias",
            })?;
        Ok(Point::new(bias, slope, now))
    }
}
