//! Bounded timeline replay.
//!
//! [`ReplayCursor`] walks a [`Point`] forward toward a target timestamp one
//! period at a time. Each tick lands on the next period boundary (or on the
//! target, whichever comes first), decays the bias over the elapsed time, and
//! consumes the [`SlopeSchedule`] entry of the boundary it landed on. Landing
//! on the target consumes that entry only when the target is itself a
//! boundary.
//!
//! The number of ticks is checked when the cursor is built: a gap wider than
//! `max_steps` periods is reported as [`ReplayError::HorizonExceeded`] before
//! any caller state is touched.
//!
//! # Examples
//!
//! ```
//! use veweight_core::{ExhaustionRule, Point, ReplayCursor, SlopeSchedule};
//!
//! let mut schedule = SlopeSchedule::new();
//! schedule.set(20, -1); // the whole slope ends at t = 20
//!
//! let start = Point::new(20, 1, 0);
//! let (boundaries, last) = ReplayCursor::new(start, 25, 10, &schedule, ExhaustionRule::ClampEach, 8)
//!     .unwrap()
//!     .finish();
//! assert_eq!(boundaries.len(), 2); // t = 10 and t = 20
//! assert_eq!(last.bias, 0);
//! assert_eq!(last.slope, 0);
//! assert_eq!(last.ts, 25);
//! ```

use crate::errors::ReplayError;
use crate::period::{boundaries_between, period_floor};
use crate::point::Point;
use crate::schedule::SlopeSchedule;

/// How a tick treats a bias that decays past zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionRule {
    /// Bias and slope are each clamped at zero independently.
    ClampEach,
    /// When a tick's decay would exhaust the bias, bias and slope both reset
    /// to zero and the boundary's scheduled delta is dropped.
    ZeroBoth,
}

/// How far a bounded catch-up checkpoint got.
///
/// A checkpoint facing a gap wider than the replay cap walks the cap's worth
/// of periods, records where it stopped, and reports it here. Calling again
/// continues from `reached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchUp {
    /// Time the state now stands at.
    pub reached: u64,
    /// Time the call asked for.
    pub target: u64,
}

impl CatchUp {
    pub fn complete(target: u64) -> Self {
        Self {
            reached: target,
            target,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.reached >= self.target
    }
}

/// One tick of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStep {
    /// Landed on a period boundary before the target.
    Boundary(Point),
    /// Landed on the target; the replay is complete.
    Reached(Point),
}

impl ReplayStep {
    pub fn point(&self) -> &Point {
        match self {
            Self::Boundary(p) | Self::Reached(p) => p,
        }
    }
}

/// Explicit state machine advancing a point in fixed ticks.
#[derive(Debug, Clone)]
pub struct ReplayCursor<'a> {
    point: Point,
    target: u64,
    period: u64,
    schedule: &'a SlopeSchedule,
    rule: ExhaustionRule,
    steps: u32,
    done: bool,
}

impl<'a> ReplayCursor<'a> {
    /// Build a cursor from `start` toward `target`.
    ///
    /// Fails when reaching `target` would take more than `max_steps` ticks.
    pub fn new(
        start: Point,
        target: u64,
        period: u64,
        schedule: &'a SlopeSchedule,
        rule: ExhaustionRule,
        max_steps: u32,
    ) -> Result<Self, ReplayError> {
        let needed = Self::ticks_needed(start.ts, target, period);
        if needed > u64::from(max_steps) {
            return Err(ReplayError::HorizonExceeded {
                from: start.ts,
                to: target,
                max_steps,
            });
        }
        Ok(Self {
            point: start,
            target,
            period,
            schedule,
            rule,
            steps: 0,
            done: target <= start.ts,
        })
    }

    /// Ticks needed to walk from `from` to `to`: one per boundary in between,
    /// plus a final partial tick when `to` is not itself a boundary.
    pub fn ticks_needed(from: u64, to: u64, period: u64) -> u64 {
        if to <= from {
            return 0;
        }
        let boundaries = boundaries_between(from, to, period);
        if to % period == 0 {
            boundaries
        } else {
            boundaries + 1
        }
    }

    /// Furthest timestamp reachable from `from` toward `to` in at most
    /// `max_steps` ticks: `to` itself when it fits, otherwise the
    /// `max_steps`-th boundary after `from`.
    pub fn reachable(from: u64, to: u64, period: u64, max_steps: u32) -> u64 {
        if Self::ticks_needed(from, to, period) <= u64::from(max_steps) {
            return to;
        }
        period_floor(from, period).saturating_add(u64::from(max_steps).saturating_mul(period))
    }

    /// Ticks taken so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Current state of the walked point.
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// Run to completion, returning the boundary points crossed before the
    /// target and the point at the target.
    ///
    /// When `start` is already at or past the target, no boundaries are
    /// returned and the final point is `start` unchanged.
    pub fn finish(mut self) -> (Vec<Point>, Point) {
        let mut boundaries = Vec::new();
        for step in self.by_ref() {
            if let ReplayStep::Boundary(p) = step {
                boundaries.push(p);
            }
        }
        (boundaries, self.point)
    }

    fn tick(&mut self) -> ReplayStep {
        let boundary = period_floor(self.point.ts, self.period) + self.period;
        let (t, delta) = if boundary > self.target {
            (self.target, 0)
        } else {
            (boundary, self.schedule.at(boundary))
        };

        match self.rule {
            ExhaustionRule::ClampEach => {
                self.point.decay_to(t);
                self.point.apply_slope_delta(delta);
            }
            ExhaustionRule::ZeroBoth => {
                let dt = (t - self.point.ts) as i128;
                let d_bias = self.point.slope.saturating_mul(dt);
                if self.point.bias > d_bias {
                    self.point.bias -= d_bias;
                    self.point.apply_slope_delta(delta);
                } else {
                    self.point.bias = 0;
                    self.point.slope = 0;
                }
                self.point.ts = t;
            }
        }

        self.steps += 1;
        if t == self.target {
            self.done = true;
            ReplayStep::Reached(self.point)
        } else {
            ReplayStep::Boundary(self.point)
        }
    }
}

impl Iterator for ReplayCursor<'_> {
    type Item = ReplayStep;

    fn next(&mut self) -> Option<ReplayStep> {
        if self.done {
            return None;
        }
        Some(self.tick())
    }
}
