//! Slot-based weight timelines.
//!
//! A [`WeightTimeline`] records one [`Point`] per period-aligned slot. The
//! latest slot is always the boundary after the last checkpoint, so a
//! checkpoint at `now` replays forward to `next_period(now)` and every slot
//! it writes is a boundary. Replay uses [`ExhaustionRule::ZeroBoth`].
//!
//! Replays are split into [`WeightTimeline::plan`] and
//! [`WeightTimeline::apply`] so that a caller touching several timelines can
//! check every horizon before writing any of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use veweight_core::errors::ReplayError;
use veweight_core::period::{next_period, period_floor};
use veweight_core::{ExhaustionRule, Point, ReplayCursor, SlopeSchedule};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTimeline {
    points: BTreeMap<u64, Point>,
    changes: SlopeSchedule,
    last_slot: u64,
}

/// Slots a replay will write, and the new latest slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightReplay {
    pub points: Vec<Point>,
    pub last_slot: u64,
}

impl WeightTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.last_slot != 0
    }

    /// Start the timeline at `slot` with a zero point. No-op once started.
    pub fn init(&mut self, slot: u64) {
        if self.is_initialized() {
            return;
        }
        self.last_slot = slot;
        self.points.insert(slot, Point::zero(slot));
    }

    pub fn last_slot(&self) -> u64 {
        self.last_slot
    }

    /// Point at the latest slot.
    pub fn last_point(&self) -> Point {
        self.points
            .get(&self.last_slot)
            .copied()
            .unwrap_or_else(|| Point::zero(self.last_slot))
    }

    pub fn point_at(&self, slot: u64) -> Option<&Point> {
        self.points.get(&slot)
    }

    pub fn changes(&self) -> &SlopeSchedule {
        &self.changes
    }

    /// Replay up to the boundary after `now` without writing anything.
    pub fn plan(&self, now: u64, period: u64, max_steps: u32) -> Result<WeightReplay, ReplayError> {
        self.plan_to(next_period(now, period), now, period, max_steps)
    }

    /// Like [`WeightTimeline::plan`], but walks at most `max_steps` slots
    /// and stops on the last one within reach instead of failing. The
    /// returned `last_slot` tells how far it got.
    pub fn plan_catch_up(&self, now: u64, period: u64, max_steps: u32) -> Result<WeightReplay, ReplayError> {
        let target = next_period(now, period);
        let reached = ReplayCursor::reachable(self.last_slot, target, period, max_steps);
        self.plan_to(reached.min(target), now, period, max_steps)
    }

    /// Fails when `now` falls in a period before the latest slot's.
    pub fn ensure_current(&self, now: u64, period: u64) -> Result<(), ReplayError> {
        if self.is_initialized() && self.last_slot > next_period(now, period) {
            return Err(ReplayError::StaleContext {
                now,
                last: self.last_slot,
            });
        }
        Ok(())
    }

    fn plan_to(&self, slot: u64, now: u64, period: u64, max_steps: u32) -> Result<WeightReplay, ReplayError> {
        self.ensure_current(now, period)?;
        if !self.is_initialized() || self.last_slot >= slot {
            return Ok(WeightReplay {
                points: Vec::new(),
                last_slot: self.last_slot,
            });
        }
        let cursor = ReplayCursor::new(
            self.last_point(),
            slot,
            period,
            &self.changes,
            ExhaustionRule::ZeroBoth,
            max_steps,
        )?;
        Ok(WeightReplay {
            points: cursor.map(|step| *step.point()).collect(),
            last_slot: slot,
        })
    }

    /// Point at the latest slot once `replay` has been applied.
    pub fn point_after(&self, replay: &WeightReplay) -> Point {
        replay
            .points
            .last()
            .copied()
            .unwrap_or_else(|| self.last_point())
    }

    pub fn apply(&mut self, replay: WeightReplay) {
        for point in replay.points {
            self.points.insert(point.ts, point);
        }
        self.last_slot = replay.last_slot;
    }

    /// Replay and apply in one go.
    pub fn checkpoint(&mut self, now: u64, period: u64, max_steps: u32) -> Result<(), ReplayError> {
        let replay = self.plan(now, period, max_steps)?;
        self.apply(replay);
        Ok(())
    }

    /// Read-only value at `t`: the latest slot at or before
    /// `period_floor(t)`, extrapolated linearly without consuming scheduled
    /// slope changes. Zero when no such slot exists.
    pub fn extrapolate(&self, t: u64, period: u64) -> u128 {
        let slot = period_floor(t, period);
        self.points
            .range(..=slot)
            .next_back()
            .map_or(0, |(_, p)| p.value_at(slot))
    }

    /// Mutable point at `slot`, created as zero when missing.
    pub fn slot_mut(&mut self, slot: u64) -> &mut Point {
        self.points.entry(slot).or_insert_with(|| Point::zero(slot))
    }

    pub fn schedule(&mut self, t: u64, delta: i128) {
        self.changes.add(t, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: u64 = 100;

    #[test]
    fn uninitialized_timeline_does_not_replay() {
        let timeline = WeightTimeline::new();
        let replay = timeline.plan(1_000, P, 1).unwrap();
        assert!(replay.points.is_empty());
        assert_eq!(replay.last_slot, 0);
    }

    #[test]
    fn checkpoint_fills_every_slot_up_to_next_boundary() {
        let mut timeline = WeightTimeline::new();
        timeline.init(100);
        *timeline.slot_mut(100) = Point::new(1_000, 2, 100);
        timeline.schedule(300, -2);

        timeline.checkpoint(350, P, 10).unwrap();
        assert_eq!(timeline.last_slot(), 400);
        assert_eq!(timeline.point_at(200), Some(&Point::new(800, 2, 200)));
        assert_eq!(timeline.point_at(300), Some(&Point::new(600, 0, 300)));
        assert_eq!(timeline.point_at(400), Some(&Point::new(600, 0, 400)));
    }

    #[test]
    fn extrapolation_ignores_pending_changes() {
        let mut timeline = WeightTimeline::new();
        timeline.init(100);
        *timeline.slot_mut(100) = Point::new(1_000, 2, 100);
        timeline.schedule(300, -2);

        // Read path keeps decaying past the scheduled stop.
        assert_eq!(timeline.extrapolate(450, P), 400);
        assert_eq!(timeline.extrapolate(99, P), 0);

        timeline.checkpoint(450, P, 10).unwrap();
        assert_eq!(timeline.extrapolate(450, P), 600);
    }

    #[test]
    fn horizon_is_reported_before_writing() {
        let mut timeline = WeightTimeline::new();
        timeline.init(100);
        assert!(timeline.checkpoint(1_000, P, 3).is_err());
        assert_eq!(timeline.last_slot(), 100);
    }

    #[test]
    fn catch_up_walks_the_gap_a_few_slots_at_a_time() {
        let mut timeline = WeightTimeline::new();
        timeline.init(100);
        *timeline.slot_mut(100) = Point::new(1_000, 1, 100);

        let first = timeline.plan_catch_up(950, P, 3).unwrap();
        assert_eq!(first.last_slot, 400);
        assert_eq!(timeline.point_after(&first), Point::new(700, 1, 400));
        timeline.apply(first);

        let second = timeline.plan_catch_up(950, P, 3).unwrap();
        assert_eq!(second.last_slot, 700);
        timeline.apply(second);
        let third = timeline.plan_catch_up(950, P, 3).unwrap();
        assert_eq!(third.last_slot, 1_000);
        timeline.apply(third);

        assert_eq!(timeline.last_point(), Point::new(100, 1, 1_000));
        assert_eq!(timeline.point_at(500), Some(&Point::new(600, 1, 500)));
    }

    #[test]
    fn earlier_period_is_rejected() {
        let mut timeline = WeightTimeline::new();
        timeline.init(100);
        timeline.checkpoint(350, P, 10).unwrap();

        let err = timeline.plan(250, P, 10).unwrap_err();
        assert!(matches!(err, ReplayError::StaleContext { now: 250, last: 400 }));
        assert!(timeline.plan_catch_up(150, P, 10).is_err());
        // Same period as the last checkpoint is fine.
        assert!(timeline.plan(301, P, 10).unwrap().points.is_empty());
    }
}
