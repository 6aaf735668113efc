//! The global checkpoint timeline.
//!
//! A checkpoint is computed as a [`CheckpointPlan`] by a pure function of the
//! current timeline, the account's old and new lock, and the call context.
//! Nothing is written until [`GlobalTimeline::commit`] applies the plan, so a
//! failure anywhere between planning and commit leaves the timeline intact.

use serde::{Deserialize, Serialize};

use veweight_core::errors::{LockError, ReplayError};
use veweight_core::{BlockContext, CatchUp, ExhaustionRule, Point, ReplayCursor, SlopeSchedule};

use crate::lock::Lock;
use crate::query;

/// Old and new lock of the account a checkpoint is made for.
#[derive(Debug, Clone, Copy)]
pub struct LockChange {
    pub old: Lock,
    pub new: Lock,
}

/// Ledger-wide replay parameters.
#[derive(Debug, Clone, Copy)]
pub struct ReplayLimits {
    pub period: u64,
    pub max_lock_duration: u64,
    pub max_steps: u32,
}

/// Everything a checkpoint will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPlan {
    /// Global points at each period boundary crossed, in order.
    pub boundaries: Vec<Point>,
    /// The global point at `now`, with the account's change merged in.
    pub last: Point,
    /// The account's new point, when the checkpoint is for an account.
    pub user_point: Option<Point>,
    /// Signed deltas to add to the slope-change schedule.
    pub schedule: Vec<(u64, i128)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTimeline {
    points: Vec<Point>,
    slope_changes: SlopeSchedule,
}

impl GlobalTimeline {
    /// A timeline holding only the genesis point `{0, 0, ctx}`.
    pub fn new(ctx: BlockContext) -> Self {
        Self {
            points: vec![Point::zero(ctx.timestamp).with_block(ctx.height)],
            slope_changes: SlopeSchedule::new(),
        }
    }

    /// Index of the latest point. The genesis point is epoch 0.
    pub fn epoch(&self) -> usize {
        self.points.len() - 1
    }

    pub fn last(&self) -> &Point {
        // Never empty: built with the genesis point.
        &self.points[self.points.len() - 1]
    }

    pub fn point(&self, epoch: usize) -> Option<&Point> {
        self.points.get(epoch)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn slope_changes(&self) -> &SlopeSchedule {
        &self.slope_changes
    }

    /// Plan a checkpoint at `ctx`, optionally merging one account's change.
    ///
    /// Fails when `ctx` is earlier than the last recorded point or when the
    /// gap to it is wider than `limits.max_steps` periods.
    pub fn plan(
        &self,
        change: Option<LockChange>,
        ctx: BlockContext,
        limits: ReplayLimits,
    ) -> Result<CheckpointPlan, LockError> {
        let now = ctx.timestamp;
        let start = *self.last();
        if now < start.ts {
            return Err(ReplayError::StaleContext {
                now,
                last: start.ts,
            }
            .into());
        }
        let (u_old, u_new) = match change {
            Some(c) => (
                c.old.point_at(now, limits.max_lock_duration)?,
                c.new.point_at(now, limits.max_lock_duration)?,
            ),
            None => (Point::zero(now), Point::zero(now)),
        };

        let cursor = ReplayCursor::new(
            start,
            now,
            limits.period,
            &self.slope_changes,
            ExhaustionRule::ClampEach,
            limits.max_steps,
        )?;
        let (mut boundaries, mut last) = cursor.finish();

        for p in boundaries.iter_mut() {
            p.block = interpolate_block(&start, ctx, p.ts);
        }
        last.block = ctx.height;

        if change.is_some() {
            last = last.merged(&u_old, &u_new).ok_or(LockError::Overflow {
                context: "global point",
            })?;
        }

        let schedule = match change {
            Some(c) => schedule_updates(c, &u_old, &u_new, now),
            None => Vec::new(),
        };

        Ok(CheckpointPlan {
            boundaries,
            last,
            user_point: change.map(|_| u_new.with_block(ctx.height)),
            schedule,
        })
    }

    /// Plan an account-free checkpoint toward `ctx` that walks at most
    /// `limits.max_steps` periods.
    ///
    /// When the gap fits, this is [`GlobalTimeline::plan`] without a change.
    /// Otherwise the plan stops on the last boundary within reach, and the
    /// returned [`CatchUp`] says so; planning again from the committed
    /// result continues the walk.
    pub fn plan_catch_up(
        &self,
        ctx: BlockContext,
        limits: ReplayLimits,
    ) -> Result<(CheckpointPlan, CatchUp), LockError> {
        let now = ctx.timestamp;
        let start = *self.last();
        let reached = ReplayCursor::reachable(start.ts, now, limits.period, limits.max_steps);
        if reached >= now {
            let plan = self.plan(None, ctx, limits)?;
            return Ok((plan, CatchUp::complete(now)));
        }

        let (mut boundaries, mut last) = ReplayCursor::new(
            start,
            reached,
            limits.period,
            &self.slope_changes,
            ExhaustionRule::ClampEach,
            limits.max_steps,
        )?
        .finish();
        for p in boundaries.iter_mut() {
            p.block = interpolate_block(&start, ctx, p.ts);
        }
        last.block = interpolate_block(&start, ctx, reached);

        let plan = CheckpointPlan {
            boundaries,
            last,
            user_point: None,
            schedule: Vec::new(),
        };
        Ok((plan, CatchUp { reached, target: now }))
    }

    /// Apply a plan produced by [`GlobalTimeline::plan`] on this timeline.
    pub fn commit(&mut self, plan: &CheckpointPlan) {
        self.points.extend_from_slice(&plan.boundaries);
        self.points.push(plan.last);
        for (t, delta) in &plan.schedule {
            self.slope_changes.add(*t, *delta);
        }
    }

    /// Aggregate value at `t`: the latest point at or before `t`, replayed
    /// forward through the scheduled slope changes. Zero before genesis.
    pub fn supply_at(&self, t: u64, period: u64, max_steps: u32) -> Result<u128, ReplayError> {
        let start = match query::latest_at(&self.points, t) {
            Some(p) => *p,
            None => return Ok(0),
        };
        let (_, point) = ReplayCursor::new(
            start,
            t,
            period,
            &self.slope_changes,
            ExhaustionRule::ClampEach,
            max_steps,
        )?
        .finish();
        Ok(point.value_at(t))
    }
}

/// Slope-change schedule entries for one account's change.
///
/// The old contribution's removal at `old.end` is cancelled when it is still
/// pending; the new contribution is removed at `new.end`.
fn schedule_updates(change: LockChange, u_old: &Point, u_new: &Point, now: u64) -> Vec<(u64, i128)> {
    let mut updates = Vec::with_capacity(2);
    if change.old.end > now {
        let mut delta = u_old.slope;
        if change.new.end == change.old.end {
            delta -= u_new.slope;
        }
        updates.push((change.old.end, delta));
    }
    if change.new.end > now && change.new.end > change.old.end {
        updates.push((change.new.end, -u_new.slope));
    }
    updates
}

/// Block height at `t`, interpolated linearly between `start` and `ctx`.
fn interpolate_block(start: &Point, ctx: BlockContext, t: u64) -> u64 {
    if ctx.timestamp <= start.ts || ctx.height <= start.block {
        return start.block;
    }
    let blocks = u128::from(ctx.height - start.block);
    let secs = u128::from(ctx.timestamp - start.ts);
    let elapsed = u128::from(t.saturating_sub(start.ts));
    let offset = blocks * elapsed / secs;
    start.block.saturating_add(u64::try_from(offset).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: ReplayLimits = ReplayLimits {
        period: 100,
        max_lock_duration: 1_000,
        max_steps: 20,
    };

    #[test]
    fn plan_does_not_touch_timeline() {
        let timeline = GlobalTimeline::new(BlockContext::new(0, 0));
        let change = LockChange {
            old: Lock::default(),
            new: Lock::new(10_000, 500),
        };
        let plan = timeline
            .plan(Some(change), BlockContext::new(250, 25), LIMITS)
            .unwrap();
        assert_eq!(timeline.epoch(), 0);
        assert_eq!(plan.boundaries.len(), 2);
        assert_eq!(plan.last, Point::new(2_500, 10, 250).with_block(25));
        assert_eq!(plan.schedule, vec![(500, -10)]);
    }

    #[test]
    fn boundary_blocks_are_interpolated() {
        let timeline = GlobalTimeline::new(BlockContext::new(0, 100));
        let plan = timeline
            .plan(None, BlockContext::new(400, 500), LIMITS)
            .unwrap();
        let blocks: Vec<u64> = plan.boundaries.iter().map(|p| p.block).collect();
        assert_eq!(blocks, vec![200, 300, 400]);
        assert_eq!(plan.last.block, 500);
    }

    #[test]
    fn plan_rejects_a_context_before_the_last_point() {
        let timeline = GlobalTimeline::new(BlockContext::new(500, 50));
        let err = timeline
            .plan(None, BlockContext::new(499, 60), LIMITS)
            .unwrap_err();
        assert!(matches!(
            err,
            LockError::Replay(ReplayError::StaleContext { now: 499, last: 500 })
        ));
    }

    #[test]
    fn catch_up_plan_stops_on_the_cap_boundary() {
        let limits = ReplayLimits {
            max_steps: 3,
            ..LIMITS
        };
        let timeline = GlobalTimeline::new(BlockContext::new(0, 0));
        let (plan, progress) = timeline
            .plan_catch_up(BlockContext::new(1_000, 1_000), limits)
            .unwrap();
        assert_eq!(progress, CatchUp { reached: 300, target: 1_000 });
        assert_eq!(plan.boundaries.len(), 2);
        assert_eq!(plan.last.ts, 300);
        assert_eq!(plan.last.block, 300);

        // A gap that fits is a plain checkpoint.
        let (plan, progress) = timeline
            .plan_catch_up(BlockContext::new(250, 25), limits)
            .unwrap();
        assert!(progress.is_complete());
        assert_eq!(plan.last.ts, 250);
    }

    #[test]
    fn same_end_extension_nets_out_in_one_entry() {
        let change = LockChange {
            old: Lock::new(1_000, 500),
            new: Lock::new(3_000, 500),
        };
        let updates = schedule_updates(
            change,
            &Point::new(0, 1, 0),
            &Point::new(0, 3, 0),
            100,
        );
        assert_eq!(updates, vec![(500, -2)]);
    }

    #[test]
    fn moving_the_end_cancels_the_old_removal() {
        let change = LockChange {
            old: Lock::new(1_000, 500),
            new: Lock::new(1_000, 800),
        };
        let updates = schedule_updates(
            change,
            &Point::new(0, 1, 0),
            &Point::new(0, 1, 0),
            100,
        );
        assert_eq!(updates, vec![(500, 1), (800, -1)]);
    }
}
