//! GaugeController: per-target, per-category and overall vote weights.
//!
//! Every vote lands on the slot at the next period boundary. Before the
//! vote's delta is applied, the target's timeline, its category's timeline
//! and the overall timeline are all replayed to that slot. The three replays
//! are planned first and only applied once all of them fit the horizon, so a
//! rejected call writes nothing.
//!
//! Timelines hold biases in slope-seconds. Every slot and lock end sits on a
//! period boundary, so those biases are whole multiples of the period, and
//! every weight this controller reports or accepts is in slope-periods.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, instrument};

use veweight_core::config::{EscrowConfig, GaugeConfig};
use veweight_core::constants::{MAX_BPS, SCALE};
use veweight_core::errors::{ErrorCode, GaugeError, ReplayError};
use veweight_core::events::{
    EscrowEventHandler, EventDispatcher, NewCategoryEvent, NewGaugeEvent, NewGaugeWeightEvent,
    VoteForGaugeEvent,
};
use veweight_core::period::next_period;
use veweight_core::tracing::events as log_events;
use veweight_core::{AccountId, BlockContext, CatchUp, CategoryId, Point, TargetId};

use crate::allocation::{VoteState, VotedSlope, VoterRecord};
use crate::power::VotingPowerSource;
use crate::timeline::{WeightReplay, WeightTimeline};

#[derive(Debug, Clone)]
struct Category {
    name: String,
    timeline: WeightTimeline,
}

#[derive(Debug, Clone)]
struct Gauge {
    category: CategoryId,
    timeline: WeightTimeline,
}

pub struct GaugeController {
    config: GaugeConfig,
    period: u64,
    categories: Vec<Category>,
    gauges: BTreeMap<TargetId, Gauge>,
    total: WeightTimeline,
    voters: BTreeMap<AccountId, VoterRecord>,
    events: EventDispatcher,
}

impl GaugeController {
    pub fn new(config: &EscrowConfig) -> Self {
        Self {
            config: config.gauge.clone(),
            period: config.ledger.period_secs.max(1),
            categories: Vec::new(),
            gauges: BTreeMap::new(),
            total: WeightTimeline::new(),
            voters: BTreeMap::new(),
            events: EventDispatcher::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EscrowEventHandler>) {
        self.events.register(handler);
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    // ---- Registration ----

    /// Register a new category. Ids are assigned in registration order.
    #[instrument(skip(self, ctx), fields(now = ctx.timestamp))]
    pub fn add_category(&mut self, name: &str, ctx: BlockContext) -> Result<CategoryId, GaugeError> {
        if name.trim().is_empty() {
            return rejected("add_category", Err(GaugeError::InvalidCategoryName));
        }
        let id = CategoryId(self.categories.len() as u32);
        let mut timeline = WeightTimeline::new();
        timeline.init(next_period(ctx.timestamp, self.period));
        self.categories.push(Category {
            name: name.to_string(),
            timeline,
        });

        info!(category = %id, name, "category added");
        self.events.emit_new_category(&NewCategoryEvent {
            name: name.to_string(),
            category: id,
        });
        Ok(id)
    }

    /// Register `target` under `category`. Its first slot is the next period
    /// boundary.
    #[instrument(skip(self, target, ctx), fields(target = %target, now = ctx.timestamp))]
    pub fn add_gauge(
        &mut self,
        target: &TargetId,
        category: CategoryId,
        ctx: BlockContext,
    ) -> Result<(), GaugeError> {
        let result = self.try_add_gauge(target, category, ctx);
        rejected("add_gauge", result)
    }

    fn try_add_gauge(
        &mut self,
        target: &TargetId,
        category: CategoryId,
        ctx: BlockContext,
    ) -> Result<(), GaugeError> {
        if self.gauges.contains_key(target) {
            return Err(GaugeError::GaugeAlreadyExists(target.to_string()));
        }
        let next_time = next_period(ctx.timestamp, self.period);
        self.category(category)?
            .timeline
            .ensure_current(ctx.timestamp, self.period)?;
        self.total.ensure_current(ctx.timestamp, self.period)?;
        let cat = self.category_mut(category)?;
        cat.timeline.init(next_time);
        self.total.init(next_time);

        let mut timeline = WeightTimeline::new();
        timeline.init(next_time);
        self.gauges.insert(target.clone(), Gauge { category, timeline });

        info!(target = %target, category = %category, "gauge added");
        self.events.emit_new_gauge(&NewGaugeEvent {
            target: target.clone(),
            category,
        });
        Ok(())
    }

    // ---- Voting ----

    /// Allocate `weight_bps` of `account`'s voting power to `target`,
    /// replacing any previous vote on it.
    #[instrument(skip(self, power, account, target, ctx), fields(account = %account, target = %target, now = ctx.timestamp))]
    pub fn vote_for_gauge_weights<P: VotingPowerSource + ?Sized>(
        &mut self,
        power: &P,
        account: &AccountId,
        target: &TargetId,
        weight_bps: u16,
        ctx: BlockContext,
    ) -> Result<(), GaugeError> {
        let result = self.try_vote(power, account, target, weight_bps, ctx);
        rejected("vote_for_gauge_weights", result)
    }

    fn try_vote<P: VotingPowerSource + ?Sized>(
        &mut self,
        power: &P,
        account: &AccountId,
        target: &TargetId,
        weight_bps: u16,
        ctx: BlockContext,
    ) -> Result<(), GaugeError> {
        let now = ctx.timestamp;
        let category = self.gauge(target)?.category;
        if weight_bps > MAX_BPS {
            return Err(GaugeError::WeightOutOfRange { bps: weight_bps });
        }
        let voter = self.voters.get(account).cloned().unwrap_or_default();
        voter.check_cooldown(target, now, self.config.vote_cooldown_secs)?;

        let next_time = next_period(now, self.period);
        let lock_end = power.locked_end(account);
        let new = if weight_bps == 0 {
            VotedSlope {
                slope: 0,
                power: 0,
                end: lock_end,
            }
        } else {
            if lock_end <= next_time {
                return Err(GaugeError::LockExpiresTooSoon {
                    account: account.to_string(),
                    lock_end,
                    next_period: next_time,
                });
            }
            let slope = power.last_user_slope(account).max(0) * i128::from(weight_bps)
                / i128::from(MAX_BPS);
            if slope == 0 {
                return Err(GaugeError::NoVotingPower {
                    account: account.to_string(),
                    bps: weight_bps,
                });
            }
            VotedSlope {
                slope,
                power: weight_bps,
                end: lock_end,
            }
        };
        let old = voter.voted_slope(target);
        let used = voter.reallocate(account, old.power, weight_bps)?;

        let plans = self.plan_gauge(target, category, now)?;
        let old_point = contribution(&old, next_time)?;
        let new_point = contribution(&new, next_time)?;
        let keep_old_slope = old.end > next_time;
        let slots = self
            .points_after(target, category, &plans)?
            .into_iter()
            .map(|slot| voted_slot(slot, &old_point, &new_point, keep_old_slope))
            .collect::<Option<Vec<_>>>()
            .ok_or(GaugeError::Overflow { context: "vote slot" })?;

        self.apply_gauge(target, category, plans);
        for (timeline, slot) in self.vote_timelines(target, category).into_iter().zip(slots) {
            *timeline.slot_mut(next_time) = slot;
            if old.end > now {
                timeline.schedule(old.end, old.slope);
            }
            if new.slope > 0 {
                timeline.schedule(new.end, -new.slope);
            }
        }

        self.voters
            .entry(account.clone())
            .or_default()
            .record_vote(target, new, now, used);

        log_events::vote_recorded(account.as_str(), target.as_str(), weight_bps, used);
        self.events.emit_vote_for_gauge(&VoteForGaugeEvent {
            account: account.clone(),
            target: target.clone(),
            weight_bps,
            timestamp: now,
        });
        Ok(())
    }

    /// The target, category and overall timelines, in that order.
    fn vote_timelines(&mut self, target: &TargetId, category: CategoryId) -> Vec<&mut WeightTimeline> {
        let mut timelines = Vec::with_capacity(3);
        if let Some(gauge) = self.gauges.get_mut(target) {
            timelines.push(&mut gauge.timeline);
        }
        if let Some(cat) = self.categories.get_mut(category.0 as usize) {
            timelines.push(&mut cat.timeline);
        }
        timelines.push(&mut self.total);
        timelines
    }

    // ---- Administration ----

    /// Set `target`'s weight at the next boundary to `weight` slope-periods,
    /// moving its category and the overall total by the same difference.
    /// Slopes are left as they are.
    #[instrument(skip(self, target, ctx), fields(target = %target, now = ctx.timestamp))]
    pub fn change_gauge_weight(
        &mut self,
        target: &TargetId,
        weight: u128,
        ctx: BlockContext,
    ) -> Result<(), GaugeError> {
        let result = self.try_change_gauge_weight(target, weight, ctx);
        rejected("change_gauge_weight", result)
    }

    fn try_change_gauge_weight(
        &mut self,
        target: &TargetId,
        weight: u128,
        ctx: BlockContext,
    ) -> Result<(), GaugeError> {
        let now = ctx.timestamp;
        let category = self.gauge(target)?.category;
        let new_weight = i128::try_from(weight)
            .ok()
            .and_then(|w| w.checked_mul(i128::from(self.period)))
            .ok_or(GaugeError::WeightTooLarge { weight })?;

        let plans = self.plan_gauge(target, category, now)?;
        let [gauge, cat, total] = self.points_after(target, category, &plans)?;
        let old_weight = gauge.bias;
        let shift = |bias: i128| {
            bias.checked_add(new_weight)
                .map(|b| (b - old_weight).max(0))
                .ok_or(GaugeError::Overflow { context: "gauge weight" })
        };
        let biases = [new_weight, shift(cat.bias)?, shift(total.bias)?];

        self.apply_gauge(target, category, plans);
        let next_time = next_period(now, self.period);
        for (timeline, bias) in self.vote_timelines(target, category).into_iter().zip(biases) {
            timeline.slot_mut(next_time).bias = bias;
        }
        let total_weight = self.in_periods(biases[2]);

        info!(target = %target, weight = %weight, "gauge weight changed");
        self.events.emit_new_gauge_weight(&NewGaugeWeightEvent {
            target: target.clone(),
            timestamp: now,
            weight,
            total_weight,
        });
        Ok(())
    }

    // ---- Checkpoints ----

    /// Replay the overall timeline and every category timeline toward the
    /// boundary after `ctx`.
    ///
    /// Each timeline walks at most `max_replay_periods` slots per call. The
    /// returned [`CatchUp`] holds the slot the laggiest timeline reached and
    /// the boundary asked for; repeat the call until it is complete.
    #[instrument(skip(self, ctx), fields(now = ctx.timestamp))]
    pub fn checkpoint(&mut self, ctx: BlockContext) -> Result<CatchUp, GaugeError> {
        let result = self.try_checkpoint(ctx);
        rejected("checkpoint", result)
    }

    fn try_checkpoint(&mut self, ctx: BlockContext) -> Result<CatchUp, GaugeError> {
        let now = ctx.timestamp;
        let max = self.config.max_replay_periods;
        let total = self.total.plan_catch_up(now, self.period, max)?;
        let categories = self
            .categories
            .iter()
            .map(|c| c.timeline.plan_catch_up(now, self.period, max))
            .collect::<Result<Vec<_>, _>>()?;
        let progress = progress(
            std::iter::once(&total).chain(&categories),
            next_period(now, self.period),
        );

        log_replay("total", &self.total, &total);
        self.total.apply(total);
        for (cat, plan) in self.categories.iter_mut().zip(categories) {
            cat.timeline.apply(plan);
        }
        log_partial(&progress);
        Ok(progress)
    }

    /// Replay `target`, its category and the overall timeline toward the
    /// boundary after `ctx`, walking at most `max_replay_periods` slots on
    /// each, like [`GaugeController::checkpoint`].
    #[instrument(skip(self, target, ctx), fields(target = %target, now = ctx.timestamp))]
    pub fn checkpoint_gauge(&mut self, target: &TargetId, ctx: BlockContext) -> Result<CatchUp, GaugeError> {
        let result = self.try_checkpoint_gauge(target, ctx.timestamp);
        rejected("checkpoint_gauge", result)
    }

    fn try_checkpoint_gauge(&mut self, target: &TargetId, now: u64) -> Result<CatchUp, GaugeError> {
        let category = self.gauge(target)?.category;
        let max = self.config.max_replay_periods;
        let plans = self.plan_each(target, category, |t| t.plan_catch_up(now, self.period, max))?;
        let progress = progress(plans.iter(), next_period(now, self.period));
        self.apply_gauge(target, category, plans);
        log_partial(&progress);
        Ok(progress)
    }

    fn plan_gauge(
        &self,
        target: &TargetId,
        category: CategoryId,
        now: u64,
    ) -> Result<[WeightReplay; 3], GaugeError> {
        let max = self.config.max_replay_periods;
        self.plan_each(target, category, |t| t.plan(now, self.period, max))
    }

    /// Run `plan` on the target, category and overall timelines, in that
    /// order.
    fn plan_each<F>(&self, target: &TargetId, category: CategoryId, plan: F) -> Result<[WeightReplay; 3], GaugeError>
    where
        F: Fn(&WeightTimeline) -> Result<WeightReplay, ReplayError>,
    {
        Ok([
            plan(&self.gauge(target)?.timeline)?,
            plan(&self.category(category)?.timeline)?,
            plan(&self.total)?,
        ])
    }

    /// Latest points of the three timelines once `plans` are applied.
    fn points_after(
        &self,
        target: &TargetId,
        category: CategoryId,
        plans: &[WeightReplay; 3],
    ) -> Result<[Point; 3], GaugeError> {
        Ok([
            self.gauge(target)?.timeline.point_after(&plans[0]),
            self.category(category)?.timeline.point_after(&plans[1]),
            self.total.point_after(&plans[2]),
        ])
    }

    fn apply_gauge(&mut self, target: &TargetId, category: CategoryId, plans: [WeightReplay; 3]) {
        let [gauge_plan, category_plan, total_plan] = plans;
        if let Some(gauge) = self.gauges.get_mut(target) {
            log_replay(target.as_str(), &gauge.timeline, &gauge_plan);
            gauge.timeline.apply(gauge_plan);
        }
        if let Some(cat) = self.categories.get_mut(category.0 as usize) {
            cat.timeline.apply(category_plan);
        }
        self.total.apply(total_plan);
    }

    // ---- Relative weight ----

    /// Share of `target` at `t`, scaled by `SCALE`.
    ///
    /// Read-only: both the target's and the overall timeline are
    /// extrapolated linearly from their latest slot at or before
    /// `period_floor(t)`, so the result drifts from
    /// [`GaugeController::gauge_relative_weight_write`] while checkpoints are
    /// stale. Zero when the overall weight is zero or the target is unknown.
    pub fn gauge_relative_weight(&self, target: &TargetId, t: u64) -> u128 {
        let Some(gauge) = self.gauges.get(target) else {
            return 0;
        };
        let total = self.total.extrapolate(t, self.period);
        let weight = gauge.timeline.extrapolate(t, self.period);
        scaled_ratio(weight, total)
    }

    /// Checkpoint `target`, its category and the total, then read its share
    /// at `t`.
    pub fn gauge_relative_weight_write(
        &mut self,
        target: &TargetId,
        t: u64,
        ctx: BlockContext,
    ) -> Result<u128, GaugeError> {
        self.checkpoint_gauge(target, ctx)?;
        Ok(self.gauge_relative_weight(target, t))
    }

    // ---- Queries ----

    pub fn gauges(&self) -> impl Iterator<Item = &TargetId> {
        self.gauges.keys()
    }

    pub fn gauge_category(&self, target: &TargetId) -> Option<CategoryId> {
        self.gauges.get(target).map(|g| g.category)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn category_name(&self, category: CategoryId) -> Option<&str> {
        self.categories
            .get(category.0 as usize)
            .map(|c| c.name.as_str())
    }

    /// Weight of `target` at its latest slot, in slope-periods.
    pub fn gauge_weight(&self, target: &TargetId) -> u128 {
        self.gauges
            .get(target)
            .map_or(0, |g| self.in_periods(g.timeline.last_point().bias))
    }

    pub fn category_weight(&self, category: CategoryId) -> u128 {
        self.categories
            .get(category.0 as usize)
            .map_or(0, |c| self.in_periods(c.timeline.last_point().bias))
    }

    pub fn total_weight(&self) -> u128 {
        self.in_periods(self.total.last_point().bias)
    }

    /// Recorded point of `target` at `slot`, bias in slope-periods.
    pub fn gauge_point(&self, target: &TargetId, slot: u64) -> Option<Point> {
        self.gauges
            .get(target)
            .and_then(|g| g.timeline.point_at(slot))
            .map(|p| self.exposed(p))
    }

    pub fn total_point(&self, slot: u64) -> Option<Point> {
        self.total.point_at(slot).map(|p| self.exposed(p))
    }

    pub fn slope_change(&self, target: &TargetId, t: u64) -> i128 {
        self.gauges.get(target).map_or(0, |g| g.timeline.changes().at(t))
    }

    /// Basis points of voting power `account` has allocated.
    pub fn vote_user_power(&self, account: &AccountId) -> u16 {
        self.voters.get(account).map_or(0, |v| v.used_power)
    }

    pub fn vote_user_slope(&self, account: &AccountId, target: &TargetId) -> VotedSlope {
        self.voters
            .get(account)
            .map(|v| v.voted_slope(target))
            .unwrap_or_default()
    }

    pub fn last_user_vote(&self, account: &AccountId, target: &TargetId) -> u64 {
        self.voters.get(account).map_or(0, |v| v.last_vote(target))
    }

    pub fn vote_state(&self, account: &AccountId, target: &TargetId, t: u64) -> VoteState {
        self.voters.get(account).map_or(VoteState::Unset, |v| {
            v.state(target, t, self.config.vote_cooldown_secs)
        })
    }

    pub fn voter(&self, account: &AccountId) -> Option<&VoterRecord> {
        self.voters.get(account)
    }

    fn in_periods(&self, bias: i128) -> u128 {
        bias.max(0) as u128 / u128::from(self.period)
    }

    fn exposed(&self, point: &Point) -> Point {
        Point {
            bias: point.bias / i128::from(self.period),
            ..*point
        }
    }

    fn gauge(&self, target: &TargetId) -> Result<&Gauge, GaugeError> {
        self.gauges
            .get(target)
            .ok_or_else(|| GaugeError::GaugeNotFound(target.to_string()))
    }

    fn category(&self, category: CategoryId) -> Result<&Category, GaugeError> {
        self.categories
            .get(category.0 as usize)
            .ok_or(GaugeError::CategoryNotFound(category.0))
    }

    fn category_mut(&mut self, category: CategoryId) -> Result<&mut Category, GaugeError> {
        self.categories
            .get_mut(category.0 as usize)
            .ok_or(GaugeError::CategoryNotFound(category.0))
    }
}

impl std::fmt::Debug for GaugeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaugeController")
            .field("categories", &self.categories.len())
            .field("gauges", &self.gauges.len())
            .field("voters", &self.voters.len())
            .finish()
    }
}

/// Bias and slope a vote contributes at `slot`. Zero once the vote's lock
/// has ended.
fn contribution(vote: &VotedSlope, slot: u64) -> Result<Point, GaugeError> {
    if vote.end <= slot || vote.slope == 0 {
        return Ok(Point::zero(slot));
    }
    vote.slope
        .checked_mul(i128::from(vote.end - slot))
        .map(|bias| Point::new(bias, vote.slope, slot))
        .ok_or(GaugeError::Overflow { context: "vote contribution" })
}

/// `slot` with `old` swapped for `new`. Neither field drops below zero; the
/// old slope only comes off while the old vote is still running.
fn voted_slot(slot: Point, old: &Point, new: &Point, keep_old_slope: bool) -> Option<Point> {
    let bias = slot.bias.checked_add(new.bias)?.max(old.bias) - old.bias;
    let slope = slot.slope.checked_add(new.slope)?;
    let slope = if keep_old_slope {
        slope.max(old.slope) - old.slope
    } else {
        slope
    };
    Some(Point { bias, slope, ..slot })
}

/// How far a set of catch-up replays got toward `target`.
fn progress<'a>(plans: impl Iterator<Item = &'a WeightReplay>, target: u64) -> CatchUp {
    let reached = plans
        .map(|p| p.last_slot)
        .filter(|slot| *slot != 0)
        .min()
        .unwrap_or(target);
    CatchUp { reached, target }
}

fn log_partial(progress: &CatchUp) {
    if !progress.is_complete() {
        info!(reached = progress.reached, target = progress.target, "partial catch-up checkpoint");
    }
}

/// `num * SCALE / den`, floored and capped at `SCALE`. Zero when `den` is
/// zero.
fn scaled_ratio(num: u128, den: u128) -> u128 {
    const STEP: u128 = 1_000_000;
    if den == 0 {
        return 0;
    }
    if num >= den {
        return SCALE;
    }
    if den > u128::MAX / STEP {
        let shift = (128 - den.leading_zeros()).saturating_sub(108);
        return scaled_ratio(num >> shift, den >> shift);
    }
    // Long division in base 1e6, three digits for SCALE = 1e18.
    let mut rem = num;
    let mut out = 0;
    for _ in 0..3 {
        rem *= STEP;
        out = out * STEP + rem / den;
        rem %= den;
    }
    out
}

fn log_replay(name: &str, timeline: &WeightTimeline, plan: &WeightReplay) {
    if !plan.points.is_empty() {
        log_events::timeline_replayed(name, timeline.last_slot(), plan.last_slot, plan.points.len());
    }
}

fn rejected<T>(operation: &'static str, result: Result<T, GaugeError>) -> Result<T, GaugeError> {
    result.inspect_err(|e| {
        log_events::operation_rejected(operation, e.error_code(), &e.to_string());
    })
}
