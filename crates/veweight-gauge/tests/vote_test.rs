//! Voting and allocation through the gauge controller.

use std::sync::Arc;

use test_fixtures::{ctx_at, tokens, InMemoryCustody, RecordedEvent, RecordingHandler, GENESIS};
use veweight_core::constants::{SCALE, WEEK};
use veweight_core::errors::{GaugeError, ReplayError};
use veweight_core::{AccountId, CatchUp, CategoryId, EscrowConfig, TargetId};
use veweight_gauge::{GaugeController, VoteState};
use veweight_ledger::VotingEscrow;

const T0: u64 = GENESIS;
const COOLDOWN: u64 = 10 * 86_400;

struct World {
    ve: VotingEscrow<InMemoryCustody>,
    gc: GaugeController,
    recorder: Arc<RecordingHandler>,
}

fn world_with(config: EscrowConfig) -> World {
    let custody = InMemoryCustody::new()
        .with_balance("alice", tokens(10_000))
        .with_balance("bob", tokens(10_000))
        .with_balance("carol", tokens(10_000));
    let mut ve = VotingEscrow::new(&config, custody, ctx_at(T0));
    ve.create_lock(&acct("alice"), tokens(1_000), T0 + 104 * WEEK, ctx_at(T0))
        .unwrap();

    let recorder = Arc::new(RecordingHandler::new());
    let mut gc = GaugeController::new(&config);
    gc.register_handler(recorder.clone());
    let cat = gc.add_category("liquidity", ctx_at(T0)).unwrap();
    gc.add_gauge(&target("x"), cat, ctx_at(T0)).unwrap();
    gc.add_gauge(&target("y"), cat, ctx_at(T0)).unwrap();
    World { ve, gc, recorder }
}

fn world() -> World {
    world_with(EscrowConfig::default())
}

fn acct(name: &str) -> AccountId {
    AccountId::from(name)
}

fn target(name: &str) -> TargetId {
    TargetId::from(name)
}

// ---- Scenario B ----

#[test]
fn split_vote_yields_proportional_relative_weights() {
    let World { ve, mut gc, .. } = world();
    let alice = acct("alice");
    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 7_000, ctx_at(T0 + 60))
        .unwrap();
    gc.vote_for_gauge_weights(&ve, &alice, &target("y"), 3_000, ctx_at(T0 + 120))
        .unwrap();
    assert_eq!(gc.vote_user_power(&alice), 10_000);

    let next = T0 + WEEK;
    let x = gc.gauge_relative_weight(&target("x"), next);
    let y = gc.gauge_relative_weight(&target("y"), next);
    let tolerance = SCALE / 1_000_000;
    assert!(x.abs_diff(SCALE * 7 / 10) <= tolerance, "x = {x}");
    assert!(y.abs_diff(SCALE * 3 / 10) <= tolerance, "y = {y}");
    assert!(x + y <= SCALE);

    // Before the boundary nothing has been recorded yet.
    assert_eq!(gc.gauge_relative_weight(&target("x"), T0 + 100), 0);
}

#[test]
fn vote_records_slope_and_schedules_its_end() {
    let World { ve, mut gc, recorder } = world();
    let alice = acct("alice");
    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 2_500, ctx_at(T0))
        .unwrap();

    let slope = ve.last_user_slope(&alice) * 2_500 / 10_000;
    let end = ve.locked_end(&alice);
    let voted = gc.vote_user_slope(&alice, &target("x"));
    assert_eq!(voted.slope, slope);
    assert_eq!(voted.power, 2_500);
    assert_eq!(voted.end, end);
    assert_eq!(gc.last_user_vote(&alice, &target("x")), T0);

    let slot = gc.gauge_point(&target("x"), T0 + WEEK).unwrap();
    assert_eq!(slot.slope, slope);
    // Weights count whole periods of slope.
    let periods = (end - (T0 + WEEK)) / WEEK;
    assert_eq!(slot.bias, slope * i128::from(periods));
    assert_eq!(gc.slope_change(&target("x"), end), -slope);
    assert_eq!(gc.gauge_weight(&target("x")), slot.bias as u128);
    assert_eq!(gc.total_weight(), slot.bias as u128);

    let last = recorder.events().pop().unwrap();
    assert!(matches!(
        last,
        RecordedEvent::VoteForGauge(e) if e.weight_bps == 2_500 && e.account == alice
    ));
}

// ---- Cooldown ----

#[test]
fn revote_waits_for_the_cooldown() {
    let World { ve, mut gc, .. } = world();
    let alice = acct("alice");
    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 1_000, ctx_at(T0))
        .unwrap();

    let err = gc
        .vote_for_gauge_weights(&ve, &alice, &target("x"), 2_000, ctx_at(T0 + COOLDOWN - 1))
        .unwrap_err();
    assert!(matches!(
        err,
        GaugeError::VoteCooldown { next_allowed, .. } if next_allowed == T0 + COOLDOWN
    ));
    assert_eq!(
        gc.vote_state(&alice, &target("x"), T0 + 1),
        VoteState::CoolingDown {
            until: T0 + COOLDOWN
        }
    );

    // Other targets are not affected.
    gc.vote_for_gauge_weights(&ve, &alice, &target("y"), 1_000, ctx_at(T0 + 1))
        .unwrap();

    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 2_000, ctx_at(T0 + COOLDOWN))
        .unwrap();
    assert_eq!(gc.vote_user_power(&alice), 3_000);
    assert_eq!(gc.vote_state(&alice, &target("x"), T0 + 2 * COOLDOWN), VoteState::Active);
}

#[test]
fn zero_weight_vote_frees_budget_but_keeps_cooldown() {
    let World { ve, mut gc, .. } = world();
    let alice = acct("alice");
    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 10_000, ctx_at(T0))
        .unwrap();
    assert!(matches!(
        gc.vote_for_gauge_weights(&ve, &alice, &target("y"), 1, ctx_at(T0)),
        Err(GaugeError::AllocationExceeded {
            requested: 10_001,
            ..
        })
    ));

    let t1 = T0 + COOLDOWN;
    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 0, ctx_at(t1))
        .unwrap();
    assert_eq!(gc.vote_user_power(&alice), 0);
    assert_eq!(gc.vote_user_slope(&alice, &target("x")).power, 0);
    assert!(gc
        .vote_for_gauge_weights(&ve, &alice, &target("x"), 500, ctx_at(t1 + 1))
        .is_err());

    gc.vote_for_gauge_weights(&ve, &alice, &target("y"), 10_000, ctx_at(t1))
        .unwrap();
    assert_eq!(gc.vote_user_power(&alice), 10_000);
    assert_eq!(gc.vote_state(&alice, &target("x"), t1 + COOLDOWN), VoteState::Cleared);

    // The cleared vote no longer contributes from the next boundary on.
    let next = t1 - t1 % WEEK + WEEK;
    assert_eq!(gc.gauge_point(&target("x"), next).unwrap().bias, 0);
    assert_eq!(gc.gauge_point(&target("x"), next).unwrap().slope, 0);
}

// ---- Validation ----

#[test]
fn vote_validation() {
    let World { mut ve, mut gc, recorder } = world();
    let before = recorder.len();
    let ctx = ctx_at(T0);

    assert!(matches!(
        gc.vote_for_gauge_weights(&ve, &acct("alice"), &target("nope"), 100, ctx),
        Err(GaugeError::GaugeNotFound(_))
    ));
    assert!(matches!(
        gc.vote_for_gauge_weights(&ve, &acct("alice"), &target("x"), 10_001, ctx),
        Err(GaugeError::WeightOutOfRange { bps: 10_001 })
    ));

    // No lock at all.
    assert!(matches!(
        gc.vote_for_gauge_weights(&ve, &acct("carol"), &target("x"), 100, ctx),
        Err(GaugeError::LockExpiresTooSoon { lock_end: 0, .. })
    ));

    // Lock ending on the next boundary is too short.
    ve.create_lock(&acct("carol"), tokens(100), T0 + WEEK, ctx)
        .unwrap();
    assert!(matches!(
        gc.vote_for_gauge_weights(&ve, &acct("carol"), &target("x"), 100, ctx_at(T0 + 5)),
        Err(GaugeError::LockExpiresTooSoon { .. })
    ));

    // Slope of 1 at 50% truncates to nothing.
    ve.create_lock(&acct("bob"), 200_000_000, T0 + 10 * WEEK, ctx)
        .unwrap();
    assert_eq!(ve.last_user_slope(&acct("bob")), 1);
    assert!(matches!(
        gc.vote_for_gauge_weights(&ve, &acct("bob"), &target("x"), 5_000, ctx),
        Err(GaugeError::NoVotingPower { bps: 5_000, .. })
    ));

    assert_eq!(recorder.len(), before);
    assert_eq!(gc.total_weight(), 0);
}

#[test]
fn registration_validation_and_events() {
    let World { mut gc, recorder, .. } = world();
    assert!(matches!(
        gc.add_gauge(&target("x"), CategoryId(0), ctx_at(T0)),
        Err(GaugeError::GaugeAlreadyExists(_))
    ));
    assert!(matches!(
        gc.add_gauge(&target("z"), CategoryId(7), ctx_at(T0)),
        Err(GaugeError::CategoryNotFound(7))
    ));
    assert!(matches!(
        gc.add_category("  ", ctx_at(T0)),
        Err(GaugeError::InvalidCategoryName)
    ));

    let stake = gc.add_category("staking", ctx_at(T0)).unwrap();
    assert_eq!(stake, CategoryId(1));
    assert_eq!(gc.category_name(stake), Some("staking"));
    gc.add_gauge(&target("z"), stake, ctx_at(T0)).unwrap();
    assert_eq!(gc.gauge_category(&target("z")), Some(stake));
    assert_eq!(gc.gauges().count(), 3);

    let events = recorder.events();
    assert!(matches!(&events[0], RecordedEvent::NewCategory(e) if e.name == "liquidity"));
    assert!(matches!(events.last(), Some(RecordedEvent::NewGauge(e)) if e.category == stake));
}

// ---- Atomicity ----

#[test]
fn stale_timelines_beyond_the_horizon_reject_the_vote_untouched() {
    let mut config = EscrowConfig::default();
    config.gauge.max_replay_periods = 3;
    let World { ve, mut gc, recorder } = world_with(config);
    let before = recorder.len();
    let alice = acct("alice");

    let err = gc
        .vote_for_gauge_weights(&ve, &alice, &target("x"), 1_000, ctx_at(T0 + 10 * WEEK))
        .unwrap_err();
    assert!(matches!(
        err,
        GaugeError::Replay(ReplayError::HorizonExceeded { max_steps: 3, .. })
    ));
    assert_eq!(gc.vote_user_power(&alice), 0);
    assert_eq!(gc.vote_state(&alice, &target("x"), T0), VoteState::Unset);
    assert!(gc.gauge_point(&target("x"), T0 + 2 * WEEK).is_none());
    assert!(gc.total_point(T0 + 2 * WEEK).is_none());
    assert_eq!(recorder.len(), before);

    // Within the horizon the vote goes through.
    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 1_000, ctx_at(T0 + 2 * WEEK))
        .unwrap();
}

#[test]
fn vote_from_an_earlier_period_is_rejected_untouched() {
    let World { ve, mut gc, recorder } = world();
    let alice = acct("alice");
    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 1_000, ctx_at(T0 + 2 * WEEK))
        .unwrap();
    let before = recorder.len();
    let slot = gc.gauge_point(&target("x"), T0 + 3 * WEEK);

    let err = gc
        .vote_for_gauge_weights(&ve, &alice, &target("y"), 1_000, ctx_at(T0))
        .unwrap_err();
    assert!(matches!(err, GaugeError::Replay(ReplayError::StaleContext { now, .. }) if now == T0));
    assert_eq!(gc.vote_user_power(&alice), 1_000);
    assert_eq!(gc.gauge_point(&target("y"), T0 + WEEK).unwrap().bias, 0);
    assert_eq!(gc.gauge_point(&target("x"), T0 + 3 * WEEK), slot);
    assert_eq!(recorder.len(), before);

    assert!(gc.change_gauge_weight(&target("y"), tokens(1), ctx_at(T0)).is_err());
    assert!(gc.checkpoint(ctx_at(T0)).is_err());
    assert!(gc.add_gauge(&target("z"), CategoryId(0), ctx_at(T0)).is_err());
}

#[test]
fn checkpoints_catch_up_a_long_idle_category() {
    let config = EscrowConfig::default();
    let late = T0 + 520 * WEEK;
    let mut gc = GaugeController::new(&config);
    let cat = gc.add_category("liquidity", ctx_at(T0)).unwrap();

    let custody = InMemoryCustody::new().with_balance("alice", tokens(1_000));
    let mut ve = VotingEscrow::new(&config, custody, ctx_at(late));
    ve.create_lock(&acct("alice"), tokens(1_000), late + 104 * WEEK, ctx_at(late))
        .unwrap();
    gc.add_gauge(&target("x"), cat, ctx_at(late)).unwrap();

    let alice = acct("alice");
    let err = gc
        .vote_for_gauge_weights(&ve, &alice, &target("x"), 10_000, ctx_at(late))
        .unwrap_err();
    assert!(matches!(
        err,
        GaugeError::Replay(ReplayError::HorizonExceeded { max_steps: 500, .. })
    ));

    let first = gc.checkpoint(ctx_at(late)).unwrap();
    assert_eq!(
        first,
        CatchUp {
            reached: T0 + 501 * WEEK,
            target: late + WEEK,
        }
    );
    let second = gc.checkpoint(ctx_at(late)).unwrap();
    assert!(second.is_complete());
    assert!(gc.checkpoint(ctx_at(late)).unwrap().is_complete());

    gc.vote_for_gauge_weights(&ve, &alice, &target("x"), 10_000, ctx_at(late))
        .unwrap();
    assert_eq!(gc.gauge_relative_weight(&target("x"), late + WEEK), SCALE);
    assert_eq!(gc.category_weight(cat), gc.gauge_weight(&target("x")));
}

#[test]
fn checkpoint_gauge_reports_partial_progress() {
    let mut config = EscrowConfig::default();
    config.gauge.max_replay_periods = 4;
    let World { mut gc, .. } = world_with(config);

    let now = T0 + 8 * WEEK;
    let first = gc.checkpoint_gauge(&target("x"), ctx_at(now)).unwrap();
    assert_eq!(first.reached, T0 + 5 * WEEK);
    assert!(!first.is_complete());
    assert!(gc.gauge_point(&target("x"), T0 + 5 * WEEK).is_some());

    let second = gc.checkpoint_gauge(&target("x"), ctx_at(now)).unwrap();
    assert_eq!(second, CatchUp::complete(T0 + 9 * WEEK));
    assert!(gc.total_point(T0 + 9 * WEEK).is_some());
}
