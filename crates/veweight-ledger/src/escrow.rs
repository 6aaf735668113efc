//! VotingEscrow: the lock ledger.
//!
//! Mutating operations follow one order: validate, plan the checkpoint,
//! request the custody transfer, commit, then emit events. Validation and
//! planning never write, and custody is the last thing that can fail, so a
//! rejected call leaves the ledger exactly as it was.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use veweight_core::config::{EscrowConfig, LedgerConfig};
use veweight_core::errors::{ErrorCode, LockError, ReplayError};
use veweight_core::events::{
    DepositEvent, DepositKind, EscrowEventHandler, EventDispatcher, SupplyEvent, WithdrawEvent,
};
use veweight_core::period::period_floor;
use veweight_core::tracing::events as log_events;
use veweight_core::{AccountId, BlockContext, CatchUp, Point};

use crate::account::AccountRecord;
use crate::custody::Custody;
use crate::lock::Lock;
use crate::timeline::{CheckpointPlan, GlobalTimeline, LockChange, ReplayLimits};

/// Per-account time-locked deposits and their aggregate decaying supply.
pub struct VotingEscrow<C: Custody> {
    config: LedgerConfig,
    custody: C,
    accounts: BTreeMap<AccountId, AccountRecord>,
    timeline: GlobalTimeline,
    supply: u128,
    events: EventDispatcher,
}

impl<C: Custody> VotingEscrow<C> {
    /// Create an empty ledger whose genesis point is anchored at `ctx`.
    pub fn new(config: &EscrowConfig, custody: C, ctx: BlockContext) -> Self {
        Self {
            config: config.ledger.clone(),
            custody,
            accounts: BTreeMap::new(),
            timeline: GlobalTimeline::new(ctx),
            supply: 0,
            events: EventDispatcher::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EscrowEventHandler>) {
        self.events.register(handler);
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    pub fn timeline(&self) -> &GlobalTimeline {
        &self.timeline
    }

    pub fn account(&self, account: &AccountId) -> Option<&AccountRecord> {
        self.accounts.get(account)
    }

    // ---- Mutations ----

    /// Lock `amount` for `account` until `unlock_time`, rounded down to a
    /// period boundary.
    #[instrument(skip(self, account, ctx), fields(account = %account, now = ctx.timestamp))]
    pub fn create_lock(
        &mut self,
        account: &AccountId,
        amount: u128,
        unlock_time: u64,
        ctx: BlockContext,
    ) -> Result<(), LockError> {
        let result = self.try_create_lock(account, amount, unlock_time, ctx);
        rejected("create_lock", result)
    }

    /// Add `amount` to the account's existing, unexpired lock.
    #[instrument(skip(self, account, ctx), fields(account = %account, now = ctx.timestamp))]
    pub fn increase_amount(
        &mut self,
        account: &AccountId,
        amount: u128,
        ctx: BlockContext,
    ) -> Result<(), LockError> {
        let result = self.try_add_to_lock(account, account, amount, DepositKind::IncreaseAmount, ctx);
        rejected("increase_amount", result)
    }

    /// Add `amount`, pulled from `payer`, to another account's existing,
    /// unexpired lock. The unlock time is unchanged.
    #[instrument(skip(self, payer, account, ctx), fields(payer = %payer, account = %account, now = ctx.timestamp))]
    pub fn deposit_for(
        &mut self,
        payer: &AccountId,
        account: &AccountId,
        amount: u128,
        ctx: BlockContext,
    ) -> Result<(), LockError> {
        let result = self.try_add_to_lock(payer, account, amount, DepositKind::DepositFor, ctx);
        rejected("deposit_for", result)
    }

    /// Move the account's unlock time forward to `unlock_time`, rounded down
    /// to a period boundary.
    #[instrument(skip(self, account, ctx), fields(account = %account, now = ctx.timestamp))]
    pub fn increase_unlock_time(
        &mut self,
        account: &AccountId,
        unlock_time: u64,
        ctx: BlockContext,
    ) -> Result<(), LockError> {
        let result = self.try_increase_unlock_time(account, unlock_time, ctx);
        rejected("increase_unlock_time", result)
    }

    /// Release an expired lock. Returns the amount handed back to custody.
    #[instrument(skip(self, account, ctx), fields(account = %account, now = ctx.timestamp))]
    pub fn withdraw(&mut self, account: &AccountId, ctx: BlockContext) -> Result<u128, LockError> {
        let result = self.try_withdraw(account, ctx);
        rejected("withdraw", result)
    }

    /// Roll the global timeline forward toward `ctx` without any account
    /// change, walking at most `max_replay_periods` periods.
    ///
    /// A gap wider than that is closed in chunks: each call commits up to
    /// the last boundary within reach and reports it in the returned
    /// [`CatchUp`]. Every other mutation keeps failing with
    /// `HorizonExceeded` until the gap is closed.
    #[instrument(skip(self, ctx), fields(now = ctx.timestamp))]
    pub fn checkpoint(&mut self, ctx: BlockContext) -> Result<CatchUp, LockError> {
        let result = self
            .timeline
            .plan_catch_up(ctx, self.limits())
            .map(|(plan, progress)| {
                self.commit_timeline(&plan);
                if !progress.is_complete() {
                    info!(reached = progress.reached, target = progress.target, "partial catch-up checkpoint");
                }
                progress
            });
        rejected("checkpoint", result)
    }

    fn try_create_lock(
        &mut self,
        account: &AccountId,
        amount: u128,
        unlock_time: u64,
        ctx: BlockContext,
    ) -> Result<(), LockError> {
        if amount == 0 {
            return Err(LockError::InvalidAmount);
        }
        let old = self.locked(account);
        if !old.is_empty() {
            return Err(LockError::LockAlreadyExists {
                account: account.to_string(),
            });
        }
        let now = ctx.timestamp;
        let unlock_time = period_floor(unlock_time, self.config.period_secs);
        if unlock_time <= now {
            return Err(LockError::UnlockTimeNotInFuture { unlock_time, now });
        }
        self.check_max_unlock(unlock_time, now)?;

        let new = Lock::new(amount, unlock_time);
        self.deposit(account, account, amount, old, new, DepositKind::CreateLock, ctx)
    }

    fn try_add_to_lock(
        &mut self,
        payer: &AccountId,
        account: &AccountId,
        amount: u128,
        kind: DepositKind,
        ctx: BlockContext,
    ) -> Result<(), LockError> {
        if amount == 0 {
            return Err(LockError::InvalidAmount);
        }
        let old = self.active_lock(account, ctx.timestamp)?;
        let new = Lock::new(
            old.amount.checked_add(amount).ok_or(LockError::Overflow {
                context: "lock amount",
            })?,
            old.end,
        );
        self.deposit(payer, account, amount, old, new, kind, ctx)
    }

    fn try_increase_unlock_time(
        &mut self,
        account: &AccountId,
        unlock_time: u64,
        ctx: BlockContext,
    ) -> Result<(), LockError> {
        let old = self.active_lock(account, ctx.timestamp)?;
        let unlock_time = period_floor(unlock_time, self.config.period_secs);
        if unlock_time <= old.end {
            return Err(LockError::UnlockTimeNotIncreased {
                current: old.end,
                requested: unlock_time,
            });
        }
        self.check_max_unlock(unlock_time, ctx.timestamp)?;

        let new = Lock::new(old.amount, unlock_time);
        self.deposit(account, account, 0, old, new, DepositKind::IncreaseUnlockTime, ctx)
    }

    fn try_withdraw(&mut self, account: &AccountId, ctx: BlockContext) -> Result<u128, LockError> {
        let old = self.locked(account);
        if old.is_empty() {
            return Err(LockError::NoExistingLock {
                account: account.to_string(),
            });
        }
        let now = ctx.timestamp;
        if now < old.end {
            return Err(LockError::LockNotExpired {
                account: account.to_string(),
                end: old.end,
                now,
            });
        }
        let supply = self.supply.checked_sub(old.amount).ok_or(LockError::Overflow {
            context: "total locked",
        })?;
        let new = Lock::default();
        let plan = self
            .timeline
            .plan(Some(LockChange { old, new }), ctx, self.limits())?;

        self.custody.transfer_out(account, old.amount)?;

        self.commit(account, new, &plan);
        let previous = std::mem::replace(&mut self.supply, supply);

        self.events.emit_withdraw(&WithdrawEvent {
            account: account.clone(),
            amount: old.amount,
            timestamp: now,
        });
        self.events.emit_supply(&SupplyEvent {
            previous,
            current: supply,
        });
        Ok(old.amount)
    }

    /// Shared tail of every deposit-like operation.
    #[allow(clippy::too_many_arguments)]
    fn deposit(
        &mut self,
        payer: &AccountId,
        account: &AccountId,
        amount: u128,
        old: Lock,
        new: Lock,
        kind: DepositKind,
        ctx: BlockContext,
    ) -> Result<(), LockError> {
        let supply = self.supply.checked_add(amount).ok_or(LockError::Overflow {
            context: "total locked",
        })?;
        let plan = self
            .timeline
            .plan(Some(LockChange { old, new }), ctx, self.limits())?;

        if amount > 0 {
            self.custody.transfer_in(payer, amount)?;
        }

        self.commit(account, new, &plan);
        let previous = std::mem::replace(&mut self.supply, supply);

        self.events.emit_deposit(&DepositEvent {
            account: account.clone(),
            amount,
            unlock_time: new.end,
            kind,
            timestamp: ctx.timestamp,
        });
        self.events.emit_supply(&SupplyEvent {
            previous,
            current: supply,
        });
        Ok(())
    }

    fn commit(&mut self, account: &AccountId, lock: Lock, plan: &CheckpointPlan) {
        let record = self.accounts.entry(account.clone()).or_default();
        record.lock = lock;
        if let Some(point) = plan.user_point {
            record.history.push(point);
        }
        self.commit_timeline(plan);
        log_events::lock_checkpointed(account.as_str(), lock.amount, lock.end, self.timeline.epoch());
    }

    fn commit_timeline(&mut self, plan: &CheckpointPlan) {
        let from = self.timeline.last().ts;
        self.timeline.commit(plan);
        if !plan.boundaries.is_empty() {
            log_events::timeline_replayed("global", from, plan.last.ts, plan.boundaries.len());
        }
        debug!(epoch = self.timeline.epoch(), bias = %plan.last.bias, slope = %plan.last.slope, "global point recorded");
    }

    /// The account's lock, which must exist and not have expired.
    fn active_lock(&self, account: &AccountId, now: u64) -> Result<Lock, LockError> {
        let lock = self.locked(account);
        if lock.is_empty() {
            return Err(LockError::NoExistingLock {
                account: account.to_string(),
            });
        }
        if lock.is_expired(now) {
            return Err(LockError::LockExpired {
                account: account.to_string(),
                end: lock.end,
                now,
            });
        }
        Ok(lock)
    }

    fn check_max_unlock(&self, unlock_time: u64, now: u64) -> Result<(), LockError> {
        let max = now.saturating_add(self.config.max_lock_duration_secs);
        if unlock_time > max {
            return Err(LockError::UnlockTimeTooFar { unlock_time, max });
        }
        Ok(())
    }

    fn limits(&self) -> ReplayLimits {
        ReplayLimits {
            period: self.config.period_secs,
            max_lock_duration: self.config.max_lock_duration_secs,
            max_steps: self.config.max_replay_periods,
        }
    }

    // ---- Queries ----

    /// Voting power of `account` at `t`, extrapolated linearly from its
    /// latest point. Times before that point fall back to
    /// [`VotingEscrow::balance_of_at`].
    pub fn balance_of(&self, account: &AccountId, t: u64) -> u128 {
        match self.accounts.get(account).and_then(AccountRecord::latest) {
            Some(latest) if t >= latest.ts => latest.value_at(t),
            Some(_) => self.balance_of_at(account, t),
            None => 0,
        }
    }

    /// Voting power of `account` at `t`, from the latest point recorded at
    /// or before `t`.
    pub fn balance_of_at(&self, account: &AccountId, t: u64) -> u128 {
        self.accounts
            .get(account)
            .and_then(|record| record.point_at(t))
            .map_or(0, |p| p.value_at(t))
    }

    /// Total voting power at `t`. Scheduled slope changes between the last
    /// global point and `t` are replayed, so the result is exact.
    pub fn total_supply(&self, t: u64) -> Result<u128, ReplayError> {
        self.total_supply_at(t)
    }

    /// Total voting power at `t`, replayed from the latest global point at
    /// or before `t`.
    pub fn total_supply_at(&self, t: u64) -> Result<u128, ReplayError> {
        self.timeline
            .supply_at(t, self.config.period_secs, self.config.max_replay_periods)
    }

    pub fn locked(&self, account: &AccountId) -> Lock {
        self.accounts
            .get(account)
            .map(|record| record.lock)
            .unwrap_or_default()
    }

    pub fn locked_end(&self, account: &AccountId) -> u64 {
        self.locked(account).end
    }

    /// Slope of the account's latest point, zero when it has none.
    pub fn last_user_slope(&self, account: &AccountId) -> i128 {
        self.accounts
            .get(account)
            .and_then(AccountRecord::latest)
            .map_or(0, |p| p.slope)
    }

    /// Number of points recorded for `account`.
    pub fn user_point_epoch(&self, account: &AccountId) -> usize {
        self.accounts.get(account).map_or(0, |r| r.history.len())
    }

    pub fn user_point_history(&self, account: &AccountId, idx: usize) -> Option<Point> {
        self.accounts
            .get(account)
            .and_then(|r| r.history.get(idx).copied())
    }

    /// Index of the latest global point.
    pub fn epoch(&self) -> usize {
        self.timeline.epoch()
    }

    pub fn point_history(&self, epoch: usize) -> Option<Point> {
        self.timeline.point(epoch).copied()
    }

    pub fn slope_change_at(&self, t: u64) -> i128 {
        self.timeline.slope_changes().at(t)
    }

    /// Sum of all locked amounts.
    pub fn supply(&self) -> u128 {
        self.supply
    }
}

impl<C: Custody> std::fmt::Debug for VotingEscrow<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VotingEscrow")
            .field("accounts", &self.accounts.len())
            .field("epoch", &self.timeline.epoch())
            .field("supply", &self.supply)
            .finish()
    }
}

fn rejected<T>(operation: &'static str, result: Result<T, LockError>) -> Result<T, LockError> {
    result.inspect_err(|e| {
        log_events::operation_rejected(operation, e.error_code(), &e.to_string());
    })
}
