//! Event payload types consumed by off-ledger observers and indexers.

use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, CategoryId, TargetId};

/// Which operation produced a [`DepositEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositKind {
    DepositFor,
    CreateLock,
    IncreaseAmount,
    IncreaseUnlockTime,
}

/// Payload for `on_deposit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub account: AccountId,
    pub amount: u128,
    pub unlock_time: u64,
    pub kind: DepositKind,
    pub timestamp: u64,
}

/// Payload for `on_withdraw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEvent {
    pub account: AccountId,
    pub amount: u128,
    pub timestamp: u64,
}

/// Payload for `on_supply`: total locked amount before and after a deposit
/// or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyEvent {
    pub previous: u128,
    pub current: u128,
}

/// Payload for `on_new_category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategoryEvent {
    pub name: String,
    pub category: CategoryId,
}

/// Payload for `on_new_gauge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGaugeEvent {
    pub target: TargetId,
    pub category: CategoryId,
}

/// Payload for `on_new_gauge_weight`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGaugeWeightEvent {
    pub target: TargetId,
    pub timestamp: u64,
    pub weight: u128,
    pub total_weight: u128,
}

/// Payload for `on_vote_for_gauge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteForGaugeEvent {
    pub account: AccountId,
    pub target: TargetId,
    pub weight_bps: u16,
    pub timestamp: u64,
}
