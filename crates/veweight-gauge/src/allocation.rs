//! Vote allocation tracking.
//!
//! Each account has a budget of 10000 basis points of its voting power to
//! spread across targets. A vote on a target replaces the previous one on
//! that target, and is only accepted once the cooldown since the previous
//! vote on the same target has elapsed. A zero-weight vote clears the
//! allocation but still restarts the cooldown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use veweight_core::constants::MAX_BPS;
use veweight_core::errors::GaugeError;
use veweight_core::{AccountId, TargetId};

/// The decay function an account currently contributes to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VotedSlope {
    pub slope: i128,
    /// Share of the account's power, in basis points.
    pub power: u16,
    pub end: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteRecord {
    pub slope: VotedSlope,
    /// Timestamp of the last vote, the cooldown anchor.
    pub last_vote: u64,
}

/// Where an (account, target) pair stands at some time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteState {
    /// Never voted.
    Unset,
    /// Voted recently; no new vote before `until`.
    CoolingDown { until: u64 },
    /// Contributing a non-zero share.
    Active,
    /// Last vote had zero weight.
    Cleared,
}

/// Everything tracked for one voting account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub used_power: u16,
    pub votes: BTreeMap<TargetId, VoteRecord>,
}

impl VoterRecord {
    pub fn vote(&self, target: &TargetId) -> Option<&VoteRecord> {
        self.votes.get(target)
    }

    /// Current slope on `target`, zero when never voted.
    pub fn voted_slope(&self, target: &TargetId) -> VotedSlope {
        self.vote(target).map(|v| v.slope).unwrap_or_default()
    }

    pub fn last_vote(&self, target: &TargetId) -> u64 {
        self.vote(target).map_or(0, |v| v.last_vote)
    }

    /// Fails when the last vote on `target` is less than `cooldown` ago.
    pub fn check_cooldown(&self, target: &TargetId, now: u64, cooldown: u64) -> Result<(), GaugeError> {
        let Some(record) = self.vote(target) else {
            return Ok(());
        };
        let next_allowed = record.last_vote.saturating_add(cooldown);
        if now < next_allowed {
            return Err(GaugeError::VoteCooldown {
                target: target.to_string(),
                next_allowed,
                now,
            });
        }
        Ok(())
    }

    /// Budget after swapping `old_power` for `new_power`. Pure: the record
    /// is not changed.
    pub fn reallocate(
        &self,
        account: &AccountId,
        old_power: u16,
        new_power: u16,
    ) -> Result<u16, GaugeError> {
        let requested =
            u32::from(self.used_power) - u32::from(old_power.min(self.used_power)) + u32::from(new_power);
        if requested > u32::from(MAX_BPS) {
            return Err(GaugeError::AllocationExceeded {
                account: account.to_string(),
                requested,
            });
        }
        // Bounded by MAX_BPS above.
        Ok(requested as u16)
    }

    /// Store a committed vote and the budget computed by
    /// [`VoterRecord::reallocate`].
    pub fn record_vote(&mut self, target: &TargetId, slope: VotedSlope, now: u64, used: u16) {
        self.votes.insert(
            target.clone(),
            VoteRecord {
                slope,
                last_vote: now,
            },
        );
        self.used_power = used;
    }

    pub fn state(&self, target: &TargetId, t: u64, cooldown: u64) -> VoteState {
        let Some(record) = self.vote(target) else {
            return VoteState::Unset;
        };
        let until = record.last_vote.saturating_add(cooldown);
        if t < until {
            VoteState::CoolingDown { until }
        } else if record.slope.power > 0 {
            VoteState::Active
        } else {
            VoteState::Cleared
        }
    }

    /// Sum of `power` over every target.
    pub fn allocated(&self) -> u32 {
        self.votes.values().map(|v| u32::from(v.slope.power)).sum()
    }
}
