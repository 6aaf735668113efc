//! Where vote weights come from.

use veweight_core::AccountId;
use veweight_ledger::{Custody, VotingEscrow};

/// Read access to the lock ledger that voting needs: the decay rate of an
/// account's current lock and when that lock ends.
pub trait VotingPowerSource {
    fn last_user_slope(&self, account: &AccountId) -> i128;
    fn locked_end(&self, account: &AccountId) -> u64;
}

impl<C: Custody> VotingPowerSource for VotingEscrow<C> {
    fn last_user_slope(&self, account: &AccountId) -> i128 {
        VotingEscrow::last_user_slope(self, account)
    }

    fn locked_end(&self, account: &AccountId) -> u64 {
        VotingEscrow::locked_end(self, account)
    }
}
