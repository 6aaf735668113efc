//! EscrowEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for observing ledger and aggregator events.
///
/// All methods have no-op default implementations, so handlers only need
/// to override the events they care about. Handlers are invoked after the
/// operation has committed.
pub trait EscrowEventHandler: Send + Sync {
    // ---- Lock ledger ----
    fn on_deposit(&self, _event: &DepositEvent) {}
    fn on_withdraw(&self, _event: &WithdrawEvent) {}
    fn on_supply(&self, _event: &SupplyEvent) {}

    // ---- Weight aggregator ----
    fn on_new_category(&self, _event: &NewCategoryEvent) {}
    fn on_new_gauge(&self, _event: &NewGaugeEvent) {}
    fn on_new_gauge_weight(&self, _event: &NewGaugeWeightEvent) {}
    fn on_vote_for_gauge(&self, _event: &VoteForGaugeEvent) {}
}
