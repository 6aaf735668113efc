//! Synchronous event dispatch. Costs nothing when no handler is registered.

use std::sync::Arc;

use super::handler::EscrowEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// When no handlers are registered, `emit` iterates over an empty Vec.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EscrowEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn EscrowEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A handler that panics is logged and skipped; the remaining handlers
    /// still receive the event.
    fn emit<F: Fn(&dyn EscrowEventHandler)>(&self, name: &'static str, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!(event = name, "event handler panicked");
            }
        }
    }

    // ---- Lock ledger ----
    pub fn emit_deposit(&self, event: &DepositEvent) {
        self.emit("deposit", |h| h.on_deposit(event));
    }

    pub fn emit_withdraw(&self, event: &WithdrawEvent) {
        self.emit("withdraw", |h| h.on_withdraw(event));
    }

    pub fn emit_supply(&self, event: &SupplyEvent) {
        self.emit("supply", |h| h.on_supply(event));
    }

    // ---- Weight aggregator ----
    pub fn emit_new_category(&self, event: &NewCategoryEvent) {
        self.emit("new_category", |h| h.on_new_category(event));
    }

    pub fn emit_new_gauge(&self, event: &NewGaugeEvent) {
        self.emit("new_gauge", |h| h.on_new_gauge(event));
    }

    pub fn emit_new_gauge_weight(&self, event: &NewGaugeWeightEvent) {
        self.emit("new_gauge_weight", |h| h.on_new_gauge_weight(event));
    }

    pub fn emit_vote_for_gauge(&self, event: &VoteForGaugeEvent) {
        self.emit("vote_for_gauge", |h| h.on_vote_for_gauge(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
