//! An event handler that records everything it receives.

use std::sync::Mutex;

use veweight_core::events::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Deposit(DepositEvent),
    Withdraw(WithdrawEvent),
    Supply(SupplyEvent),
    NewCategory(NewCategoryEvent),
    NewGauge(NewGaugeEvent),
    NewGaugeWeight(NewGaugeWeightEvent),
    VoteForGauge(VoteForGaugeEvent),
}

#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far, in order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    fn push(&self, event: RecordedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl EscrowEventHandler for RecordingHandler {
    fn on_deposit(&self, event: &DepositEvent) {
        self.push(RecordedEvent::Deposit(event.clone()));
    }

    fn on_withdraw(&self, event: &WithdrawEvent) {
        self.push(RecordedEvent::Withdraw(event.clone()));
    }

    fn on_supply(&self, event: &SupplyEvent) {
        self.push(RecordedEvent::Supply(event.clone()));
    }

    fn on_new_category(&self, event: &NewCategoryEvent) {
        self.push(RecordedEvent::NewCategory(event.clone()));
    }

    fn on_new_gauge(&self, event: &NewGaugeEvent) {
        self.push(RecordedEvent::NewGauge(event.clone()));
    }

    fn on_new_gauge_weight(&self, event: &NewGaugeWeightEvent) {
        self.push(RecordedEvent::NewGaugeWeight(event.clone()));
    }

    fn on_vote_for_gauge(&self, event: &VoteForGaugeEvent) {
        self.push(RecordedEvent::VoteForGauge(event.clone()));
    }
}
