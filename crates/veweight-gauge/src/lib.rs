//! # veweight-gauge
//!
//! Gauge weight aggregation for the veweight system.
//!
//! Accounts split their decaying voting power across voting targets
//! ("gauges") in basis points. [`GaugeController`] keeps one weight timeline
//! per target, one per category, and one overall, and turns them into
//! relative weights. [`allocation`] tracks each account's budget and
//! per-target cooldown.

pub mod allocation;
pub mod controller;
pub mod oracle;
pub mod power;
pub mod timeline;

pub use allocation::{VoteRecord, VoteState, VotedSlope, VoterRecord};
pub use controller::GaugeController;
pub use oracle::RelativeWeightSource;
pub use power::VotingPowerSource;
pub use timeline::WeightTimeline;
