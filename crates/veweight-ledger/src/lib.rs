//! # veweight-ledger
//!
//! Lock ledger for the veweight system.
//!
//! Each account holds at most one [`Lock`]. Its voting power is a linearly
//! decaying function of time, recorded as a point history per account, and
//! the sum of all accounts' functions is kept as a global checkpoint timeline
//! rolled forward period by period.

pub mod account;
pub mod custody;
pub mod escrow;
pub mod lock;
pub mod query;
pub mod timeline;

pub use account::AccountRecord;
pub use custody::Custody;
pub use escrow::VotingEscrow;
pub use lock::Lock;
pub use timeline::{CheckpointPlan, GlobalTimeline};
