//! # veweight-core
//!
//! Foundation crate for the veweight vote-escrow system.
//! Defines decay point math, the slope-change schedule, the bounded replay
//! cursor, identifiers, config, errors, events, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod ids;
pub mod period;
pub mod point;
pub mod replay;
pub mod schedule;
pub mod tracing;

// Re-export the most commonly used types at the crate root.
pub use clock::BlockContext;
pub use config::EscrowConfig;
pub use errors::{EscrowError, ErrorCode};
pub use ids::{AccountId, CategoryId, TargetId};
pub use point::Point;
pub use replay::{CatchUp, ExhaustionRule, ReplayCursor, ReplayStep};
pub use schedule::SlopeSchedule;
