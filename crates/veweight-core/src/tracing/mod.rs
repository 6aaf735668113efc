//! Observability for veweight.
//! `tracing` crate with `EnvFilter`, structured operation events.

pub mod events;
pub mod setup;

pub use setup::{init_tracing, init_tracing_with_filter};
