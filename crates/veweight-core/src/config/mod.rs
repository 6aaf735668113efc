//! Configuration system for veweight.
//! TOML-based, 3-layer resolution: env > file > defaults.

pub mod defaults;
pub mod escrow_config;
pub mod gauge_config;
pub mod ledger_config;
pub mod observability_config;

pub use escrow_config::EscrowConfig;
pub use gauge_config::GaugeConfig;
pub use ledger_config::LedgerConfig;
pub use observability_config::ObservabilityConfig;
