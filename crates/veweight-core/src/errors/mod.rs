//! Error handling for veweight.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod custody_error;
pub mod error_code;
pub mod escrow_error;
pub mod gauge_error;
pub mod lock_error;
pub mod replay_error;

pub use config_error::ConfigError;
pub use custody_error::CustodyError;
pub use error_code::ErrorCode;
pub use escrow_error::EscrowError;
pub use gauge_error::GaugeError;
pub use lock_error::LockError;
pub use replay_error::ReplayError;
