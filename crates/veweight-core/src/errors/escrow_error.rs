//! Top-level error aggregating every subsystem via `From` conversions.

use super::{ConfigError, CustodyError, ErrorCode, GaugeError, LockError, ReplayError};

#[derive(Debug, thiserror::Error)]
pub enum EscrowError {
    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Gauge error: {0}")]
    Gauge(#[from] GaugeError),

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ErrorCode for EscrowError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Lock(e) => e.error_code(),
            Self::Gauge(e) => e.error_code(),
            Self::Custody(e) => e.error_code(),
            Self::Replay(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
