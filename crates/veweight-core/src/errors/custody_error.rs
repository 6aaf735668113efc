//! Errors raised by the external asset custody collaborator.

use super::error_code::{self, ErrorCode};

/// A custody transfer failed. Any operation that requested it is aborted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("insufficient balance for {account}: needed {needed}, available {available}")]
    InsufficientBalance {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("transfer rejected for {account}: {reason}")]
    Rejected { account: String, reason: String },
}

impl ErrorCode for CustodyError {
    fn error_code(&self) -> &'static str {
        error_code::CUSTODY_ERROR
    }
}
