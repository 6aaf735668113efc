//! The asset custody seam.
//!
//! The ledger never moves assets itself. It asks a [`Custody`] implementation
//! to pull deposits in and release withdrawals, and aborts the whole
//! operation when the transfer fails.

use veweight_core::errors::CustodyError;
use veweight_core::AccountId;

pub trait Custody {
    /// Pull `amount` from `from` into the ledger's custody.
    fn transfer_in(&mut self, from: &AccountId, amount: u128) -> Result<(), CustodyError>;

    /// Release `amount` from custody to `to`.
    fn transfer_out(&mut self, to: &AccountId, amount: u128) -> Result<(), CustodyError>;
}

impl<T: Custody + ?Sized> Custody for &mut T {
    fn transfer_in(&mut self, from: &AccountId, amount: u128) -> Result<(), CustodyError> {
        (**self).transfer_in(from, amount)
    }

    fn transfer_out(&mut self, to: &AccountId, amount: u128) -> Result<(), CustodyError> {
        (**self).transfer_out(to, amount)
    }
}
