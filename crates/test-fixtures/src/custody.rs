//! In-memory custody for tests.

use std::collections::HashMap;

use veweight_core::errors::CustodyError;
use veweight_core::AccountId;
use veweight_ledger::Custody;

/// Tracks free balances per account and the total held by the ledger.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustody {
    balances: HashMap<AccountId, u128>,
    held: u128,
    reject: Option<String>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: start `account` with `amount` of free balance.
    pub fn with_balance(mut self, account: &str, amount: u128) -> Self {
        self.fund(&AccountId::from(account), amount);
        self
    }

    pub fn fund(&mut self, account: &AccountId, amount: u128) {
        *self.balances.entry(account.clone()).or_default() += amount;
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Total currently held on behalf of the ledger.
    pub fn held(&self) -> u128 {
        self.held
    }

    /// Make every subsequent transfer fail with `reason`.
    pub fn reject_all(&mut self, reason: &str) {
        self.reject = Some(reason.to_string());
    }

    pub fn accept_all(&mut self) {
        self.reject = None;
    }

    fn check_rejected(&self, account: &AccountId) -> Result<(), CustodyError> {
        match &self.reject {
            Some(reason) => Err(CustodyError::Rejected {
                account: account.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Custody for InMemoryCustody {
    fn transfer_in(&mut self, from: &AccountId, amount: u128) -> Result<(), CustodyError> {
        self.check_rejected(from)?;
        let available = self.balance_of(from);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                account: from.to_string(),
                needed: amount,
                available,
            });
        }
        self.balances.insert(from.clone(), available - amount);
        self.held += amount;
        Ok(())
    }

    fn transfer_out(&mut self, to: &AccountId, amount: u128) -> Result<(), CustodyError> {
        self.check_rejected(to)?;
        if self.held < amount {
            return Err(CustodyError::InsufficientBalance {
                account: to.to_string(),
                needed: amount,
                available: self.held,
            });
        }
        self.held -= amount;
        self.fund(to, amount);
        Ok(())
    }
}
