//! Virtual coin wallet shared by every mini-game in a session.
//!
//! The balance is an unsigned integer and every debit is checked against it
//! inside the same call, so a negative balance cannot be represented.
//! Stakes placed through [`Wallet::stake`] also reserve their best-case
//! credit, so settling an open round can never overflow the balance.

use crate::errors::WalletError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Process-local, single-player coin ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    balance: u64,
    starting_balance: u64,
    total_debited: u64,
    total_credited: u64,
    /// Largest credit still owed to open bets
    reserved: u64,
}

impl Wallet {
    pub fn new(starting_balance: u64) -> Self {
        Self {
            balance: starting_balance,
            starting_balance,
            total_debited: 0,
            total_credited: 0,
            reserved: 0,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn starting_balance(&self) -> u64 {
        self.starting_balance
    }

    /// Lifetime sum of successful debits
    pub fn total_debited(&self) -> u64 {
        self.total_debited
    }

    /// Lifetime sum of credits
    pub fn total_credited(&self) -> u64 {
        self.total_credited
    }

    /// Credit that open bets could still win
    pub fn reserved(&self) -> u64 {
        self.reserved
    }

    /// Whether `debit(amount)` would succeed
    pub fn can_afford(&self, amount: u64) -> bool {
        amount > 0 && amount <= self.balance
    }

    /// Remove `amount` coins. All or nothing.
    pub fn debit(&mut self, amount: u64) -> Result<(), WalletError> {
        if amount == 0 {
            return Err(WalletError::ZeroAmount);
        }
        if amount > self.balance {
            return Err(WalletError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }

        let total_debited = self
            .total_debited
            .checked_add(amount)
            .ok_or(WalletError::CapacityExceeded { requested: amount })?;

        self.balance -= amount;
        self.total_debited = total_debited;
        debug!("Wallet debit {} -> balance {}", amount, self.balance);
        Ok(())
    }

    /// Take a stake of `amount` that can win back at most `max_credit`.
    /// Refused when that credit would not fit next to the balance and every
    /// other open reservation.
    pub fn stake(&mut self, amount: u64, max_credit: u64) -> Result<(), WalletError> {
        if amount == 0 {
            return Err(WalletError::ZeroAmount);
        }
        if amount > self.balance {
            return Err(WalletError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        let reserved = self
            .reserved
            .checked_add(max_credit)
            .filter(|r| (self.balance - amount).checked_add(*r).is_some())
            .ok_or(WalletError::CapacityExceeded {
                requested: max_credit,
            })?;

        self.debit(amount)?;
        self.reserved = reserved;
        Ok(())
    }

    /// Add `amount` coins. Zero is accepted and changes nothing; a credit
    /// that does not fit is refused and nothing changes.
    pub fn credit(&mut self, amount: u64) -> Result<(), WalletError> {
        let (balance, total_credited) = self
            .balance
            .checked_add(amount)
            .zip(self.total_credited.checked_add(amount))
            .ok_or(WalletError::CapacityExceeded { requested: amount })?;

        self.balance = balance;
        self.total_credited = total_credited;
        if amount > 0 {
            debug!("Wallet credit {} -> balance {}", amount, self.balance);
        }
        Ok(())
    }

    /// Pay `amount` to a settled round and drop the `released` reservation
    /// its stakes held
    pub fn settle(&mut self, amount: u64, released: u64) -> Result<(), WalletError> {
        let reserved = self.reserved.saturating_sub(released);
        self.credit(amount)?;
        self.reserved = reserved;
        Ok(())
    }

    /// Checks `balance == starting - debited + credited`
    pub fn is_conserved(&self) -> bool {
        self.starting_balance
            .checked_add(self.total_credited)
            .and_then(|v| v.checked_sub(self.total_debited))
            == Some(self.balance)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(100)
    }
}
