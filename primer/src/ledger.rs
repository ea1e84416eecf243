// src/ledger.rs

//! A wallet holding a whole number of bitcoin.
//!
//! Withdrawals are checked: asking for more than the balance fails with
//! [`LedgerError::InsufficientFunds`] and leaves the wallet untouched.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

/// An amount of bitcoin. Prints as `"{n} BTC"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bitcoin(pub u64);

impl fmt::Display for Bitcoin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} BTC", self.0)
  }
}

impl From<u64> for Bitcoin {
  fn from(amount: u64) -> Self {
    Bitcoin(amount)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
  #[error("cannot withdraw {requested}, insufficient funds (balance is {available})")]
  InsufficientFunds { requested: Bitcoin, available: Bitcoin },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallet {
  balance: Bitcoin,
}

impl Wallet {
  pub fn new(balance: Bitcoin) -> Self {
    Self { balance }
  }

  pub fn balance(&self) -> Bitcoin {
    self.balance
  }

  /// Adds `amount` to the balance.
  ///
  /// # Panics
  ///
  /// Panics if the balance would overflow `u64`.
  pub fn deposit(&mut self, amount: Bitcoin) {
    match self.balance.0.checked_add(amount.0) {
      Some(total) => self.balance = Bitcoin(total),
      None => panic!("wallet balance overflow: {} + {}", self.balance, amount),
    }
  }

  pub fn withdraw(&mut self, amount: Bitcoin) -> Result<(), LedgerError> {
    if amount > self.balance {
      return Err(LedgerError::InsufficientFunds {
        requested: amount,
        available: self.balance,
      });
    }
    self.balance = Bitcoin(self.balance.0 - amount.0);
    Ok(())
  }
}

/// A wallet shared between threads. Clones refer to the same wallet, and each
/// operation holds the lock for its whole read-modify-write.
#[derive(Debug, Clone, Default)]
pub struct SharedWallet {
  inner: Arc<Mutex<Wallet>>,
}

impl SharedWallet {
  pub fn new(balance: Bitcoin) -> Self {
    Wallet::new(balance).into()
  }

  pub fn balance(&self) -> Bitcoin {
    self.inner.lock().balance()
  }

  pub fn deposit(&self, amount: Bitcoin) {
    self.inner.lock().deposit(amount);
  }

  pub fn withdraw(&self, amount: Bitcoin) -> Result<(), LedgerError> {
    self.inner.lock().withdraw(amount)
  }

  /// Copies the wallet out as it is right now.
  pub fn snapshot(&self) -> Wallet {
    self.inner.lock().clone()
  }
}

impl From<Wallet> for SharedWallet {
  fn from(wallet: Wallet) -> Self {
    Self {
      inner: Arc::new(Mutex::new(wallet)),
    }
  }
}
