//! Comparing errors by value versus by identity.
//!
//! [`UserError`] compares structurally: two errors carrying the same name are
//! equal. Wrapping errors in [`Identity`] switches `==` to reference identity,
//! so only handles cloned from the same allocation compare equal, whatever
//! their contents.

use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{name} had an error")]
pub struct UserError {
  pub name: String,
}

impl UserError {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}

/// A shared error handle whose `PartialEq` is pointer identity.
pub struct Identity<E> {
  inner: Arc<E>,
}

impl<E> Identity<E> {
  pub fn new(error: E) -> Self {
    Self {
      inner: Arc::new(error),
    }
  }

  /// Structural comparison of the wrapped values.
  pub fn eq_by_value(&self, other: &Self) -> bool
  where
    E: PartialEq,
  {
    *self.inner == *other.inner
  }
}

impl<E> Clone for Identity<E> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<E> PartialEq for Identity<E> {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl<E> Eq for Identity<E> {}

impl<E> Deref for Identity<E> {
  type Target = E;

  fn deref(&self) -> &E {
    &self.inner
  }
}

impl<E: fmt::Debug> fmt::Debug for Identity<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Identity").field(&self.inner).finish()
  }
}

impl<E: fmt::Display> fmt::Display for Identity<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.inner, f)
  }
}

impl<E: StdError> StdError for Identity<E> {
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    self.inner.source()
  }
}
