//! A hash map that is safe to share between concurrently running units.
//!
//! Access goes through a `parking_lot::RwLock`: any number of readers, or a
//! single writer. Clones share the same map.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

pub struct GuardedMap<K, V> {
  inner: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for GuardedMap<K, V> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<K, V> Default for GuardedMap<K, V> {
  fn default() -> Self {
    Self {
      inner: Arc::new(RwLock::new(HashMap::new())),
    }
  }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for GuardedMap<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(self.inner.read().iter()).finish()
  }
}

impl<K, V> From<HashMap<K, V>> for GuardedMap<K, V> {
  fn from(map: HashMap<K, V>) -> Self {
    Self {
      inner: Arc::new(RwLock::new(map)),
    }
  }
}

impl<K: Eq + Hash, V> GuardedMap<K, V> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    HashMap::with_capacity(capacity).into()
  }

  /// Inserts under the write lock, returning the previous value.
  pub fn insert(&self, key: K, value: V) -> Option<V> {
    self.inner.write().insert(key, value)
  }

  pub fn remove<Q>(&self, key: &Q) -> Option<V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.inner.write().remove(key)
  }

  pub fn contains_key<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.inner.read().contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.inner.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.read().is_empty()
  }

  /// Runs `f` under the shared read lock.
  pub fn read<R>(&self, f: impl FnOnce(&HashMap<K, V>) -> R) -> R {
    f(&self.inner.read())
  }

  /// Runs `f` under the exclusive write lock.
  pub fn write<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
    f(&mut self.inner.write())
  }

  /// Applies `f` to the value under `key`, if present, in one write-locked
  /// step. Returns whether the key was found.
  pub fn update<Q>(&self, key: &Q, f: impl FnOnce(&mut V)) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    match self.inner.write().get_mut(key) {
      Some(value) => {
        f(value);
        true
      }
      None => false,
    }
  }

  /// Consumes the handle and returns the map if no other clone is alive,
  /// otherwise hands the handle back.
  pub fn into_inner(self) -> Result<HashMap<K, V>, Self> {
    Arc::try_unwrap(self.inner)
      .map(RwLock::into_inner)
      .map_err(|inner| Self { inner })
  }
}

impl<K: Eq + Hash, V: Clone> GuardedMap<K, V> {
  /// Returns a copy of the value under `key`.
  pub fn get<Q>(&self, key: &Q) -> Option<V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.inner.read().get(key).cloned()
  }

  /// Returns the value under `key`, inserting `f()` first if it is missing.
  pub fn entry_or_insert_with(&self, key: K, f: impl FnOnce() -> V) -> V {
    self.inner.write().entry(key).or_insert_with(f).clone()
  }
}

impl<K: Eq + Hash + Clone, V: Clone> GuardedMap<K, V> {
  /// Copies the current contents out under a single read lock.
  pub fn snapshot(&self) -> HashMap<K, V> {
    self.inner.read().clone()
  }
}
