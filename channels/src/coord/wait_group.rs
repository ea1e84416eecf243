//! A completion counter that threads and tasks can both wait on.
//!
//! Units of work are registered with [`WaitGroup::add`] (or one at a time with
//! [`WaitGroup::guard`]) and each signals completion exactly once. Waiters are
//! released when the count returns to zero.
//!
//! Decrementing a counter that is already zero is a contract violation and
//! panics instead of being ignored.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct CounterState {
  pending: usize,
  wakers: Vec<Waker>,
}

#[derive(Debug, Default)]
struct WaitGroupInner {
  state: Mutex<CounterState>,
  drained: Condvar,
}

/// A clonable handle to a shared completion counter.
#[derive(Clone, Default)]
pub struct WaitGroup {
  inner: Arc<WaitGroupInner>,
}

impl fmt::Debug for WaitGroup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WaitGroup")
      .field("pending", &self.count())
      .finish()
  }
}

impl WaitGroup {
  /// Creates a wait group with nothing pending.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `units` more pieces of expected work.
  ///
  /// # Panics
  ///
  /// Panics if the pending count would overflow `usize`.
  pub fn add(&self, units: usize) {
    let mut state = self.inner.state.lock();
    state.pending = match state.pending.checked_add(units) {
      Some(pending) => pending,
      None => panic!("WaitGroup counter overflow"),
    };
  }

  /// Signals that one unit of work has finished.
  ///
  /// # Panics
  ///
  /// Panics if the counter is already zero.
  pub fn done(&self) {
    let wakers = {
      let mut state = self.inner.state.lock();
      if state.pending == 0 {
        drop(state);
        panic!("WaitGroup::done called with no pending units");
      }
      state.pending -= 1;
      if state.pending > 0 {
        return;
      }
      self.inner.drained.notify_all();
      std::mem::take(&mut state.wakers)
    };
    for waker in wakers {
      waker.wake();
    }
  }

  /// Registers one unit and returns a guard that signals its completion when
  /// dropped, including when the owning thread unwinds.
  pub fn guard(&self) -> DoneGuard {
    self.add(1);
    DoneGuard {
      group: self.clone(),
    }
  }

  /// Returns the number of units still pending.
  pub fn count(&self) -> usize {
    self.inner.state.lock().pending
  }

  /// Blocks the current thread until the counter reaches zero.
  pub fn wait(&self) {
    let mut state = self.inner.state.lock();
    while state.pending > 0 {
      self.inner.drained.wait(&mut state);
    }
  }

  /// Blocks for at most `timeout`. Returns `true` if the counter reached zero.
  pub fn wait_timeout(&self, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    let mut state = self.inner.state.lock();
    while state.pending > 0 {
      if self
        .inner
        .drained
        .wait_until(&mut state, deadline)
        .timed_out()
      {
        return state.pending == 0;
      }
    }
    true
  }

  /// Returns a future that resolves once the counter reaches zero.
  pub fn wait_async(&self) -> WaitFuture {
    WaitFuture {
      inner: Arc::clone(&self.inner),
    }
  }
}

/// Signals one completion to its [`WaitGroup`] when dropped.
#[must_use = "dropping the guard immediately signals completion"]
pub struct DoneGuard {
  group: WaitGroup,
}

impl fmt::Debug for DoneGuard {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DoneGuard").finish_non_exhaustive()
  }
}

impl Drop for DoneGuard {
  fn drop(&mut self) {
    self.group.done();
  }
}

/// Future returned by [`WaitGroup::wait_async`].
#[must_use = "futures do nothing unless you .await or poll them"]
#[derive(Debug)]
pub struct WaitFuture {
  inner: Arc<WaitGroupInner>,
}

impl Future for WaitFuture {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut state = self.inner.state.lock();
    if state.pending == 0 {
      return Poll::Ready(());
    }
    if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
      state.wakers.push(cx.waker().clone());
    }
    Poll::Pending
  }
}
