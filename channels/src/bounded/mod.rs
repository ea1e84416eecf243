// src/bounded/mod.rs

//! A capacity-bounded, multi-producer multi-consumer exchange queue.
//!
//! The capacity is fixed when the channel is created and never changes. A
//! sender blocks (or its future stays pending) while every slot is taken; a
//! receiver blocks while the queue is empty. Backpressure is provided by a
//! [`CapacityGate`](crate::coord::CapacityGate), so blocked threads and tasks
//! are served in arrival order.
//!
//! Sync and async handles share one core and can be converted into each
//! other freely: a thread can feed a task and the other way round.
//!
//! ### Closing
//!
//! - [`Sender::close_channel`] closes the channel for everyone. Further sends
//!   fail with [`SendError::Closed`], blocked senders are released with the
//!   same error, and receivers drain what is buffered before they see
//!   [`RecvError::Disconnected`].
//! - Dropping (or [`close`](Sender::close)-ing) the last sender has the same
//!   effect on receivers.
//! - Dropping the last receiver fails every pending and future send and drops
//!   the buffered items.
//!
//! ### Ranging
//!
//! A `&Receiver` is iterable and yields items until the channel is closed and
//! drained. An [`AsyncReceiver`] is a `futures_core::Stream` with the same
//! termination rule.

use crate::error::{CloseError, RecvError, RecvErrorTimeout, SendError, TryRecvError, TrySendError};

pub use async_impl::{select2, RecvFuture, Select2, Selected, SendFuture};

mod async_impl;
mod core;
mod sync_impl;

use self::core::BoundedShared;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// --- Public Structs (Sync) ---

/// A synchronous sending handle. Clone it to add producers.
#[derive(Debug)]
pub struct Sender<T: Send> {
  shared: Arc<BoundedShared<T>>,
  closed: AtomicBool,
}

/// A synchronous receiving handle. Clone it to add consumers.
#[derive(Debug)]
pub struct Receiver<T: Send> {
  shared: Arc<BoundedShared<T>>,
  closed: AtomicBool,
}

// --- Public Structs (Async) ---

/// An asynchronous sending handle. Clone it to add producers.
#[derive(Debug)]
pub struct AsyncSender<T: Send> {
  shared: Arc<BoundedShared<T>>,
  closed: AtomicBool,
}

/// An asynchronous receiving handle. Clone it to add consumers.
#[derive(Debug)]
pub struct AsyncReceiver<T: Send> {
  shared: Arc<BoundedShared<T>>,
  closed: AtomicBool,
}

// --- Channel Constructors ---

/// Creates a synchronous bounded channel holding at most `capacity` items.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn bounded<T: Send>(capacity: usize) -> (Sender<T>, Receiver<T>) {
  let shared = new_shared(capacity);
  (
    Sender {
      shared: Arc::clone(&shared),
      closed: AtomicBool::new(false),
    },
    Receiver {
      shared,
      closed: AtomicBool::new(false),
    },
  )
}

/// Creates an asynchronous bounded channel holding at most `capacity` items.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn bounded_async<T: Send>(capacity: usize) -> (AsyncSender<T>, AsyncReceiver<T>) {
  let shared = new_shared(capacity);
  (
    AsyncSender {
      shared: Arc::clone(&shared),
      closed: AtomicBool::new(false),
    },
    AsyncReceiver {
      shared,
      closed: AtomicBool::new(false),
    },
  )
}

fn new_shared<T: Send>(capacity: usize) -> Arc<BoundedShared<T>> {
  assert!(capacity > 0, "bounded channel capacity must be non-zero");
  Arc::new(BoundedShared::new(capacity))
}

// Claims this handle's share of the channel exactly once. Returns `false` if
// the handle was already closed.
fn claim(flag: &AtomicBool) -> bool {
  flag
    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
    .is_ok()
}

// --- Trait Implementations for Public Structs ---

impl<T: Send> Clone for Sender<T> {
  fn clone(&self) -> Self {
    self.shared.add_sender();
    Sender {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(false),
    }
  }
}
impl<T: Send> Clone for Receiver<T> {
  fn clone(&self) -> Self {
    self.shared.add_receiver();
    Receiver {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(false),
    }
  }
}
impl<T: Send> Clone for AsyncSender<T> {
  fn clone(&self) -> Self {
    self.shared.add_sender();
    AsyncSender {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(false),
    }
  }
}
impl<T: Send> Clone for AsyncReceiver<T> {
  fn clone(&self) -> Self {
    self.shared.add_receiver();
    AsyncReceiver {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(false),
    }
  }
}

// --- Public API Method Implementations (Sync) ---

impl<T: Send> Sender<T> {
  /// Sends a value, blocking the current thread while the channel is full.
  pub fn send(&self, item: T) -> Result<(), SendError> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(SendError::Closed);
    }
    sync_impl::send_sync(self, item)
  }

  /// Attempts to send a value without blocking.
  pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
    if self.closed.load(Ordering::Relaxed) || self.shared.is_send_closed() {
      return Err(TrySendError::Closed(item));
    }
    if !self.shared.gate.try_acquire() {
      return if self.shared.gate.is_closed() {
        Err(TrySendError::Closed(item))
      } else {
        Err(TrySendError::Full(item))
      };
    }
    self.shared.push_with_permit(item).map_err(TrySendError::Closed)
  }

  /// Closes this handle. If it is the last sender, receivers are
  /// disconnected once they drain the buffer.
  ///
  /// # Errors
  ///
  /// Returns `Err(CloseError)` if this handle has already been closed.
  pub fn close(&self) -> Result<(), CloseError> {
    if claim(&self.closed) {
      self.shared.release_sender();
      Ok(())
    } else {
      Err(CloseError)
    }
  }

  /// Closes the whole channel, for every sender.
  ///
  /// Blocked senders return [`SendError::Closed`]; receivers keep draining
  /// buffered items and are then disconnected.
  ///
  /// # Errors
  ///
  /// Returns `Err(CloseError)` if the channel is already closed.
  pub fn close_channel(&self) -> Result<(), CloseError> {
    close_channel(&self.shared)
  }

  /// Returns `true` if no further value can be sent.
  pub fn is_closed(&self) -> bool {
    self.shared.is_send_closed()
  }

  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.len() == self.shared.capacity
  }

  pub fn sender_count(&self) -> usize {
    self.shared.sender_count()
  }

  /// Converts this handle into an `AsyncSender` without changing the
  /// channel's sender count.
  pub fn to_async(self) -> AsyncSender<T> {
    let was_closed = self.closed.swap(true, Ordering::AcqRel);
    AsyncSender {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(was_closed),
    }
  }
}

impl<T: Send> Drop for Sender<T> {
  fn drop(&mut self) {
    let _ = self.close();
  }
}

impl<T: Send> Receiver<T> {
  /// Receives a value, blocking the current thread while the channel is empty.
  pub fn recv(&self) -> Result<T, RecvError> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(RecvError::Disconnected);
    }
    sync_impl::recv_sync(self)
  }

  /// Attempts to receive a value without blocking.
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(TryRecvError::Disconnected);
    }
    self.shared.try_recv_core()
  }

  /// Receives a value, blocking for at most `timeout`.
  ///
  /// # Errors
  ///
  /// - `Err(RecvErrorTimeout::Timeout)` if the timeout is reached.
  /// - `Err(RecvErrorTimeout::Disconnected)` if the channel is closed and empty.
  pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvErrorTimeout> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(RecvErrorTimeout::Disconnected);
    }
    sync_impl::recv_timeout_sync(self, timeout)
  }

  /// Returns a blocking iterator that ends once the channel is closed and
  /// drained.
  pub fn iter(&self) -> Iter<'_, T> {
    Iter { receiver: self }
  }

  /// Returns an iterator over the items available right now.
  pub fn try_iter(&self) -> TryIter<'_, T> {
    TryIter { receiver: self }
  }

  /// Closes this handle. If it is the last receiver, pending and future
  /// sends fail and buffered items are dropped.
  ///
  /// # Errors
  ///
  /// Returns `Err(CloseError)` if this handle has already been closed.
  pub fn close(&self) -> Result<(), CloseError> {
    if claim(&self.closed) {
      self.shared.release_receiver();
      Ok(())
    } else {
      Err(CloseError)
    }
  }

  /// Returns `true` if the channel is closed and nothing is left to receive.
  pub fn is_closed(&self) -> bool {
    self.shared.is_drained()
  }

  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.len() == self.shared.capacity
  }

  pub fn receiver_count(&self) -> usize {
    self.shared.receiver_count()
  }

  /// Converts this handle into an `AsyncReceiver` without changing the
  /// channel's receiver count.
  pub fn to_async(self) -> AsyncReceiver<T> {
    let was_closed = self.closed.swap(true, Ordering::AcqRel);
    AsyncReceiver {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(was_closed),
    }
  }
}

impl<T: Send> Drop for Receiver<T> {
  fn drop(&mut self) {
    let _ = self.close();
  }
}

/// Blocking iterator returned by [`Receiver::iter`].
#[derive(Debug)]
pub struct Iter<'a, T: Send> {
  receiver: &'a Receiver<T>,
}

impl<T: Send> Iterator for Iter<'_, T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.receiver.recv().ok()
  }
}

/// Non-blocking iterator returned by [`Receiver::try_iter`].
#[derive(Debug)]
pub struct TryIter<'a, T: Send> {
  receiver: &'a Receiver<T>,
}

impl<T: Send> Iterator for TryIter<'_, T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.receiver.try_recv().ok()
  }
}

/// Owning blocking iterator returned by `Receiver::into_iter`.
#[derive(Debug)]
pub struct IntoIter<T: Send> {
  receiver: Receiver<T>,
}

impl<T: Send> Iterator for IntoIter<T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.receiver.recv().ok()
  }
}

impl<'a, T: Send> IntoIterator for &'a Receiver<T> {
  type Item = T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<T: Send> IntoIterator for Receiver<T> {
  type Item = T;
  type IntoIter = IntoIter<T>;

  fn into_iter(self) -> Self::IntoIter {
    IntoIter { receiver: self }
  }
}

// --- Public API Method Implementations (Async) ---

impl<T: Send> AsyncSender<T> {
  /// Sends a value, waiting while the channel is full.
  pub fn send(&self, item: T) -> SendFuture<'_, T> {
    SendFuture::new(self, item)
  }

  /// Attempts to send a value without waiting.
  pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
    if self.is_handle_closed() || self.shared.is_send_closed() {
      return Err(TrySendError::Closed(item));
    }
    if !self.shared.gate.try_acquire() {
      return if self.shared.gate.is_closed() {
        Err(TrySendError::Closed(item))
      } else {
        Err(TrySendError::Full(item))
      };
    }
    self.shared.push_with_permit(item).map_err(TrySendError::Closed)
  }

  /// Closes this handle. See [`Sender::close`].
  pub fn close(&self) -> Result<(), CloseError> {
    if claim(&self.closed) {
      self.shared.release_sender();
      Ok(())
    } else {
      Err(CloseError)
    }
  }

  /// Closes the whole channel. See [`Sender::close_channel`].
  pub fn close_channel(&self) -> Result<(), CloseError> {
    close_channel(&self.shared)
  }

  pub fn is_closed(&self) -> bool {
    self.shared.is_send_closed()
  }

  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.len() == self.shared.capacity
  }

  pub fn sender_count(&self) -> usize {
    self.shared.sender_count()
  }

  /// Converts this handle into a synchronous `Sender`.
  pub fn to_sync(self) -> Sender<T> {
    let was_closed = self.closed.swap(true, Ordering::AcqRel);
    Sender {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(was_closed),
    }
  }

  pub(crate) fn is_handle_closed(&self) -> bool {
    self.closed.load(Ordering::Relaxed)
  }
}

impl<T: Send> Drop for AsyncSender<T> {
  fn drop(&mut self) {
    let _ = self.close();
  }
}

impl<T: Send> AsyncReceiver<T> {
  /// Receives the next value, waiting while the channel is empty.
  pub fn recv(&self) -> RecvFuture<'_, T> {
    RecvFuture::new(self)
  }

  /// Attempts to receive a value without waiting.
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    if self.is_handle_closed() {
      return Err(TryRecvError::Disconnected);
    }
    self.shared.try_recv_core()
  }

  /// Closes this handle. See [`Receiver::close`].
  pub fn close(&self) -> Result<(), CloseError> {
    if claim(&self.closed) {
      self.shared.release_receiver();
      Ok(())
    } else {
      Err(CloseError)
    }
  }

  pub fn is_closed(&self) -> bool {
    self.shared.is_drained()
  }

  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.len() == self.shared.capacity
  }

  pub fn receiver_count(&self) -> usize {
    self.shared.receiver_count()
  }

  /// Converts this handle into a synchronous `Receiver`.
  pub fn to_sync(self) -> Receiver<T> {
    let was_closed = self.closed.swap(true, Ordering::AcqRel);
    Receiver {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(was_closed),
    }
  }

  pub(crate) fn is_handle_closed(&self) -> bool {
    self.closed.load(Ordering::Relaxed)
  }
}

impl<T: Send> Drop for AsyncReceiver<T> {
  fn drop(&mut self) {
    let _ = self.close();
  }
}

fn close_channel<T: Send>(shared: &BoundedShared<T>) -> Result<(), CloseError> {
  if !shared.close_for_senders() {
    return Err(CloseError);
  }
  // Release senders parked on a full channel.
  shared.gate.close();
  Ok(())
}
