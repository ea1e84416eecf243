// src/bounded/core.rs

//! Shared state of the bounded channel.
//!
//! Capacity is enforced by a [`CapacityGate`]: a sender holds a permit for
//! every item it has enqueued, and the receiver returns the permit after the
//! item leaves the queue. The queue itself, the handle counts and the parked
//! async receivers live behind one `parking_lot::Mutex`; blocked sync
//! receivers wait on a `Condvar` paired with it.

use crate::coord::CapacityGate;
use crate::error::TryRecvError;

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::task::Waker;

pub(crate) struct ChannelInternal<T> {
  pub(crate) queue: VecDeque<T>,
  pub(crate) sender_count: usize,
  pub(crate) receiver_count: usize,
  /// Set once no more items can ever be sent: the channel was closed
  /// explicitly or the last sender went away.
  pub(crate) closed: bool,
  pub(crate) waiting_async_receivers: VecDeque<Waker>,
}

impl<T> ChannelInternal<T> {
  /// Wakers to notify after the lock is released.
  pub(crate) fn take_receiver_wakers(&mut self) -> VecDeque<Waker> {
    std::mem::take(&mut self.waiting_async_receivers)
  }
}

pub(crate) struct BoundedShared<T> {
  pub(crate) capacity: usize,
  pub(crate) gate: CapacityGate,
  pub(crate) internal: Mutex<ChannelInternal<T>>,
  pub(crate) item_ready: Condvar,
}

impl<T> fmt::Debug for BoundedShared<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let guard = self.internal.lock();
    f.debug_struct("BoundedShared")
      .field("capacity", &self.capacity)
      .field("len", &guard.queue.len())
      .field("senders", &guard.sender_count)
      .field("receivers", &guard.receiver_count)
      .field("closed", &guard.closed)
      .finish()
  }
}

impl<T: Send> BoundedShared<T> {
  pub(crate) fn new(capacity: usize) -> Self {
    Self {
      capacity,
      gate: CapacityGate::new(capacity),
      internal: Mutex::new(ChannelInternal {
        queue: VecDeque::with_capacity(capacity.min(1024)),
        sender_count: 1,
        receiver_count: 1,
        closed: false,
        waiting_async_receivers: VecDeque::new(),
      }),
      item_ready: Condvar::new(),
    }
  }

  /// Returns `true` if no further item can be sent.
  pub(crate) fn is_send_closed(&self) -> bool {
    let guard = self.internal.lock();
    guard.closed || guard.receiver_count == 0
  }

  /// Enqueues an item for which the caller already holds a permit.
  ///
  /// On failure the permit is given back and the item returned.
  pub(crate) fn push_with_permit(&self, item: T) -> Result<(), T> {
    let wakers = {
      let mut guard = self.internal.lock();
      if guard.closed || guard.receiver_count == 0 {
        drop(guard);
        self.gate.release();
        return Err(item);
      }
      guard.queue.push_back(item);
      self.item_ready.notify_one();
      guard.take_receiver_wakers()
    };
    // Every parked async receiver re-polls; abandoned futures cannot swallow
    // the only wakeup this way.
    for waker in wakers {
      waker.wake();
    }
    Ok(())
  }

  /// Pops the next item without blocking.
  pub(crate) fn try_recv_core(&self) -> Result<T, TryRecvError> {
    let mut guard = self.internal.lock();
    match guard.queue.pop_front() {
      Some(item) => {
        drop(guard);
        self.gate.release();
        Ok(item)
      }
      None if guard.closed => Err(TryRecvError::Disconnected),
      None => Err(TryRecvError::Empty),
    }
  }

  /// Marks the channel closed to further sends and wakes every receiver.
  /// Returns `false` if it was already closed.
  pub(crate) fn close_for_senders(&self) -> bool {
    let wakers = {
      let mut guard = self.internal.lock();
      if guard.closed {
        return false;
      }
      guard.closed = true;
      self.item_ready.notify_all();
      guard.take_receiver_wakers()
    };
    for waker in wakers {
      waker.wake();
    }
    true
  }

  pub(crate) fn add_sender(&self) {
    self.internal.lock().sender_count += 1;
  }

  pub(crate) fn add_receiver(&self) {
    self.internal.lock().receiver_count += 1;
  }

  /// Drops one sender handle. The last one disconnects the receivers.
  pub(crate) fn release_sender(&self) {
    let last = {
      let mut guard = self.internal.lock();
      guard.sender_count -= 1;
      guard.sender_count == 0
    };
    if last {
      self.close_for_senders();
    }
  }

  /// Drops one receiver handle. The last one fails every pending and future
  /// send and drops whatever is still buffered.
  pub(crate) fn release_receiver(&self) {
    let drained = {
      let mut guard = self.internal.lock();
      guard.receiver_count -= 1;
      if guard.receiver_count > 0 {
        return;
      }
      std::mem::take(&mut guard.queue)
    };
    self.gate.close();
    // Buffered items are dropped outside the lock; their destructors may be
    // arbitrary user code.
    drop(drained);
  }

  pub(crate) fn len(&self) -> usize {
    self.internal.lock().queue.len()
  }

  pub(crate) fn sender_count(&self) -> usize {
    self.internal.lock().sender_count
  }

  pub(crate) fn receiver_count(&self) -> usize {
    self.internal.lock().receiver_count
  }

  /// `true` once the channel is closed and everything buffered was taken.
  pub(crate) fn is_drained(&self) -> bool {
    let guard = self.internal.lock();
    guard.closed && guard.queue.is_empty()
  }
}
