//! A hybrid semaphore that supports both synchronous and asynchronous waiters.
//!
//! `CapacityGate` is the backpressure half of the bounded channel: a sender
//! takes a permit before it enqueues, and the receiver hands the permit back
//! after it dequeues. Threads and tasks wait in one FIFO queue protected by a
//! `parking_lot::Mutex`.
//!
//! A released permit is handed directly to the waiter at the head of the
//! queue, so a newcomer calling `try_acquire` can never overtake a thread or
//! task that is already waiting. Closing the gate wakes every waiter and makes
//! all further acquisitions fail.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::{self, Thread};

use parking_lot::Mutex;

const WAITING: u8 = 0;
const GRANTED: u8 = 1;
const CLOSED: u8 = 2;

/// How a queued waiter is woken.
#[derive(Debug)]
enum Parked {
  Thread(Thread),
  Task(Mutex<Option<Waker>>),
}

/// One entry in the waiter queue. The releasing side settles it exactly once,
/// either granting it a permit or telling it the gate closed.
#[derive(Debug)]
struct WaitSlot {
  state: AtomicU8,
  parked: Parked,
}

impl WaitSlot {
  fn for_thread() -> Arc<Self> {
    Arc::new(Self {
      state: AtomicU8::new(WAITING),
      parked: Parked::Thread(thread::current()),
    })
  }

  fn for_task(waker: &Waker) -> Arc<Self> {
    Arc::new(Self {
      state: AtomicU8::new(WAITING),
      parked: Parked::Task(Mutex::new(Some(waker.clone()))),
    })
  }

  fn state(&self) -> u8 {
    self.state.load(Ordering::Acquire)
  }

  /// Publishes the outcome, then wakes the owner.
  fn settle(&self, outcome: u8) {
    self.state.store(outcome, Ordering::Release);
    match &self.parked {
      Parked::Thread(thread) => thread.unpark(),
      Parked::Task(waker) => {
        if let Some(waker) = waker.lock().take() {
          waker.wake();
        }
      }
    }
  }

  /// Replaces the stored waker if the task moved.
  fn refresh_waker(&self, waker: &Waker) {
    if let Parked::Task(slot) = &self.parked {
      let mut current = slot.lock();
      match current.as_ref() {
        Some(existing) if existing.will_wake(waker) => {}
        _ => *current = Some(waker.clone()),
      }
    }
  }
}

/// The internal state of the `CapacityGate`, protected by a `Mutex`.
#[derive(Debug)]
struct GateInternal {
  /// The number of currently available permits.
  permits: usize,
  closed: bool,
  /// A unified, fair (FIFO) queue of waiting threads and tasks.
  waiters: VecDeque<Arc<WaitSlot>>,
}

/// A clonable handle to a hybrid sync/async semaphore.
pub struct CapacityGate {
  capacity: usize,
  internal: Arc<Mutex<GateInternal>>,
}

impl fmt::Debug for CapacityGate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let internal = self.internal.lock();
    f.debug_struct("CapacityGate")
      .field("capacity", &self.capacity)
      .field("permits", &internal.permits)
      .field("closed", &internal.closed)
      .field("waiters", &internal.waiters.len())
      .finish()
  }
}

impl CapacityGate {
  /// Creates a new `CapacityGate` with every permit available.
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      internal: Arc::new(Mutex::new(GateInternal {
        permits: capacity,
        closed: false,
        waiters: VecDeque::new(),
      })),
    }
  }

  /// Returns the total capacity of the gate.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Returns the number of permits that can be taken right now.
  pub fn available(&self) -> usize {
    self.internal.lock().permits
  }

  /// Returns `true` once [`close`](Self::close) has been called.
  pub fn is_closed(&self) -> bool {
    self.internal.lock().closed
  }

  /// Acquires a permit, blocking the current thread if none are available.
  ///
  /// Returns `false` if the gate is or becomes closed before a permit is
  /// granted.
  pub fn acquire_sync(&self) -> bool {
    let slot = {
      let mut internal = self.internal.lock();
      if internal.closed {
        return false;
      }
      if internal.waiters.is_empty() && internal.permits > 0 {
        internal.permits -= 1;
        return true;
      }
      let slot = WaitSlot::for_thread();
      internal.waiters.push_back(Arc::clone(&slot));
      slot
    };

    // Parks can return spuriously; only a settled slot ends the wait.
    loop {
      match slot.state() {
        GRANTED => return true,
        CLOSED => return false,
        _ => thread::park(),
      }
    }
  }

  /// Acquires a permit asynchronously. The future resolves to `false` if the
  /// gate closes first.
  pub fn acquire_async(&self) -> AcquireFuture<'_> {
    AcquireFuture {
      gate: self,
      slot: None,
      finished: false,
    }
  }

  /// Attempts to acquire a permit without blocking.
  ///
  /// A permit can only be taken if no one is waiting; queued waiters always
  /// go first.
  pub fn try_acquire(&self) -> bool {
    let mut internal = self.internal.lock();
    if !internal.closed && internal.waiters.is_empty() && internal.permits > 0 {
      internal.permits -= 1;
      true
    } else {
      false
    }
  }

  /// Releases a permit back to the gate.
  ///
  /// If anyone is waiting, the permit goes straight to the head of the
  /// queue. Otherwise the count is capped at the gate's capacity.
  pub fn release(&self) {
    let mut internal = self.internal.lock();
    if !internal.closed {
      if let Some(waiter) = internal.waiters.pop_front() {
        drop(internal);
        waiter.settle(GRANTED);
        return;
      }
    }
    internal.permits = (internal.permits + 1).min(self.capacity);
  }

  /// Closes the gate, failing every current and future acquisition.
  ///
  /// Returns `false` if the gate was already closed.
  pub fn close(&self) -> bool {
    let waiters = {
      let mut internal = self.internal.lock();
      if internal.closed {
        return false;
      }
      internal.closed = true;
      std::mem::take(&mut internal.waiters)
    };
    for waiter in waiters {
      waiter.settle(CLOSED);
    }
    true
  }
}

/// A future that resolves when a permit is acquired from the `CapacityGate`.
///
/// Dropping a future that was granted a permit it never observed returns the
/// permit to the gate, so the next waiter is not stranded.
#[must_use = "futures do nothing unless you .await or poll them"]
#[derive(Debug)]
pub struct AcquireFuture<'a> {
  gate: &'a CapacityGate,
  slot: Option<Arc<WaitSlot>>,
  finished: bool,
}

impl Future for AcquireFuture<'_> {
  type Output = bool;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();

    if let Some(slot) = &this.slot {
      slot.refresh_waker(cx.waker());
      // Checked after the waker is stored so a concurrent settle is not missed.
      return match slot.state() {
        GRANTED => {
          this.finished = true;
          Poll::Ready(true)
        }
        CLOSED => {
          this.finished = true;
          Poll::Ready(false)
        }
        _ => Poll::Pending,
      };
    }

    let mut internal = this.gate.internal.lock();
    if internal.closed {
      this.finished = true;
      return Poll::Ready(false);
    }
    if internal.waiters.is_empty() && internal.permits > 0 {
      internal.permits -= 1;
      this.finished = true;
      return Poll::Ready(true);
    }

    let slot = WaitSlot::for_task(cx.waker());
    internal.waiters.push_back(Arc::clone(&slot));
    this.slot = Some(slot);
    Poll::Pending
  }
}

impl Drop for AcquireFuture<'_> {
  fn drop(&mut self) {
    if self.finished {
      return;
    }
    let Some(slot) = self.slot.take() else {
      return;
    };

    let mut internal = self.gate.internal.lock();
    if let Some(pos) = internal.waiters.iter().position(|w| Arc::ptr_eq(w, &slot)) {
      internal.waiters.remove(pos);
      return;
    }
    drop(internal);

    if slot.state() == GRANTED {
      self.gate.release();
    }
  }
}

impl Clone for CapacityGate {
  fn clone(&self) -> Self {
    Self {
      capacity: self.capacity,
      internal: self.internal.clone(),
    }
  }
}
