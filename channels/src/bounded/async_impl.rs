// src/bounded/async_impl.rs

//! Future-based send and receive for the bounded channel, plus a two-way
//! `select` over async receivers.

use futures_core::Stream;

use super::{AsyncReceiver, AsyncSender};
use crate::coord::AcquireFuture;
use crate::error::{RecvError, SendError};

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{ready, Context, Poll};

// --- SendFuture ---

/// A future that completes when a value has been enqueued.
///
/// Dropping the future before it completes drops the value.
#[must_use = "futures do nothing unless you .await or poll them"]
#[derive(Debug)]
pub struct SendFuture<'a, T: Send> {
  sender: &'a AsyncSender<T>,
  item: Option<T>,
  acquire: Option<AcquireFuture<'a>>,
}

impl<'a, T: Send> SendFuture<'a, T> {
  pub(super) fn new(sender: &'a AsyncSender<T>, item: T) -> Self {
    Self {
      sender,
      item: Some(item),
      acquire: None,
    }
  }
}

// The item is never pinned; it is only moved into the queue.
impl<T: Send> Unpin for SendFuture<'_, T> {}

impl<'a, T: Send> Future for SendFuture<'a, T> {
  type Output = Result<(), SendError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    let sender: &'a AsyncSender<T> = this.sender;
    let shared = &sender.shared;

    if this.acquire.is_none() && (sender.is_handle_closed() || shared.is_send_closed()) {
      this.item = None;
      return Poll::Ready(Err(SendError::Closed));
    }
    let acquire = this
      .acquire
      .get_or_insert_with(|| shared.gate.acquire_async());
    let acquired = ready!(Pin::new(acquire).poll(cx));

    let Some(item) = this.item.take() else {
      panic!("SendFuture polled after completion");
    };
    if !acquired {
      return Poll::Ready(Err(SendError::Closed));
    }
    Poll::Ready(shared.push_with_permit(item).map_err(|_| SendError::Closed))
  }
}

// --- RecvFuture ---

/// A future that completes with the next item, or with
/// `RecvError::Disconnected` once the channel is closed and empty.
#[must_use = "futures do nothing unless you .await or poll them"]
#[derive(Debug)]
pub struct RecvFuture<'a, T: Send> {
  receiver: &'a AsyncReceiver<T>,
}

impl<'a, T: Send> RecvFuture<'a, T> {
  pub(super) fn new(receiver: &'a AsyncReceiver<T>) -> Self {
    Self { receiver }
  }
}

impl<T: Send> Future for RecvFuture<'_, T> {
  type Output = Result<T, RecvError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    self.receiver.poll_recv(cx)
  }
}

impl<T: Send> AsyncReceiver<T> {
  /// Polls for the next item, registering the task's waker if none is ready.
  pub fn poll_recv(&self, cx: &mut Context<'_>) -> Poll<Result<T, RecvError>> {
    if self.is_handle_closed() {
      return Poll::Ready(Err(RecvError::Disconnected));
    }
    let shared = &self.shared;
    let mut guard = shared.internal.lock();
    if let Some(item) = guard.queue.pop_front() {
      drop(guard);
      shared.gate.release();
      return Poll::Ready(Ok(item));
    }
    if guard.closed {
      return Poll::Ready(Err(RecvError::Disconnected));
    }
    if !guard
      .waiting_async_receivers
      .iter()
      .any(|w| w.will_wake(cx.waker()))
    {
      guard.waiting_async_receivers.push_back(cx.waker().clone());
    }
    Poll::Pending
  }
}

impl<T: Send> Stream for AsyncReceiver<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    match self.poll_recv(cx) {
      Poll::Ready(Ok(item)) => Poll::Ready(Some(item)),
      Poll::Ready(Err(RecvError::Disconnected)) => Poll::Ready(None),
      Poll::Pending => Poll::Pending,
    }
  }
}

// --- select2 ---

/// The outcome of [`select2`]: which receiver finished first, and with what.
#[derive(Debug, PartialEq, Eq)]
pub enum Selected<A, B> {
  Left(Result<A, RecvError>),
  Right(Result<B, RecvError>),
}

// Alternates which side is polled first so a busy receiver cannot starve the
// other one.
static SELECT_ROTATION: AtomicUsize = AtomicUsize::new(0);

/// Waits on two receivers at once and resolves with whichever is ready first.
///
/// A receiver that is closed and drained counts as ready and resolves with
/// `Err(RecvError::Disconnected)`. When both are ready, the side polled first
/// alternates between calls.
pub fn select2<'a, A: Send, B: Send>(
  left: &'a AsyncReceiver<A>,
  right: &'a AsyncReceiver<B>,
) -> Select2<'a, A, B> {
  Select2 {
    left,
    right,
    left_first: SELECT_ROTATION.fetch_add(1, Ordering::Relaxed) % 2 == 0,
  }
}

/// Future returned by [`select2`].
#[must_use = "futures do nothing unless you .await or poll them"]
#[derive(Debug)]
pub struct Select2<'a, A: Send, B: Send> {
  left: &'a AsyncReceiver<A>,
  right: &'a AsyncReceiver<B>,
  left_first: bool,
}

impl<A: Send, B: Send> Future for Select2<'_, A, B> {
  type Output = Selected<A, B>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    if this.left_first {
      if let Poll::Ready(res) = this.left.poll_recv(cx) {
        return Poll::Ready(Selected::Left(res));
      }
      if let Poll::Ready(res) = this.right.poll_recv(cx) {
        return Poll::Ready(Selected::Right(res));
      }
    } else {
      if let Poll::Ready(res) = this.right.poll_recv(cx) {
        return Poll::Ready(Selected::Right(res));
      }
      if let Poll::Ready(res) = this.left.poll_recv(cx) {
        return Poll::Ready(Selected::Left(res));
      }
    }
    Poll::Pending
  }
}
