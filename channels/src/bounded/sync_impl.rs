//! Blocking send and receive for the bounded channel.

use super::{Receiver, Sender};
use crate::error::{RecvError, RecvErrorTimeout, SendError};

use std::time::{Duration, Instant};

/// Waits for a permit, then enqueues. Fails once the channel is closed or
/// every receiver is gone, including while blocked on a full channel.
pub(crate) fn send_sync<T: Send>(sender: &Sender<T>, item: T) -> Result<(), SendError> {
  let shared = &sender.shared;
  if shared.is_send_closed() {
    return Err(SendError::Closed);
  }
  if !shared.gate.acquire_sync() {
    return Err(SendError::Closed);
  }
  shared.push_with_permit(item).map_err(|_| SendError::Closed)
}

pub(crate) fn recv_sync<T: Send>(receiver: &Receiver<T>) -> Result<T, RecvError> {
  let shared = &receiver.shared;
  let mut guard = shared.internal.lock();
  loop {
    if let Some(item) = guard.queue.pop_front() {
      drop(guard);
      shared.gate.release();
      return Ok(item);
    }
    if guard.closed {
      return Err(RecvError::Disconnected);
    }
    shared.item_ready.wait(&mut guard);
  }
}

pub(crate) fn recv_timeout_sync<T: Send>(
  receiver: &Receiver<T>,
  timeout: Duration,
) -> Result<T, RecvErrorTimeout> {
  let shared = &receiver.shared;
  let deadline = Instant::now() + timeout;
  let mut guard = shared.internal.lock();
  loop {
    if let Some(item) = guard.queue.pop_front() {
      drop(guard);
      shared.gate.release();
      return Ok(item);
    }
    if guard.closed {
      return Err(RecvErrorTimeout::Disconnected);
    }
    if shared
      .item_ready
      .wait_until(&mut guard, deadline)
      .timed_out()
    {
      // One last look: the item may have landed together with the timeout.
      return match guard.queue.pop_front() {
        Some(item) => {
          drop(guard);
          shared.gate.release();
          Ok(item)
        }
        None if guard.closed => Err(RecvErrorTimeout::Disconnected),
        None => Err(RecvErrorTimeout::Timeout),
      };
    }
  }
}
