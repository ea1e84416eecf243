// src/error.rs

//! Error values returned by the bounded channel handles.
//!
//! These are plain values the caller is expected to inspect. Contract
//! violations (a zero-capacity channel, a wait group decremented past zero)
//! are not represented here; they panic.

use core::fmt;

// Implements `into_inner`, `Display` and `Error` for an error enum whose
// every variant carries back the value that could not be delivered.
macro_rules! impl_error_for_enum_with_inner {
  (
    $enum_name:ident < $generic_param:ident >,
    $($variant:ident ( $message:expr ) ),+
    $(,)?
  ) => {
    impl<$generic_param> $enum_name<$generic_param> {
      /// Consumes the error, returning the value that was not sent.
      #[inline]
      pub fn into_inner(self) -> $generic_param {
        match self {
          $( $enum_name::$variant(v) => v, )+
        }
      }
    }

    impl<$generic_param> fmt::Display for $enum_name<$generic_param> {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
          $( $enum_name::$variant(_) => f.write_str($message), )+
        }
      }
    }

    impl<$generic_param: fmt::Debug> std::error::Error for $enum_name<$generic_param> {}
  };
}

/// Error returned by `try_send` when the value could not be enqueued
/// immediately. The value is handed back to the caller.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// Every slot of the channel is occupied.
  Full(T),
  /// The channel was closed, or every receiver has been dropped.
  Closed(T),
}

impl<T> TrySendError<T> {
  /// Returns `true` if the send failed only because the channel was full.
  #[inline]
  pub fn is_full(&self) -> bool {
    matches!(self, TrySendError::Full(_))
  }

  /// Returns `true` if the send failed because the channel is closed.
  #[inline]
  pub fn is_closed(&self) -> bool {
    matches!(self, TrySendError::Closed(_))
  }
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

impl_error_for_enum_with_inner!(
  TrySendError<T>,
  Full("channel full"),
  Closed("channel closed"),
);

/// Error returned by blocking or async `send` operations.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SendError {
  /// The channel was closed, or every receiver has been dropped.
  Closed,
}
impl std::error::Error for SendError {}
impl fmt::Display for SendError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed => write!(f, "channel closed"),
    }
  }
}

/// Error returned by `try_recv` when no item could be taken immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  Empty,
  Disconnected,
}
impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "channel empty"),
      TryRecvError::Disconnected => write!(f, "channel disconnected (empty and closed)"),
    }
  }
}

/// Error returned by blocking or async `recv` operations.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  Disconnected,
}
impl std::error::Error for RecvError {}
impl fmt::Display for RecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvError::Disconnected => write!(f, "channel disconnected (empty and closed)"),
    }
  }
}

/// Error returned when closing a handle or channel that is already closed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel is already closed")
  }
}

/// Error returned by `recv_timeout` operations.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvErrorTimeout {
  /// The channel is empty and closed.
  Disconnected,
  /// The timeout elapsed before an item could be received.
  Timeout,
}

impl std::error::Error for RecvErrorTimeout {}
impl fmt::Display for RecvErrorTimeout {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvErrorTimeout::Disconnected => write!(f, "channel disconnected"),
      RecvErrorTimeout::Timeout => write!(f, "receive operation timed out"),
    }
  }
}
