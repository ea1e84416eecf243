use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative cancellation flag shared between a coordinator and its units.
///
/// Cancelling never interrupts work already running. Units check the token
/// before they start and skip their work once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
  cancelled: Arc<AtomicBool>,
}

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// Requests cancellation. Idempotent.
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::Release);
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::Acquire)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_observe_cancellation() {
    let token = CancelToken::new();
    let observer = token.clone();
    assert!(!observer.is_cancelled());
    token.cancel();
    token.cancel();
    assert!(observer.is_cancelled());
  }
}
