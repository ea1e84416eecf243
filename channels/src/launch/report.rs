use std::any::Any;
use std::fmt;
use std::io;

use thiserror::Error;

/// Tallies for one finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchReport {
  /// Units that were scheduled.
  pub launched: usize,
  /// Units whose work returned normally.
  pub completed: usize,
  /// Units that saw a cancelled token and never started their work.
  pub skipped: usize,
}

impl LaunchReport {
  /// Units whose work panicked.
  pub fn faulted(&self) -> usize {
    self.launched - self.completed - self.skipped
  }
}

/// A panic caught inside one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFault {
  pub index: usize,
  pub message: String,
}

impl WorkerFault {
  pub(crate) fn from_panic(index: usize, payload: Box<dyn Any + Send>) -> Self {
    let message = match payload.downcast::<String>() {
      Ok(message) => *message,
      Err(payload) => match payload.downcast::<&'static str>() {
        Ok(message) => (*message).to_string(),
        Err(_) => "non-string panic payload".to_string(),
      },
    };
    Self { index, message }
  }
}

impl fmt::Display for WorkerFault {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "worker {} panicked: {}", self.index, self.message)
  }
}

/// Why a batch did not finish cleanly.
///
/// Every variant is returned only after all spawned units have signalled
/// completion.
#[derive(Debug, Error)]
pub enum LaunchError {
  #[error("failed to spawn worker {index}: {source}")]
  Spawn {
    index: usize,
    report: LaunchReport,
    #[source]
    source: io::Error,
  },

  #[error("{} of {} workers faulted", .faults.len(), .report.launched)]
  WorkersFaulted {
    report: LaunchReport,
    faults: Vec<WorkerFault>,
  },
}

impl LaunchError {
  /// The tallies of the units that did run.
  pub fn report(&self) -> &LaunchReport {
    match self {
      LaunchError::Spawn { report, .. } => report,
      LaunchError::WorkersFaulted { report, .. } => report,
    }
  }

  /// Faults caught in the batch. Empty for spawn failures.
  pub fn faults(&self) -> &[WorkerFault] {
    match self {
      LaunchError::Spawn { .. } => &[],
      LaunchError::WorkersFaulted { faults, .. } => faults,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fault_message_from_common_payloads() {
    let fault = WorkerFault::from_panic(3, Box::new("static str"));
    assert_eq!(fault.message, "static str");
    assert_eq!(fault.to_string(), "worker 3 panicked: static str");

    let fault = WorkerFault::from_panic(1, Box::new(String::from("owned")));
    assert_eq!(fault.message, "owned");

    let fault = WorkerFault::from_panic(0, Box::new(42_u32));
    assert_eq!(fault.message, "non-string panic payload");
  }

  #[test]
  fn faulted_error_display_counts() {
    let err = LaunchError::WorkersFaulted {
      report: LaunchReport {
        launched: 4,
        completed: 3,
        skipped: 0,
      },
      faults: vec![WorkerFault {
        index: 2,
        message: "boom".into(),
      }],
    };
    assert_eq!(err.to_string(), "1 of 4 workers faulted");
    assert_eq!(err.report().faulted(), 1);
    assert_eq!(err.faults()[0].index, 2);
  }
}
