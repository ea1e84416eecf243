// src/launch/mod.rs

//! Fan-out/fan-in batches: run `work(i)` for every `i` in `0..worker_count`
//! on its own thread and return once every unit has signalled completion.
//!
//! Each unit receives its index by value and owns a
//! [`DoneGuard`](crate::DoneGuard), so its completion signal fires on every
//! exit path, unwinding included. The guard is released only after the unit
//! has let go of the work closure and the shared state, so once a launch
//! returns the caller is their sole owner again. A panic inside `work` is
//! caught and reported to the coordinator over a bounded fault channel sized
//! to the batch; the coordinator never waits on a signal that cannot arrive.
//!
//! ```
//! use cohort::{launch, GuardedMap};
//!
//! let seen = GuardedMap::new();
//! let report = launch(5, {
//!   let seen = seen.clone();
//!   move |i| {
//!     seen.insert(i, i * i);
//!   }
//! })
//! .unwrap();
//!
//! assert_eq!(report.completed, 5);
//! assert_eq!(seen.len(), 5);
//! ```

mod config;
mod report;

#[cfg(feature = "tokio")]
mod async_impl;

pub use config::{ConfigError, LaunchConfig, LaunchConfigBuilder, DEFAULT_THREAD_NAME_PREFIX};
pub use report::{LaunchError, LaunchReport, WorkerFault};

use crate::bounded::{self, Sender};
use crate::coord::{CancelToken, WaitGroup};

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

/// Runs `work(i)` for `i` in `0..worker_count` on the default coordinator.
pub fn launch<F>(worker_count: usize, work: F) -> Result<LaunchReport, LaunchError>
where
  F: Fn(usize) + Send + Sync + 'static,
{
  Coordinator::default().launch(worker_count, work)
}

/// Launches batches of units and waits for each batch to finish.
///
/// Every call to [`launch`](Self::launch) builds its own wait group; nothing
/// is carried over between batches except the configuration and the
/// cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
  config: LaunchConfig,
  cancel: CancelToken,
}

// Per-batch counters shared with every unit.
#[derive(Debug, Default)]
pub(crate) struct Tally {
  pub(crate) completed: AtomicUsize,
  pub(crate) skipped: AtomicUsize,
}

impl Tally {
  pub(crate) fn report(&self, launched: usize) -> LaunchReport {
    LaunchReport {
      launched,
      completed: self.completed.load(Ordering::Acquire),
      skipped: self.skipped.load(Ordering::Acquire),
    }
  }
}

struct Batch<F, S> {
  work: F,
  state: S,
}

impl Coordinator {
  pub fn new(config: LaunchConfig) -> Self {
    Self {
      config,
      cancel: CancelToken::new(),
    }
  }

  pub fn config(&self) -> &LaunchConfig {
    &self.config
  }

  /// The token consulted by every unit before it starts. Cancelling it
  /// affects this coordinator's current and future batches.
  pub fn cancel_token(&self) -> CancelToken {
    self.cancel.clone()
  }

  /// Runs `work(i)` for `i` in `0..worker_count`, one thread per unit, and
  /// returns once all of them have signalled completion.
  pub fn launch<F>(&self, worker_count: usize, work: F) -> Result<LaunchReport, LaunchError>
  where
    F: Fn(usize) + Send + Sync + 'static,
  {
    self.launch_with(worker_count, (), move |index, _: &()| work(index))
  }

  /// Like [`launch`](Self::launch), handing every unit a shared `state`.
  pub fn launch_with<S, F>(
    &self,
    worker_count: usize,
    state: S,
    work: F,
  ) -> Result<LaunchReport, LaunchError>
  where
    S: Send + Sync + 'static,
    F: Fn(usize, &S) + Send + Sync + 'static,
  {
    if worker_count == 0 {
      trace!("empty batch, nothing to launch");
      return Ok(LaunchReport::default());
    }
    debug!(worker_count, prefix = %self.config.thread_name_prefix, "launching batch");

    let group = WaitGroup::new();
    let tally = Arc::new(Tally::default());
    let batch = Arc::new(Batch { work, state });
    // Each unit reports at most one fault, so sends never block.
    let (fault_tx, fault_rx) = bounded::bounded::<WorkerFault>(worker_count);

    let mut launched = 0;
    let mut spawn_failure = None;

    for index in 0..worker_count {
      let guard = group.guard();
      let unit = Unit {
        index,
        batch: Arc::clone(&batch),
        tally: Arc::clone(&tally),
        faults: fault_tx.clone(),
        cancel: self.cancel.clone(),
      };
      // The unit, and its share of the batch, is gone before the guard
      // signals completion. On spawn failure the closure is dropped right
      // here, guard included, so the wait below still balances.
      let spawned = self.config.thread_builder(index).spawn(move || {
        unit.run();
        drop(guard);
      });
      match spawned {
        Ok(_) => launched += 1,
        Err(source) => {
          warn!(index, error = %source, "failed to spawn worker thread");
          spawn_failure = Some((index, source));
          break;
        }
      }
    }
    drop(fault_tx);

    group.wait();

    let report = tally.report(launched);
    let faults: Vec<WorkerFault> = fault_rx.try_iter().collect();
    debug!(
      launched = report.launched,
      completed = report.completed,
      skipped = report.skipped,
      faulted = faults.len(),
      "batch finished"
    );

    if let Some((index, source)) = spawn_failure {
      return Err(LaunchError::Spawn {
        index,
        report,
        source,
      });
    }
    if !faults.is_empty() {
      return Err(LaunchError::WorkersFaulted { report, faults });
    }
    Ok(report)
  }
}

/// Everything one spawned unit owns apart from its completion guard.
struct Unit<F, S> {
  index: usize,
  batch: Arc<Batch<F, S>>,
  tally: Arc<Tally>,
  faults: Sender<WorkerFault>,
  cancel: CancelToken,
}

impl<F, S> Unit<F, S>
where
  S: Send + Sync + 'static,
  F: Fn(usize, &S) + Send + Sync + 'static,
{
  fn run(self) {
    let Unit {
      index,
      batch,
      tally,
      faults,
      cancel,
    } = self;

    if cancel.is_cancelled() {
      trace!(index, "batch cancelled, skipping unit");
      tally.skipped.fetch_add(1, Ordering::AcqRel);
      return;
    }

    trace!(index, "unit started");
    match panic::catch_unwind(AssertUnwindSafe(|| (batch.work)(index, &batch.state))) {
      Ok(()) => {
        tally.completed.fetch_add(1, Ordering::AcqRel);
        trace!(index, "unit finished");
      }
      Err(payload) => {
        let fault = WorkerFault::from_panic(index, payload);
        warn!(index, message = %fault.message, "worker panicked");
        if let Err(err) = faults.try_send(fault) {
          warn!(index, error = %err, "fault channel rejected report");
        }
      }
    }
  }
}
