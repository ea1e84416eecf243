//! Task-based batches on the ambient tokio runtime.

use super::{Coordinator, LaunchError, LaunchReport, Tally, WorkerFault};
use crate::bounded::{self, AsyncSender};
use crate::coord::{CancelToken, WaitGroup};

use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, trace, warn};

impl Coordinator {
  /// Runs `work(i)` for `i` in `0..worker_count` as tokio tasks and resolves
  /// once every task has signalled completion.
  ///
  /// Must be called from within a tokio runtime. A panic while building or
  /// polling a unit's future is caught and reported the same way as in
  /// [`launch`](Self::launch).
  pub async fn launch_async<F, Fut>(
    &self,
    worker_count: usize,
    work: F,
  ) -> Result<LaunchReport, LaunchError>
  where
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    if worker_count == 0 {
      trace!("empty batch, nothing to launch");
      return Ok(LaunchReport::default());
    }
    debug!(worker_count, "launching async batch");

    let group = WaitGroup::new();
    let tally = Arc::new(Tally::default());
    let work = Arc::new(work);
    let (fault_tx, fault_rx) = bounded::bounded_async::<WorkerFault>(worker_count);

    for index in 0..worker_count {
      let guard = group.guard();
      let work = Arc::clone(&work);
      let tally = Arc::clone(&tally);
      let faults = fault_tx.clone();
      let cancel = self.cancel.clone();

      tokio::spawn(async move {
        // The unit's future, and everything it captured, is dropped at the
        // end of this statement, before the guard signals completion.
        run_task(index, work, tally, faults, cancel).await;
        drop(guard);
      });
    }
    drop(fault_tx);

    group.wait_async().await;

    let report = tally.report(worker_count);
    let mut faults = Vec::new();
    while let Ok(fault) = fault_rx.try_recv() {
      faults.push(fault);
    }
    debug!(
      completed = report.completed,
      skipped = report.skipped,
      faulted = faults.len(),
      "async batch finished"
    );

    if faults.is_empty() {
      Ok(report)
    } else {
      Err(LaunchError::WorkersFaulted { report, faults })
    }
  }
}

async fn run_task<F, Fut>(
  index: usize,
  work: Arc<F>,
  tally: Arc<Tally>,
  faults: AsyncSender<WorkerFault>,
  cancel: CancelToken,
) where
  F: Fn(usize) -> Fut,
  Fut: Future<Output = ()>,
{
  if cancel.is_cancelled() {
    trace!(index, "batch cancelled, skipping task");
    tally.skipped.fetch_add(1, Ordering::AcqRel);
    return;
  }

  trace!(index, "task started");
  let unit = AssertUnwindSafe(async { work(index).await }).catch_unwind();
  match unit.await {
    Ok(()) => {
      tally.completed.fetch_add(1, Ordering::AcqRel);
      trace!(index, "task finished");
    }
    Err(payload) => {
      let fault = WorkerFault::from_panic(index, payload);
      warn!(index, message = %fault.message, "worker task panicked");
      if let Err(err) = faults.try_send(fault) {
        warn!(index, error = %err, "fault channel rejected report");
      }
    }
  }
}
