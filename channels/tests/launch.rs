mod common;
use common::*;

use cohort::bounded;
use cohort::error::TryRecvError;
use cohort::launch::ConfigError;
use cohort::{launch, Coordinator, GuardedMap, LaunchConfig, LaunchError, LaunchReport, WaitGroup};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

#[test]
fn empty_batch_returns_immediately() {
  let calls = Arc::new(AtomicUsize::new(0));
  let report = launch(0, {
    let calls = calls.clone();
    move |_| {
      calls.fetch_add(1, Ordering::SeqCst);
    }
  })
  .unwrap();

  assert_eq!(report, LaunchReport::default());
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn every_unit_completes_exactly_once() {
  for worker_count in [1, 2, 7, 32] {
    let hits = GuardedMap::new();
    let report = launch(worker_count, {
      let hits = hits.clone();
      move |i| {
        hits.write(|m| *m.entry(i).or_insert(0_usize) += 1);
      }
    })
    .unwrap();

    assert_eq!(report.launched, worker_count);
    assert_eq!(report.completed, worker_count);
    assert_eq!(report.faulted(), 0);
    let hits = hits.snapshot();
    assert_eq!(hits.len(), worker_count);
    assert!(hits.values().all(|&n| n == 1));
  }
}

#[test]
fn units_see_distinct_indices() {
  let seen = GuardedMap::new();
  launch(5, {
    let seen = seen.clone();
    move |i| {
      seen.insert(i, format!("worker {}", i));
    }
  })
  .unwrap();

  let keys: HashSet<usize> = seen.snapshot().into_keys().collect();
  assert_eq!(keys, (0..5).collect::<HashSet<_>>());
  assert_eq!(seen.get(&3).as_deref(), Some("worker 3"));
}

#[test]
fn launch_blocks_until_the_slowest_unit_finishes() {
  let started = Instant::now();
  launch(4, |i| thread::sleep(SETTLE * (i as u32 + 1))).unwrap();
  assert!(started.elapsed() >= SETTLE * 4);
}

#[test]
fn units_run_concurrently() {
  // Deadlocks unless all units are alive at once.
  let barrier = Arc::new(Barrier::new(6));
  let report = launch(6, {
    let barrier = barrier.clone();
    move |_| {
      barrier.wait();
    }
  })
  .unwrap();
  assert_eq!(report.completed, 6);
}

#[test]
fn panicking_units_are_reported_not_hung() {
  let completed = Arc::new(AtomicUsize::new(0));
  let result = launch(ITEMS_LOW, {
    let completed = completed.clone();
    move |i| {
      if i % 10 == 3 {
        panic!("unit {} gave up", i);
      }
      completed.fetch_add(1, Ordering::SeqCst);
    }
  });

  let err = result.unwrap_err();
  let LaunchError::WorkersFaulted { report, faults } = &err else {
    panic!("expected WorkersFaulted, got {:?}", err);
  };
  assert_eq!(report.launched, ITEMS_LOW);
  assert_eq!(report.completed, completed.load(Ordering::SeqCst));
  assert_eq!(report.faulted(), faults.len());

  let mut indices: Vec<usize> = faults.iter().map(|f| f.index).collect();
  indices.sort_unstable();
  assert_eq!(indices, vec![3, 13, 23, 33, 43]);
  assert!(faults.iter().all(|f| f.message == format!("unit {} gave up", f.index)));
  assert_eq!(err.to_string(), format!("5 of {} workers faulted", ITEMS_LOW));
}

#[test]
fn every_unit_panicking_still_returns() {
  let err = launch(8, |_| panic!("boom")).unwrap_err();
  assert_eq!(err.faults().len(), 8);
  assert_eq!(err.report().completed, 0);
}

#[test]
fn cancelled_coordinator_skips_units() {
  let coordinator = Coordinator::default();
  coordinator.cancel_token().cancel();

  let ran = Arc::new(AtomicUsize::new(0));
  let report = coordinator
    .launch(10, {
      let ran = ran.clone();
      move |_| {
        ran.fetch_add(1, Ordering::SeqCst);
      }
    })
    .unwrap();

  assert_eq!(ran.load(Ordering::SeqCst), 0);
  assert_eq!(
    report,
    LaunchReport {
      launched: 10,
      completed: 0,
      skipped: 10,
    }
  );
}

#[test]
fn cancellation_mid_batch_lets_started_units_finish() {
  let coordinator = Coordinator::default();
  let cancel = coordinator.cancel_token();
  let gate = WaitGroup::new();
  gate.add(1);

  let result = thread::spawn({
    let coordinator = coordinator.clone();
    let gate = gate.clone();
    move || {
      coordinator.launch(ITEMS_MEDIUM, move |i| {
        if i == 0 {
          gate.done();
        }
        thread::sleep(SETTLE);
      })
    }
  });

  assert!(gate.wait_timeout(LONG_TIMEOUT), "first unit never started");
  cancel.cancel();
  let report = result.join().unwrap().unwrap();

  assert_eq!(report.launched, ITEMS_MEDIUM);
  assert!(report.completed >= 1);
  assert_eq!(report.completed + report.skipped, ITEMS_MEDIUM);
}

#[test]
fn launch_with_shares_state() {
  let coordinator = Coordinator::default();
  let totals: GuardedMap<&'static str, usize> = GuardedMap::new();
  totals.insert("sum", 0);

  let report = coordinator
    .launch_with(10, totals.clone(), |i, totals| {
      totals.update("sum", |sum| *sum += i);
    })
    .unwrap();

  assert_eq!(report.completed, 10);
  assert_eq!(totals.get("sum"), Some(45));
}

#[test]
fn worker_threads_use_configured_names() {
  let config = LaunchConfig::builder()
    .thread_name_prefix("harvest")
    .stack_size(256 * 1024)
    .build()
    .unwrap();
  let names = GuardedMap::new();

  Coordinator::new(config)
    .launch(3, {
      let names = names.clone();
      move |i| {
        let name = thread::current().name().map(str::to_owned);
        names.insert(i, name);
      }
    })
    .unwrap();

  let names: HashMap<usize, Option<String>> = names.snapshot();
  for i in 0..3 {
    assert_eq!(names[&i].as_deref(), Some(format!("harvest-{}", i).as_str()));
  }
}

#[test]
fn yaml_config_drives_the_coordinator() {
  let config = LaunchConfig::from_yaml_str("thread_name_prefix: from-yaml\n").unwrap();
  assert_eq!(config.stack_size, None);

  let coordinator = Coordinator::new(config);
  assert_eq!(coordinator.config().thread_name_prefix, "from-yaml");
  assert!(coordinator.launch(2, |_| {}).is_ok());

  assert!(matches!(
    LaunchConfig::from_yaml_str("thread_name_prefix: \"\"\n"),
    Err(ConfigError::InvalidValue { ref field, .. }) if field == "thread_name_prefix"
  ));
  assert!(matches!(
    LaunchConfig::from_yaml_str("workers: 4\n"),
    Err(ConfigError::Parse(_))
  ));
}

#[test]
fn coordinator_is_reusable_across_batches() {
  let coordinator = Coordinator::default();
  let total = Arc::new(AtomicUsize::new(0));
  for round in 1..=5 {
    let report = coordinator
      .launch(round, {
        let total = total.clone();
        move |_| {
          total.fetch_add(1, Ordering::SeqCst);
        }
      })
      .unwrap();
    assert_eq!(report.completed, round);
  }
  assert_eq!(total.load(Ordering::SeqCst), 15);
}

#[test]
fn captured_state_is_released_before_launch_returns() {
  for _ in 0..ITEMS_MEDIUM {
    let marker = Arc::new(());
    launch(4, {
      let marker = marker.clone();
      move |_| assert!(Arc::strong_count(&marker) >= 2)
    })
    .unwrap();
    assert_eq!(Arc::strong_count(&marker), 1);

    let seen = GuardedMap::new();
    launch(5, {
      let seen = seen.clone();
      move |i| {
        seen.insert(i, i * 2);
      }
    })
    .unwrap();
    let seen = seen.into_inner().expect("a worker still holds the map");
    assert_eq!(seen.len(), 5);
  }
}

#[test]
fn shared_state_is_released_before_launch_with_returns() {
  let coordinator = Coordinator::default();
  for _ in 0..ITEMS_LOW {
    let totals: GuardedMap<usize, usize> = GuardedMap::new();
    coordinator
      .launch_with(3, totals.clone(), |i, totals| {
        totals.insert(i, i);
      })
      .unwrap();
    assert_eq!(totals.into_inner().map(|m| m.len()).ok(), Some(3));
  }
}

#[test]
fn captured_sender_disconnects_once_launch_returns() {
  for _ in 0..ITEMS_MEDIUM {
    let (tx, rx) = bounded::bounded(4);
    launch(4, move |i| tx.send(i).unwrap()).unwrap();

    let mut received: Vec<usize> = rx.try_iter().collect();
    received.sort_unstable();
    assert_eq!(received, vec![0, 1, 2, 3]);
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
  }
}

#[test]
fn spawn_failure_reports_the_partial_batch() {
  // No platform can map a stack this large, so the very first spawn fails.
  let config = LaunchConfig::builder()
    .stack_size(usize::MAX / 4)
    .build()
    .unwrap();
  let ran = Arc::new(AtomicUsize::new(0));

  let err = Coordinator::new(config)
    .launch(3, {
      let ran = ran.clone();
      move |_| {
        ran.fetch_add(1, Ordering::SeqCst);
      }
    })
    .unwrap_err();

  match &err {
    LaunchError::Spawn { index, report, .. } => {
      assert_eq!(*index, 0);
      assert_eq!(*report, LaunchReport::default());
    }
    other => panic!("expected Spawn, got {:?}", other),
  }
  assert_eq!(err.report().launched, 0);
  assert!(err.faults().is_empty());
  assert!(err.to_string().starts_with("failed to spawn worker 0: "));
  assert_eq!(ran.load(Ordering::SeqCst), 0);
  assert_eq!(Arc::strong_count(&ran), 1);
}
