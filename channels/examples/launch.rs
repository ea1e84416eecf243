// examples/launch.rs
//
// Run with `RUST_LOG=cohort=trace` to see every unit start and finish.
use cohort::{launch, Coordinator, GuardedMap, LaunchConfig, LaunchError};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cohort=debug")),
    )
    .init();

  println!("--- launch: five workers, one shared map ---");
  let squares = GuardedMap::new();
  let report = launch(5, {
    let squares = squares.clone();
    move |i| {
      thread::sleep(Duration::from_millis(10 * (5 - i as u64)));
      println!("[Worker {}] done", i);
      squares.insert(i, i * i);
    }
  })
  .unwrap();
  let mut squares: Vec<_> = squares.snapshot().into_iter().collect();
  squares.sort_unstable();
  println!("{:?} -> {:?}", report, squares);

  println!("\n--- launch: a worker panics ---");
  match launch(4, |i| {
    if i == 2 {
      panic!("worker {} hit a bad record", i);
    }
  }) {
    Ok(report) => println!("unexpected success: {:?}", report),
    Err(LaunchError::WorkersFaulted { report, faults }) => {
      println!("{} completed, faults:", report.completed);
      for fault in faults {
        println!("  {}", fault);
      }
    }
    Err(err) => println!("launch failed: {}", err),
  }

  println!("\n--- Coordinator from YAML ---");
  let config =
    LaunchConfig::from_yaml_str("thread_name_prefix: crawler\nstack_size: 524288\n").unwrap();
  let coordinator = Coordinator::new(config);
  coordinator
    .launch(3, |_| {
      println!("[{}] running", thread::current().name().unwrap_or("?"));
    })
    .unwrap();
}
