// examples/launch_async.rs
use cohort::{bounded, Coordinator, Selected};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cohort=debug")),
    )
    .init();

  println!("--- Async batch feeding a channel ---");
  let (tx, rx) = bounded::bounded_async::<String>(4);
  let (quit_tx, quit_rx) = bounded::bounded_async::<()>(1);

  let coordinator = Coordinator::default();
  let producer = tokio::spawn(async move {
    let report = coordinator
      .launch_async(6, move |i| {
        let tx = tx.clone();
        async move {
          tokio::time::sleep(Duration::from_millis(5 * i as u64)).await;
          tx.send(format!("task {} reporting", i)).await.unwrap();
        }
      })
      .await;
    quit_tx.send(()).await.unwrap();
    report
  });

  loop {
    match bounded::select2(&rx, &quit_rx).await {
      Selected::Left(Ok(message)) => println!("[Receiver] {}", message),
      Selected::Right(_) | Selected::Left(Err(_)) => break,
    }
  }
  // Drain anything that raced with the quit signal.
  while let Ok(message) = rx.try_recv() {
    println!("[Receiver] {}", message);
  }
  println!("{:?}", producer.await.unwrap());
}
