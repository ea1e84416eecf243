// examples/channels.rs
use cohort::bounded;
use cohort::error::{RecvError, TrySendError};
use std::thread;
use std::time::Duration;

fn main() {
  println!("--- Buffered channel ---");
  {
    let (tx, rx) = bounded::bounded::<&str>(2);
    tx.send("buffered").unwrap();
    tx.send("channel").unwrap();
    if let Err(TrySendError::Full(item)) = tx.try_send("overflow") {
      println!("[Sender] channel full, kept {:?}", item);
    }
    println!("[Receiver] {}", rx.recv().unwrap());
    println!("[Receiver] {}", rx.recv().unwrap());
  }

  println!("\n--- Range over a closed channel ---");
  {
    let (tx, rx) = bounded::bounded(5);
    thread::spawn(move || {
      let (mut a, mut b) = (0_u64, 1_u64);
      for _ in 0..10 {
        tx.send(a).unwrap();
        (a, b) = (b, a + b);
      }
      tx.close_channel().unwrap();
    });
    let fib: Vec<u64> = rx.iter().collect();
    println!("[Receiver] fibonacci: {:?}", fib);
  }

  println!("\n--- Producers block while the buffer is full ---");
  {
    let (tx, rx) = bounded::bounded(1);
    let producers: Vec<_> = (0..3)
      .map(|i| {
        let tx = tx.clone();
        thread::spawn(move || {
          tx.send(i).unwrap();
          println!("[Producer {}] sent", i);
        })
      })
      .collect();
    drop(tx);

    thread::sleep(Duration::from_millis(20));
    loop {
      match rx.recv() {
        Ok(value) => println!("[Receiver] got {}", value),
        Err(RecvError::Disconnected) => break,
      }
    }
    for producer in producers {
      producer.join().unwrap();
    }
  }
}
