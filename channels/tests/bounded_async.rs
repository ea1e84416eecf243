mod common;
use common::*;

use cohort::bounded::{self, Selected};
use cohort::error::{RecvError, SendError, TryRecvError, TrySendError};
use futures_util::StreamExt;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn async_send_recv_in_order() {
  let (tx, rx) = bounded::bounded_async(4);
  for i in 0..4 {
    tx.send(i).await.unwrap();
  }
  assert!(tx.is_full());
  assert!(matches!(tx.try_send(99), Err(TrySendError::Full(99))));

  for i in 0..4 {
    assert_eq!(rx.recv().await, Ok(i));
  }
  assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn pending_send_completes_after_recv() {
  let (tx, rx) = bounded::bounded_async(1);
  tx.send(1).await.unwrap();

  let producer = tokio::spawn(async move { tx.send(2).await });
  tokio::time::sleep(SETTLE).await;
  assert!(!producer.is_finished(), "send should wait for a free slot");

  assert_eq!(rx.recv().await, Ok(1));
  assert_eq!(producer.await.unwrap(), Ok(()));
  assert_eq!(rx.recv().await, Ok(2));
}

#[tokio::test]
async fn stream_ends_after_senders_drop() {
  let (tx, rx) = bounded::bounded_async(8);
  let producer = tokio::spawn(async move {
    for i in 0..ITEMS_MEDIUM {
      tx.send(i).await.unwrap();
    }
  });

  let collected: Vec<usize> = timeout(LONG_TIMEOUT, rx.collect())
    .await
    .expect("stream did not terminate");
  producer.await.unwrap();
  assert_eq!(collected, (0..ITEMS_MEDIUM).collect::<Vec<_>>());
}

#[tokio::test]
async fn close_channel_fails_pending_async_send() {
  let (tx, rx) = bounded::bounded_async(1);
  tx.send("kept").await.unwrap();

  let closer = tx.clone();
  let producer = tokio::spawn(async move { tx.send("lost").await });
  tokio::time::sleep(SETTLE).await;

  closer.close_channel().unwrap();
  assert_eq!(producer.await.unwrap(), Err(SendError::Closed));
  assert_eq!(rx.recv().await, Ok("kept"));
  assert_eq!(rx.recv().await, Err(RecvError::Disconnected));
}

#[tokio::test]
async fn dropped_recv_future_does_not_lose_items() {
  let (tx, rx) = bounded::bounded_async::<u32>(2);

  // Register a waiter and abandon it.
  let abandoned = timeout(Duration::from_millis(10), rx.recv()).await;
  assert!(abandoned.is_err());

  let consumer = {
    let rx = rx.clone();
    tokio::spawn(async move { rx.recv().await })
  };
  tokio::time::sleep(SETTLE).await;
  tx.send(7).await.unwrap();

  let got = timeout(SHORT_TIMEOUT, consumer).await.expect("live receiver was not woken");
  assert_eq!(got.unwrap(), Ok(7));
}

#[tokio::test]
async fn select2_takes_whichever_is_ready() {
  let (numbers_tx, numbers) = bounded::bounded_async::<u32>(1);
  let (words_tx, words) = bounded::bounded_async::<&str>(1);

  words_tx.send("hello").await.unwrap();
  assert_eq!(
    bounded::select2(&numbers, &words).await,
    Selected::Right(Ok("hello"))
  );

  let feeder = tokio::spawn(async move {
    tokio::time::sleep(SETTLE).await;
    numbers_tx.send(42).await.unwrap();
  });
  assert_eq!(
    timeout(SHORT_TIMEOUT, bounded::select2(&numbers, &words))
      .await
      .unwrap(),
    Selected::Left(Ok(42))
  );
  feeder.await.unwrap();

  // numbers_tx is gone now, so that side reports disconnection.
  assert_eq!(
    bounded::select2(&numbers, &words).await,
    Selected::Left(Err(RecvError::Disconnected))
  );
  drop(words_tx);
}

#[tokio::test]
async fn select2_alternates_when_both_ready() {
  let (a_tx, a) = bounded::bounded_async::<u8>(ITEMS_LOW);
  let (b_tx, b) = bounded::bounded_async::<u8>(ITEMS_LOW);
  for _ in 0..ITEMS_LOW {
    a_tx.send(0).await.unwrap();
    b_tx.send(1).await.unwrap();
  }

  let mut lefts = 0;
  let mut rights = 0;
  for _ in 0..20 {
    match bounded::select2(&a, &b).await {
      Selected::Left(Ok(_)) => lefts += 1,
      Selected::Right(Ok(_)) => rights += 1,
      other => panic!("unexpected select result: {:?}", other),
    }
  }
  assert!(lefts > 0 && rights > 0, "lefts={} rights={}", lefts, rights);
}

#[tokio::test]
async fn sync_producer_feeds_async_consumer() {
  let (tx, rx) = bounded::bounded::<usize>(4);
  let rx = rx.to_async();

  let producer = std::thread::spawn(move || {
    for i in 0..ITEMS_MEDIUM {
      tx.send(i).unwrap();
    }
  });

  let mut sum = 0;
  while let Ok(value) = rx.recv().await {
    sum += value;
  }
  producer.join().unwrap();
  assert_eq!(sum, (0..ITEMS_MEDIUM).sum());
}

#[tokio::test]
async fn async_producer_feeds_sync_consumer() {
  let (tx, rx) = bounded::bounded_async::<usize>(2);
  let rx = rx.to_sync();

  let consumer = std::thread::spawn(move || rx.iter().count());
  for i in 0..ITEMS_LOW {
    tx.send(i).await.unwrap();
  }
  drop(tx);

  let received = tokio::task::spawn_blocking(move || consumer.join().unwrap())
    .await
    .unwrap();
  assert_eq!(received, ITEMS_LOW);
}
