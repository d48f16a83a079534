//! Integration tests for rxpush
//!
//! Tests full pipelines, cancellation across operators, and producers
//! running on a thread pool.

use std::{
  collections::BTreeMap,
  convert::Infallible,
  sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc, Arc, Mutex,
  },
  thread,
  time::Duration,
};

use futures::executor::{block_on, ThreadPool};
use rxpush::prelude::*;

fn pool() -> ThreadPool { ThreadPool::builder().pool_size(4).create().unwrap() }

#[test]
fn last_prime_of_flattened_batch() {
  let result = Arc::new(Mutex::new(vec![]));
  let completed = Arc::new(AtomicUsize::new(0));
  let (c_result, c_completed) = (result.clone(), completed.clone());

  observable::just::<_, Infallible>(vec![2, 3, 5, 7, 11, 13])
    .flat_map(
      |primes| {
        observable::create(move |emitter: Emitter<i32, Infallible>| {
          for p in primes.iter() {
            if emitter.is_stopped() {
              return;
            }
            emitter.next(*p);
          }
          emitter.complete();
        })
      },
      1,
    )
    .unwrap()
    .last()
    .subscribe_with(
      handlers()
        .on_next(move |v| c_result.lock().unwrap().push(v))
        .on_complete(move || {
          c_completed.fetch_add(1, Ordering::SeqCst);
        }),
    );

  assert_eq!(*result.lock().unwrap(), vec![13]);
  assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[test]
fn nested_flat_map_keeps_order_with_single_slot() {
  let result = Arc::new(Mutex::new(vec![]));
  let c_result = result.clone();

  observable::create(|emitter: Emitter<i32, Infallible>| {
    (1..=3).for_each(|v| emitter.next(v));
    emitter.complete();
  })
  .flat_map(
    |v| {
      observable::just::<_, Infallible>(v)
        .flat_map(move |v| observable::just::<_, Infallible>(v * 10), 1)
        .unwrap()
    },
    1,
  )
  .unwrap()
  .subscribe(move |v| c_result.lock().unwrap().push(v));

  assert_eq!(*result.lock().unwrap(), vec![10, 20, 30]);
}

#[test]
fn thread_pool_producers_respect_concurrency() {
  let pool = pool();
  let concurrent = 3;
  let active = Arc::new(AtomicUsize::new(0));
  let max_active = Arc::new(AtomicUsize::new(0));
  let values = Arc::new(Mutex::new(vec![]));

  let (c_active, c_max_active, c_values) =
    (active.clone(), max_active.clone(), values.clone());
  let subscription = observable::create(|emitter: Emitter<u64, Infallible>| {
    (0..10).for_each(|v| emitter.next(v));
    emitter.complete();
  })
  .flat_map(
    move |v| {
      let pool = pool.clone();
      let active = c_active.clone();
      let max_active = c_max_active.clone();
      observable::create(move |emitter: Emitter<u64, Infallible>| {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        max_active.fetch_max(now, Ordering::SeqCst);
        let active = active.clone();
        pool.spawn_ok(async move {
          for i in 0..5 {
            emitter.next(v * 100 + i);
          }
          active.fetch_sub(1, Ordering::SeqCst);
          emitter.complete();
        });
      })
    },
    concurrent,
  )
  .unwrap()
  .subscribe(move |v| c_values.lock().unwrap().push(v));

  let state = block_on(subscription.closed());
  assert_eq!(state, SubscriptionState::Terminated);

  assert!(max_active.load(Ordering::SeqCst) <= concurrent);
  let values = values.lock().unwrap();
  assert_eq!(values.len(), 50);
  let mut by_inner: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
  values
    .iter()
    .for_each(|v| by_inner.entry(v / 100).or_default().push(v % 100));
  assert_eq!(by_inner.len(), 10);
  by_inner
    .values()
    .for_each(|seq| assert_eq!(*seq, vec![0, 1, 2, 3, 4]));
}

#[derive(Debug, PartialEq)]
enum Event {
  Next(u64),
  Error(&'static str),
  Complete,
}

#[test]
fn thread_pool_inner_error_is_terminal() {
  let pool = pool();
  let events = Arc::new(Mutex::new(vec![]));
  let (stopped_tx, stopped_rx) = mpsc::channel();
  let stopped_tx = Mutex::new(stopped_tx);
  let (on_next, on_error, on_complete) =
    (events.clone(), events.clone(), events.clone());

  let subscription = observable::create(|emitter: Emitter<u64, &'static str>| {
    (0..4).for_each(|v| emitter.next(v));
    emitter.complete();
  })
  .flat_map(
    move |v| {
      let pool = pool.clone();
      let stopped = stopped_tx.lock().unwrap().clone();
      observable::create(move |emitter: Emitter<u64, &'static str>| {
        let stopped = stopped.clone();
        pool.spawn_ok(async move {
          let mut i = 0;
          while !emitter.is_stopped() {
            if v == 2 && i == 2 {
              emitter.error("inner failed");
            } else {
              emitter.next(v * 1000 + i);
            }
            i += 1;
            thread::yield_now();
          }
          let _ = stopped.send(v);
        });
      })
    },
    4,
  )
  .unwrap()
  .subscribe_all(
    move |v| on_next.lock().unwrap().push(Event::Next(v)),
    move |e| on_error.lock().unwrap().push(Event::Error(e)),
    move || on_complete.lock().unwrap().push(Event::Complete),
  );

  assert_eq!(block_on(subscription.closed()), SubscriptionState::Terminated);
  // every producer notices the failure and stops emitting
  for _ in 0..4 {
    stopped_rx.recv_timeout(Duration::from_secs(10)).unwrap();
  }

  let events = events.lock().unwrap();
  let errors = events.iter().filter(|e| matches!(e, Event::Error(_))).count();
  assert_eq!(errors, 1);
  assert_eq!(events.last(), Some(&Event::Error("inner failed")));
  assert!(!events.contains(&Event::Complete));
}

#[test]
fn dispose_stops_thread_pool_producers() {
  let pool = pool();
  let started = Arc::new(AtomicUsize::new(0));
  let (stopped_tx, stopped_rx) = mpsc::channel();
  let stopped_tx = Mutex::new(stopped_tx);
  let delivered = Arc::new(AtomicUsize::new(0));
  let terminal = Arc::new(AtomicUsize::new(0));
  let (first_tx, first_rx) = mpsc::channel();
  let first_tx = Mutex::new(first_tx);
  let c_started = started.clone();
  let (c_delivered, c_err, c_complete) =
    (delivered.clone(), terminal.clone(), terminal.clone());

  let subscription = observable::just::<_, Infallible>(vec![1u64, 2, 3])
    .flat_map(
      move |batch| {
        let pool = pool.clone();
        let started = c_started.clone();
        let stopped = stopped_tx.lock().unwrap().clone();
        observable::create(move |emitter: Emitter<u64, Infallible>| {
          for v in batch.iter().copied() {
            let stopped = stopped.clone();
            let emitter = emitter.clone();
            started.fetch_add(1, Ordering::SeqCst);
            pool.spawn_ok(async move {
              while !emitter.is_stopped() {
                emitter.next(v);
                thread::yield_now();
              }
              let _ = stopped.send(v);
            });
          }
        })
      },
      1,
    )
    .unwrap()
    .subscribe_all(
      move |_| {
        if c_delivered.fetch_add(1, Ordering::SeqCst) == 0 {
          let _ = first_tx.lock().unwrap().send(());
        }
      },
      move |_| {
        c_err.fetch_add(1, Ordering::SeqCst);
      },
      move || {
        c_complete.fetch_add(1, Ordering::SeqCst);
      },
    );

  first_rx.recv_timeout(Duration::from_secs(10)).unwrap();
  subscription.unsubscribe();
  let at_dispose = delivered.load(Ordering::SeqCst);

  assert_eq!(block_on(subscription.closed()), SubscriptionState::Disposed);
  for _ in 0..started.load(Ordering::SeqCst) {
    stopped_rx.recv_timeout(Duration::from_secs(10)).unwrap();
  }
  assert_eq!(terminal.load(Ordering::SeqCst), 0);
  // each producer may have had one delivery in flight
  let in_flight = started.load(Ordering::SeqCst);
  assert!(delivered.load(Ordering::SeqCst) <= at_dispose + in_flight);
}

#[test]
fn guard_disposes_pipeline_on_drop() {
  let emitters = Arc::new(Mutex::new(vec![]));
  let delivered = Arc::new(AtomicUsize::new(0));
  let c_emitters = emitters.clone();
  let c_delivered = delivered.clone();

  {
    let _guard = observable::just::<_, Infallible>(1)
      .flat_map(
        move |_| {
          let emitters = c_emitters.clone();
          observable::create(move |emitter: Emitter<i32, Infallible>| {
            emitters.lock().unwrap().push(emitter)
          })
        },
        1,
      )
      .unwrap()
      .subscribe(move |_| {
        c_delivered.fetch_add(1, Ordering::SeqCst);
      })
      .unsubscribe_when_dropped();

    emitters.lock().unwrap()[0].next(1);
  }

  let emitter = emitters.lock().unwrap().pop().unwrap();
  assert!(emitter.is_stopped());
  emitter.next(2);
  assert_eq!(delivered.load(Ordering::SeqCst), 1);
}
