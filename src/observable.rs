//! Observable traits and the built-in sources.

use crate::{
  error::{Error, Result},
  handlers::{Handlers, Noop},
  observer::Observer,
  ops::{flat_map::FlatMapOp, last::LastOp},
  subscriber::Subscriber,
  subscription::{SharedSubscription, Subscription},
};

mod create;
pub use create::*;
mod just;
pub use just::*;

/// A representation of any set of values over any amount of time.
///
/// An observable is an inert description: nothing runs until
/// `actual_subscribe` is called. Subscribing consumes the value, so
/// subscribing twice means cloning first; every subscription is an
/// independent execution.
pub trait Observable<Item, Err, O> {
  type Unsub: Subscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// Operators and subscribe helpers available on every observable.
pub trait ObservableExt<Item, Err>: Sized {
  /// Maps every value to an inner observable and merges the emissions of at
  /// most `concurrent` inner observables at a time. Values arriving while
  /// the limit is reached wait in FIFO order and are mapped only when a slot
  /// frees up.
  ///
  /// An error from the source or from any inner observable is forwarded at
  /// once and cancels every other inner observable. The result completes
  /// after the source and every inner observable completed.
  ///
  /// Fails with [`Error::InvalidConcurrency`] if `concurrent` is zero.
  ///
  /// ```
  /// use rxpush::prelude::*;
  /// use std::{convert::Infallible, sync::{Arc, Mutex}};
  ///
  /// let values = Arc::new(Mutex::new(vec![]));
  /// let c_values = values.clone();
  /// observable::just::<_, Infallible>(vec![1, 2, 3])
  ///   .flat_map(
  ///     |batch| {
  ///       observable::create(move |emitter: Emitter<i32, Infallible>| {
  ///         batch.iter().for_each(|v| emitter.next(*v * 10));
  ///         emitter.complete();
  ///       })
  ///     },
  ///     1,
  ///   )
  ///   .unwrap()
  ///   .subscribe(move |v: i32| c_values.lock().unwrap().push(v));
  ///
  /// assert_eq!(*values.lock().unwrap(), vec![10, 20, 30]);
  /// ```
  fn flat_map<F, Inner>(
    self,
    func: F,
    concurrent: usize,
  ) -> Result<FlatMapOp<Self, F, Item>>
  where
    F: Fn(Item) -> Inner,
  {
    if concurrent == 0 {
      return Err(Error::InvalidConcurrency(concurrent));
    }
    Ok(FlatMapOp::new(self, func, concurrent))
  }

  /// Emits only the last value of the source, once the source completes.
  /// An empty source completes without emitting.
  #[inline]
  fn last(self) -> LastOp<Self, Item> { LastOp::new(self) }

  /// Invokes an execution of the observable with a bare `next` callback.
  /// Errors and completion are ignored.
  fn subscribe<N>(self, next: N) -> SharedSubscription
  where
    N: FnMut(Item) + Send + 'static,
    Self: Observable<Item, Err, Subscriber<Handlers<N, Noop, Noop>>>,
    <Self as Observable<Item, Err, Subscriber<Handlers<N, Noop, Noop>>>>::Unsub:
      Send + 'static,
  {
    self.subscribe_with(Handlers::next_only(next))
  }

  /// Invokes an execution of the observable and registers observer handlers
  /// for all the notifications it will emit.
  ///
  /// * `error`: A handler for a terminal event resulting from an error.
  /// * `complete`: A handler for a terminal event resulting from successful
  ///   completion.
  fn subscribe_all<N, E, C>(
    self,
    next: N,
    error: E,
    complete: C,
  ) -> SharedSubscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(Err) + Send + 'static,
    C: FnMut() + Send + 'static,
    Self: Observable<Item, Err, Subscriber<Handlers<N, E, C>>>,
    <Self as Observable<Item, Err, Subscriber<Handlers<N, E, C>>>>::Unsub:
      Send + 'static,
  {
    self.subscribe_with(Handlers::new(next, error, complete))
  }

  /// Invokes an execution of the observable with a [`Handlers`] set built by
  /// [`handlers()`](crate::handlers::handlers). Missing callbacks are no-ops.
  ///
  /// The returned subscription cancels the whole execution, including every
  /// subscription the operator chain created underneath.
  fn subscribe_with<N, E, C>(
    self,
    handlers: Handlers<N, E, C>,
  ) -> SharedSubscription
  where
    Handlers<N, E, C>: Observer<Item, Err>,
    Self: Observable<Item, Err, Subscriber<Handlers<N, E, C>>>,
    <Self as Observable<Item, Err, Subscriber<Handlers<N, E, C>>>>::Unsub:
      Send + 'static,
  {
    let subscriber = Subscriber::new(handlers);
    let subscription = subscriber.subscription().clone();
    let unsub = self.actual_subscribe(subscriber);
    subscription.add(unsub);
    subscription
  }
}
