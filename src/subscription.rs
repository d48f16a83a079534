use crate::rc::MutArc;
use futures::{channel::oneshot, FutureExt};
use smallvec::SmallVec;
use std::{
  any::Any,
  fmt::{Debug, Formatter},
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

/// Lifecycle of one subscription.
///
/// `Active` moves to `Terminated` on the first `complete`/`error`, or to
/// `Disposed` on an external `unsubscribe`. Both closed states are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
  Active,
  Terminated,
  Disposed,
}

impl SubscriptionState {
  #[inline]
  pub fn is_closed(self) -> bool { self != SubscriptionState::Active }
}

/// Subscription returns from `Observable::actual_subscribe` to allow
/// cancelling an execution before it finishes on its own.
pub trait Subscription {
  /// Requests cancellation. Idempotent, callable from any thread or from
  /// inside an observer callback.
  fn unsubscribe(&self);

  fn is_closed(&self) -> bool;

  /// Activates "RAII" behavior for this subscription: `unsubscribe()` runs
  /// as soon as the returned guard goes out of scope.
  ///
  /// **Attention:** if the guard is not bound to a variable, `unsubscribe()`
  /// is called immediately.
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard(self)
  }
}

/// Observables that finish during `actual_subscribe` have nothing left to
/// cancel.
impl Subscription for () {
  #[inline]
  fn unsubscribe(&self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: ?Sized + Subscription> Subscription for Box<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

type TearDown = SmallVec<[Box<dyn Subscription + Send>; 1]>;
type Waiters = SmallVec<[oneshot::Sender<SubscriptionState>; 1]>;

struct Inner {
  state: SubscriptionState,
  /// The closed state is final and every `closed()` waiter was notified.
  settled: bool,
  teardown: TearDown,
  waiters: Waiters,
}

impl Default for Inner {
  fn default() -> Self {
    Inner {
      state: SubscriptionState::Active,
      settled: false,
      teardown: SmallVec::new(),
      waiters: SmallVec::new(),
    }
  }
}

/// Thread-safe subscription handle with a tri-state lifecycle and a list of
/// nested subscriptions that are released together with it.
///
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct SharedSubscription(MutArc<Inner>);

impl SharedSubscription {
  pub fn state(&self) -> SubscriptionState { self.0.rc_deref_mut().state }

  /// Registers a nested subscription to be released with this one. If this
  /// subscription is already closed, `subscription` is disposed right away.
  pub fn add<S: Subscription + Send + 'static>(&self, subscription: S) {
    if self.is_same(&subscription) || subscription.is_closed() {
      return;
    }
    let mut inner = self.0.rc_deref_mut();
    if inner.state.is_closed() {
      drop(inner);
      subscription.unsubscribe();
    } else {
      inner.teardown.retain(|v| !v.is_closed());
      inner.teardown.push(Box::new(subscription));
    }
  }

  /// Moves `Active -> Terminated`. Returns the nested subscriptions to
  /// release once the terminal signal has been delivered, or `None` if the
  /// subscription was already closed.
  pub(crate) fn terminate(&self) -> Option<Released> {
    self
      .close(SubscriptionState::Terminated)
      .map(|teardown| Released { teardown, subscription: self.clone() })
  }

  /// Returns a future resolving with the closed state once this
  /// subscription is disposed, or once its terminal signal was delivered
  /// and the nested subscriptions were released.
  ///
  /// Resolves with `Active` if every handle is dropped while the
  /// subscription is still open, since then nothing can close it anymore.
  ///
  /// ```
  /// use rxpush::prelude::*;
  /// use std::{convert::Infallible, thread};
  ///
  /// let subscription =
  ///   observable::create(|emitter: Emitter<i32, Infallible>| {
  ///     thread::spawn(move || {
  ///       (0..3).for_each(|v| emitter.next(v));
  ///       emitter.complete();
  ///     });
  ///   })
  ///   .subscribe(|v| println!("{v}"));
  ///
  /// let state = futures::executor::block_on(subscription.closed());
  /// assert_eq!(state, SubscriptionState::Terminated);
  /// ```
  pub fn closed(&self) -> Closed {
    let mut inner = self.0.rc_deref_mut();
    if inner.settled {
      return Closed(Waiting::Ready(inner.state));
    }
    let (tx, rx) = oneshot::channel();
    inner.waiters.retain(|w| !w.is_canceled());
    inner.waiters.push(tx);
    Closed(Waiting::Pending(rx))
  }

  #[cfg(test)]
  pub(crate) fn teardown_size(&self) -> usize {
    self.0.rc_deref_mut().teardown.len()
  }

  fn close(&self, to: SubscriptionState) -> Option<TearDown> {
    let mut inner = self.0.rc_deref_mut();
    if inner.state.is_closed() {
      None
    } else {
      inner.state = to;
      Some(std::mem::take(&mut inner.teardown))
    }
  }

  fn settle(&self) {
    let (state, waiters) = {
      let mut inner = self.0.rc_deref_mut();
      inner.settled = true;
      (inner.state, std::mem::take(&mut inner.waiters))
    };
    waiters.into_iter().for_each(|w| {
      let _ = w.send(state);
    });
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    other
      .downcast_ref::<Self>()
      .is_some_and(|other| self.0.ptr_eq(&other.0))
  }
}

impl Subscription for SharedSubscription {
  fn unsubscribe(&self) {
    if let Some(teardown) = self.close(SubscriptionState::Disposed) {
      log::trace!(
        "subscription disposed, releasing {} nested subscription(s)",
        teardown.len()
      );
      teardown.iter().for_each(|s| s.unsubscribe());
      self.settle();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.state().is_closed() }
}

impl Debug for SharedSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.rc_deref_mut();
    f.debug_struct("SharedSubscription")
      .field("state", &inner.state)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

/// Nested subscriptions detached by a terminal transition. They are
/// released when this value is dropped, i.e. after the terminal signal went
/// downstream, and `closed()` waiters are woken after that.
#[must_use]
pub(crate) struct Released {
  teardown: TearDown,
  subscription: SharedSubscription,
}

impl Drop for Released {
  fn drop(&mut self) {
    if !self.teardown.is_empty() {
      log::trace!(
        "terminal signal delivered, releasing {} nested subscription(s)",
        self.teardown.len()
      );
    }
    self.teardown.iter().for_each(|s| s.unsubscribe());
    self.subscription.settle();
  }
}

enum Waiting {
  Ready(SubscriptionState),
  Pending(oneshot::Receiver<SubscriptionState>),
}

/// Future returned by [`SharedSubscription::closed`].
#[must_use = "futures do nothing unless polled"]
pub struct Closed(Waiting);

impl Future for Closed {
  type Output = SubscriptionState;

  fn poll(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Self::Output> {
    match &mut self.0 {
      Waiting::Ready(state) => Poll::Ready(*state),
      Waiting::Pending(rx) => rx
        .poll_unpin(cx)
        .map(|state| state.unwrap_or(SubscriptionState::Active)),
    }
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(pub(crate) T);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> {
    SubscriptionGuard(subscription)
  }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}
