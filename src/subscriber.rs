use crate::{
  delivery::Delivery,
  observer::{BoxedObserver, Observer},
  subscription::{SharedSubscription, Subscription, SubscriptionState},
};

/// Pairs an observer with the subscription that owns it and enforces the
/// observer contract on top of any observer implementation:
///
/// * the first `error`/`complete` moves the subscription to
///   [`SubscriptionState::Terminated`]; every later signal is dropped;
/// * once the subscription is disposed nothing reaches the observer anymore;
/// * signals coming from several threads, or emitted again from inside an
///   observer callback, are delivered one at a time in the order they were
///   emitted. An emitting thread never waits for another thread's callback.
///
/// Clones share the observer and the subscription.
pub struct Subscriber<O> {
  delivery: Delivery<O>,
  subscription: SharedSubscription,
}

impl<O> Clone for Subscriber<O> {
  fn clone(&self) -> Self {
    Subscriber {
      delivery: self.delivery.clone(),
      subscription: self.subscription.clone(),
    }
  }
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self {
    Subscriber {
      delivery: Delivery::new(observer),
      subscription: SharedSubscription::default(),
    }
  }

  #[inline]
  pub fn subscription(&self) -> &SharedSubscription { &self.subscription }

  #[inline]
  pub fn state(&self) -> SubscriptionState { self.subscription.state() }

  pub(crate) fn emit_next<Item, Err>(&self, value: Item)
  where
    O: Observer<Item, Err>,
    Item: Send + 'static,
  {
    if self.subscription.is_closed() {
      return;
    }
    let subscription = self.subscription.clone();
    self.delivery.submit(move |observer: &mut Option<O>| {
      // a value queued before a terminal signal still goes out, one queued
      // before a dispose does not
      if subscription.state() == SubscriptionState::Disposed {
        return;
      }
      if let Some(observer) = observer {
        Observer::<Item, Err>::next(observer, value);
      }
    });
  }

  pub(crate) fn emit_error<Item, Err>(&self, err: Err)
  where
    O: Observer<Item, Err>,
    Err: Send + 'static,
  {
    if let Some(released) = self.subscription.terminate() {
      self.delivery.submit(move |observer: &mut Option<O>| {
        if let Some(mut observer) = observer.take() {
          Observer::<Item, Err>::error(&mut observer, err);
        }
        drop(released);
      });
    }
  }

  pub(crate) fn emit_complete<Item, Err>(&self)
  where
    O: Observer<Item, Err>,
  {
    if let Some(released) = self.subscription.terminate() {
      self.delivery.submit(move |observer: &mut Option<O>| {
        if let Some(mut observer) = observer.take() {
          Observer::<Item, Err>::complete(&mut observer);
        }
        drop(released);
      });
    }
  }

  /// Never waits for a running callback: while one is in progress the
  /// observer is only asked on the next call.
  pub(crate) fn stopped<Item, Err>(&self) -> bool
  where
    O: Observer<Item, Err>,
  {
    self.subscription.is_closed()
      || self
        .delivery
        .peek(|observer| {
          observer
            .as_ref()
            .map_or(true, Observer::<Item, Err>::is_finished)
        })
        .unwrap_or(false)
  }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
  Item: Send + 'static,
  Err: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.emit_next::<Item, Err>(value) }

  #[inline]
  fn error(&mut self, err: Err) { self.emit_error::<Item, Err>(err) }

  #[inline]
  fn complete(&mut self) { self.emit_complete::<Item, Err>() }

  #[inline]
  fn is_finished(&self) -> bool { self.stopped::<Item, Err>() }
}

impl<O> Subscription for Subscriber<O> {
  #[inline]
  fn unsubscribe(&self) { self.subscription.unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.subscription.is_closed() }
}

/// Handle given to a producer of [`create`](crate::observable::create) to
/// push signals into its subscriber.
///
/// The emitter is `Send` and cheap to clone, so a producer may hand it to a
/// worker thread and return immediately. Producers of long or unbounded
/// sequences must poll [`is_stopped`](Emitter::is_stopped) between items.
pub struct Emitter<Item, Err>(Subscriber<BoxedObserver<Item, Err>>);

impl<Item, Err> Emitter<Item, Err> {
  pub(crate) fn new(observer: BoxedObserver<Item, Err>) -> Self {
    Emitter(Subscriber::new(observer))
  }

  /// `true` once no further signal will be delivered: the subscription was
  /// terminated or disposed, or the downstream observer gave up. Does not
  /// wait for a value that is being delivered on another thread.
  #[inline]
  pub fn is_stopped(&self) -> bool { self.0.stopped::<Item, Err>() }

  /// State of this emitter's own subscription.
  ///
  /// This can still read `Active` while [`is_stopped`](Emitter::is_stopped)
  /// is already `true`: an operator further down that failed releases this
  /// subscription only after the producer call that subscribed it returned.
  /// Producers deciding whether to keep emitting should ask `is_stopped`.
  #[inline]
  pub fn state(&self) -> SubscriptionState { self.0.state() }

  #[inline]
  pub fn subscription(&self) -> &SharedSubscription { self.0.subscription() }
}

impl<Item, Err> Emitter<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  #[inline]
  pub fn next(&self, value: Item) { self.0.emit_next::<Item, Err>(value) }

  #[inline]
  pub fn error(&self, err: Err) { self.0.emit_error::<Item, Err>(err) }

  #[inline]
  pub fn complete(&self) { self.0.emit_complete::<Item, Err>() }
}

impl<Item, Err> Clone for Emitter<Item, Err> {
  fn clone(&self) -> Self { Emitter(self.0.clone()) }
}

impl<Item, Err> Observer<Item, Err> for Emitter<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { Emitter::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { Emitter::error(self, err) }

  #[inline]
  fn complete(&mut self) { Emitter::complete(self) }

  #[inline]
  fn is_finished(&self) -> bool { self.is_stopped() }
}
