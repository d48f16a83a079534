use crate::{
  delivery::Delivery,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  subscription::{SharedSubscription, Subscription},
  type_hint::TypeHint,
};
use std::{collections::VecDeque, sync::Arc};

pub struct FlatMapOp<S, F, Item> {
  source: S,
  func: F,
  concurrent: usize,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> FlatMapOp<S, F, Item> {
  /// `concurrent` is checked by `ObservableExt::flat_map`.
  #[inline]
  pub(crate) fn new(source: S, func: F, concurrent: usize) -> Self {
    FlatMapOp { source, func, concurrent, _hint: TypeHint::new() }
  }
}

impl<S: Clone, F: Clone, Item> Clone for FlatMapOp<S, F, Item> {
  fn clone(&self) -> Self {
    FlatMapOp::new(self.source.clone(), self.func.clone(), self.concurrent)
  }
}

impl<S, F, Item, Inner, R, Err, O> Observable<R, Err, O>
  for FlatMapOp<S, F, Item>
where
  O: Observer<R, Err> + Send + 'static,
  S: Observable<Item, Err, FlatMapOuterObserver<O, Item, R>>,
  <S as Observable<Item, Err, FlatMapOuterObserver<O, Item, R>>>::Unsub:
    Send + 'static,
  F: Fn(Item) -> Inner + Send + Sync + 'static,
  Inner: Observable<R, Err, FlatMapInnerObserver<O, Item>>,
  <Inner as Observable<R, Err, FlatMapInnerObserver<O, Item>>>::Unsub:
    Send + 'static,
  Item: Send + 'static,
  R: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let func = self.func;
    let launch: Launch<O, Item> =
      Arc::new(move |core: &FlatMapCore<O, Item>, value: Item| {
        let inner = func(value);
        let unsub = inner.actual_subscribe(FlatMapInnerObserver {
          core: core.clone(),
          done: false,
        });
        core.subscription.add(unsub);
      });
    let core = FlatMapCore {
      downstream: Delivery::new(observer),
      state: MutArc::own(FlatMapState::default()),
      launch,
      concurrent: self.concurrent,
      subscription: SharedSubscription::default(),
    };
    let subscription = core.subscription.clone();
    let unsub = self
      .source
      .actual_subscribe(FlatMapOuterObserver { core, _hint: TypeHint::new() });
    subscription.add(unsub);
    subscription
  }
}

impl<S, F, Item, Inner, R, Err> ObservableExt<R, Err> for FlatMapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: Fn(Item) -> Inner,
  Inner: ObservableExt<R, Err>,
{
}

/// Maps a value and subscribes to the resulting inner observable.
type Launch<O, Item> =
  Arc<dyn Fn(&FlatMapCore<O, Item>, Item) + Send + Sync>;

struct FlatMapState<Item> {
  /// Values waiting for a free slot, not mapped yet.
  pending: VecDeque<Item>,
  active: usize,
  /// Some thread is launching queued values in a loop. Unless it is set,
  /// `pending` is empty or every slot is taken.
  draining: bool,
  outer_completed: bool,
  /// Set once the downstream observer got its terminal signal.
  done: bool,
}

impl<Item> Default for FlatMapState<Item> {
  fn default() -> Self {
    FlatMapState {
      pending: VecDeque::new(),
      active: 0,
      draining: false,
      outer_completed: false,
      done: false,
    }
  }
}

impl<Item> FlatMapState<Item> {
  fn is_drained(&self) -> bool {
    self.outer_completed && self.active == 0 && self.pending.is_empty()
  }
}

enum InnerStep<Item> {
  /// The caller became the drainer and launches this value first.
  Drain(Item),
  Complete,
  Idle,
}

/// State shared by the source observer and every inner observer of one
/// `flat_map` subscription.
///
/// No lock is held while subscribing to an inner observable or while the
/// downstream observer runs.
struct FlatMapCore<O, Item> {
  downstream: Delivery<O>,
  state: MutArc<FlatMapState<Item>>,
  launch: Launch<O, Item>,
  concurrent: usize,
  /// Holds the source subscription and one entry per running inner stream.
  subscription: SharedSubscription,
}

impl<O, Item> Clone for FlatMapCore<O, Item> {
  fn clone(&self) -> Self {
    FlatMapCore {
      downstream: self.downstream.clone(),
      state: self.state.clone(),
      launch: self.launch.clone(),
      concurrent: self.concurrent,
      subscription: self.subscription.clone(),
    }
  }
}

impl<O, Item> FlatMapCore<O, Item> {
  #[inline]
  fn launch(&self, value: Item) { (*self.launch)(self, value) }

  /// Takes a slot for `value`, or queues it when every slot is busy or
  /// older values are still waiting.
  fn admit(&self, value: Item) -> Option<Item> {
    let mut state = self.state.rc_deref_mut();
    if state.done || state.outer_completed || self.subscription.is_closed() {
      return None;
    }
    if state.active < self.concurrent && state.pending.is_empty() {
      state.active += 1;
      Some(value)
    } else {
      state.pending.push_back(value);
      log::trace!(
        "flat_map: {} inner stream(s) active, {} value(s) queued",
        state.active,
        state.pending.len()
      );
      None
    }
  }

  /// Releases the slot of a completed inner stream. If values are queued
  /// and nobody is launching them yet, the caller takes that job.
  fn inner_completed(&self) -> InnerStep<Item> {
    let mut state = self.state.rc_deref_mut();
    if state.done {
      return InnerStep::Idle;
    }
    state.active -= 1;
    if self.subscription.is_closed() {
      state.pending.clear();
    }
    if state.is_drained() {
      state.done = true;
      return InnerStep::Complete;
    }
    if state.draining {
      return InnerStep::Idle;
    }
    match state.pending.pop_front() {
      Some(value) => {
        state.active += 1;
        state.draining = true;
        InnerStep::Drain(value)
      }
      None => InnerStep::Idle,
    }
  }

  /// Launches `first`, then every queued value a free slot allows. Inner
  /// streams completing synchronously during a launch only free their slot,
  /// so the stack stays flat however long the queue is.
  fn drain(&self, first: Item) {
    let mut next = Some(first);
    while let Some(value) = next {
      self.launch(value);
      next = self.next_queued();
    }
  }

  fn next_queued(&self) -> Option<Item> {
    let mut state = self.state.rc_deref_mut();
    if self.subscription.is_closed() {
      state.pending.clear();
    } else if !state.done && state.active < self.concurrent {
      if let Some(value) = state.pending.pop_front() {
        state.active += 1;
        return Some(value);
      }
    }
    state.draining = false;
    None
  }

  fn outer_completed(&self) -> bool {
    let mut state = self.state.rc_deref_mut();
    if state.done || state.outer_completed {
      return false;
    }
    state.outer_completed = true;
    if state.is_drained() {
      state.done = true;
      true
    } else {
      false
    }
  }

  fn next<R, Err>(&self, value: R)
  where
    O: Observer<R, Err>,
    R: Send + 'static,
  {
    if self.is_finished() {
      return;
    }
    let subscription = self.subscription.clone();
    self.downstream.submit(move |observer: &mut Option<O>| {
      if subscription.is_closed() {
        return;
      }
      if let Some(observer) = observer {
        Observer::<R, Err>::next(observer, value);
      }
    });
  }

  /// Forwards `err` and cancels the source, every running inner stream and
  /// the queued values.
  fn fail<R, Err>(&self, err: Err)
  where
    O: Observer<R, Err>,
    Err: Send + 'static,
  {
    let active = {
      let mut state = self.state.rc_deref_mut();
      if state.done {
        return;
      }
      state.done = true;
      state.pending.clear();
      state.active
    };
    log::debug!(
      "flat_map: stream failed, cancelling the source and {} active inner \
       stream(s)",
      active
    );
    self.downstream.submit(move |observer: &mut Option<O>| {
      if let Some(mut observer) = observer.take() {
        Observer::<R, Err>::error(&mut observer, err);
      }
    });
    self.subscription.unsubscribe();
  }

  fn complete<R, Err>(&self)
  where
    O: Observer<R, Err>,
  {
    self.downstream.submit(move |observer: &mut Option<O>| {
      if let Some(mut observer) = observer.take() {
        Observer::<R, Err>::complete(&mut observer);
      }
    });
  }

  fn is_finished(&self) -> bool {
    self.state.rc_deref_mut().done || self.subscription.is_closed()
  }
}

/// Observer `flat_map` subscribes to its source with.
pub struct FlatMapOuterObserver<O, Item, R> {
  core: FlatMapCore<O, Item>,
  _hint: TypeHint<R>,
}

impl<O, Item, R, Err> Observer<Item, Err> for FlatMapOuterObserver<O, Item, R>
where
  O: Observer<R, Err>,
  Err: Send + 'static,
{
  fn next(&mut self, value: Item) {
    if let Some(value) = self.core.admit(value) {
      self.core.launch(value);
    }
  }

  fn error(&mut self, err: Err) { self.core.fail::<R, Err>(err) }

  fn complete(&mut self) {
    if self.core.outer_completed() {
      self.core.complete::<R, Err>();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.core.is_finished() }
}

/// Observer `flat_map` subscribes to every inner observable with.
pub struct FlatMapInnerObserver<O, Item> {
  core: FlatMapCore<O, Item>,
  done: bool,
}

impl<O, Item, R, Err> Observer<R, Err> for FlatMapInnerObserver<O, Item>
where
  O: Observer<R, Err>,
  R: Send + 'static,
  Err: Send + 'static,
{
  fn next(&mut self, value: R) {
    if !self.done {
      self.core.next::<R, Err>(value);
    }
  }

  fn error(&mut self, err: Err) {
    if !self.done {
      self.done = true;
      self.core.fail::<R, Err>(err);
    }
  }

  fn complete(&mut self) {
    if self.done {
      return;
    }
    self.done = true;
    match self.core.inner_completed() {
      InnerStep::Drain(value) => self.core.drain(value),
      InnerStep::Complete => self.core.complete::<R, Err>(),
      InnerStep::Idle => {}
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.done || self.core.is_finished() }
}
