use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Emitter,
  subscription::SharedSubscription,
  type_hint::TypeHint,
};
use std::sync::Arc;

/// Creates an observable from a producer function.
///
/// The producer runs once per subscription and receives an [`Emitter`]
/// bound to that subscription. It must eventually call `complete` or `error`
/// unless the subscription is disposed first, and it should check
/// [`Emitter::is_stopped`] between items when producing long sequences. The
/// producer may also move the emitter to another thread and return at once;
/// subscribing never waits for the producer to finish.
///
/// ```
/// use rxpush::prelude::*;
/// use std::convert::Infallible;
///
/// observable::create(|emitter: Emitter<i32, Infallible>| {
///   for v in 0..3 {
///     if emitter.is_stopped() {
///       return;
///     }
///     emitter.next(v);
///   }
///   emitter.complete();
/// })
/// .subscribe(|v| println!("{v}"));
/// ```
pub fn create<F, Item, Err>(producer: F) -> ObservableCreate<F, Item, Err>
where
  F: Fn(Emitter<Item, Err>),
{
  ObservableCreate { producer: Arc::new(producer), _hint: TypeHint::new() }
}

pub struct ObservableCreate<F, Item, Err> {
  producer: Arc<F>,
  _hint: TypeHint<(Item, Err)>,
}

impl<F, Item, Err> Clone for ObservableCreate<F, Item, Err> {
  fn clone(&self) -> Self {
    ObservableCreate { producer: self.producer.clone(), _hint: TypeHint::new() }
  }
}

impl<F, Item, Err, O> Observable<Item, Err, O> for ObservableCreate<F, Item, Err>
where
  F: Fn(Emitter<Item, Err>),
  O: Observer<Item, Err> + Send + 'static,
  Item: 'static,
  Err: 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let emitter = Emitter::new(Box::new(observer));
    let subscription = emitter.subscription().clone();
    (self.producer)(emitter);
    subscription
  }
}

impl<F, Item, Err> ObservableExt<Item, Err> for ObservableCreate<F, Item, Err> where
  F: Fn(Emitter<Item, Err>)
{
}
