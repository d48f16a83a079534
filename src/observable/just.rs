use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Creates an observable that emits `value` once and then completes, all
/// during the subscribe call.
///
/// `just` never fails, but it carries an `Err` parameter so it can feed
/// operators whose other inputs do.
///
/// ```
/// use rxpush::prelude::*;
/// use std::convert::Infallible;
///
/// observable::just::<_, Infallible>(123).subscribe(|v| println!("{v}"));
/// ```
pub fn just<Item, Err>(value: Item) -> ObservableJust<Item, Err> {
  ObservableJust(value, TypeHint::new())
}

pub struct ObservableJust<Item, Err>(Item, TypeHint<Err>);

impl<Item: Clone, Err> Clone for ObservableJust<Item, Err> {
  fn clone(&self) -> Self { ObservableJust(self.0.clone(), TypeHint::new()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for ObservableJust<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    if !observer.is_finished() {
      observer.next(self.0);
      observer.complete();
    }
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ObservableJust<Item, Err> {}
