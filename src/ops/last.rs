use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

pub struct LastOp<S, Item> {
  pub(crate) source: S,
  _hint: TypeHint<Item>,
}

impl<S: Clone, Item> Clone for LastOp<S, Item> {
  fn clone(&self) -> Self { LastOp::new(self.source.clone()) }
}

impl<S, Item> LastOp<S, Item> {
  #[inline]
  pub(crate) fn new(source: S) -> Self {
    LastOp { source, _hint: TypeHint::new() }
  }
}

impl<Item, S, Err, O> Observable<Item, Err, O> for LastOp<S, Item>
where
  S: Observable<Item, Err, LastObserver<O, Item>>,
  O: Observer<Item, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(LastObserver { observer, last: None })
  }
}

impl<Item, S, Err> ObservableExt<Item, Err> for LastOp<S, Item> where
  S: ObservableExt<Item, Err>
{
}

pub struct LastObserver<O, Item> {
  observer: O,
  last: Option<Item>,
}

impl<O, Item, Err> Observer<Item, Err> for LastObserver<O, Item>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.last = Some(value); }

  #[inline]
  fn error(&mut self, err: Err) {
    self.last = None;
    self.observer.error(err)
  }

  #[inline]
  fn complete(&mut self) {
    if let Some(v) = self.last.take() {
      self.observer.next(v)
    }
    self.observer.complete();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
