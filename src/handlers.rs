//! Adapter turning loose callbacks into an [`Observer`].
//!
//! Subscribers may hand over a bare `next` closure or any subset of
//! `next`/`error`/`complete`. Whatever is missing is filled with [`Noop`],
//! so every call site ends up with the same [`Handlers`] observer type.

use crate::observer::Observer;

/// Placeholder for a callback the subscriber did not provide. Accepts and
/// drops every signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct Noop;

pub trait NextHandler<Item> {
  fn on_next(&mut self, value: Item);
}

pub trait ErrorHandler<Err> {
  fn on_error(&mut self, err: Err);
}

pub trait CompleteHandler {
  fn on_complete(&mut self);
}

impl<Item, F: FnMut(Item)> NextHandler<Item> for F {
  #[inline(always)]
  fn on_next(&mut self, value: Item) { self(value) }
}

impl<Item> NextHandler<Item> for Noop {
  #[inline(always)]
  fn on_next(&mut self, _: Item) {}
}

impl<Err, F: FnMut(Err)> ErrorHandler<Err> for F {
  #[inline(always)]
  fn on_error(&mut self, err: Err) { self(err) }
}

impl<Err> ErrorHandler<Err> for Noop {
  #[inline(always)]
  fn on_error(&mut self, _: Err) {}
}

impl<F: FnMut()> CompleteHandler for F {
  #[inline(always)]
  fn on_complete(&mut self) { self() }
}

impl CompleteHandler for Noop {
  #[inline(always)]
  fn on_complete(&mut self) {}
}

/// Canonical observer built from user callbacks.
///
/// ```
/// use rxpush::prelude::*;
/// use std::convert::Infallible;
///
/// observable::just::<_, Infallible>(42)
///   .subscribe_with(
///     handlers()
///       .on_next(|v: i32| println!("got {v}"))
///       .on_complete(|| println!("done")),
///   );
/// ```
#[derive(Clone, Debug)]
pub struct Handlers<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

/// Starts a [`Handlers`] builder with every callback set to [`Noop`].
#[inline]
pub fn handlers() -> Handlers<Noop, Noop, Noop> {
  Handlers { next: Noop, error: Noop, complete: Noop }
}

impl<N, E, C> Handlers<N, E, C> {
  #[inline(always)]
  pub fn new(next: N, error: E, complete: C) -> Self {
    Handlers { next, error, complete }
  }

  pub fn on_next<N2>(self, next: N2) -> Handlers<N2, E, C> {
    Handlers { next, error: self.error, complete: self.complete }
  }

  pub fn on_error<E2>(self, error: E2) -> Handlers<N, E2, C> {
    Handlers { next: self.next, error, complete: self.complete }
  }

  pub fn on_complete<C2>(self, complete: C2) -> Handlers<N, E, C2> {
    Handlers { next: self.next, error: self.error, complete }
  }
}

impl<N> Handlers<N, Noop, Noop> {
  /// Handlers for a bare `next` callback.
  #[inline(always)]
  pub fn next_only(next: N) -> Self { handlers().on_next(next) }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for Handlers<N, E, C>
where
  N: NextHandler<Item>,
  E: ErrorHandler<Err>,
  C: CompleteHandler,
{
  #[inline(always)]
  fn next(&mut self, value: Item) { self.next.on_next(value) }

  #[inline(always)]
  fn error(&mut self, err: Err) { self.error.on_error(err) }

  #[inline(always)]
  fn complete(&mut self) { self.complete.on_complete() }

  #[inline(always)]
  fn is_finished(&self) -> bool { false }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn missing_members_are_noops() {
    let mut sum = 0;
    {
      let mut observer = handlers().on_next(|v: i32| sum += v);
      Observer::<i32, &str>::next(&mut observer, 1);
      Observer::<i32, &str>::next(&mut observer, 2);
      Observer::<i32, &str>::error(&mut observer, "ignored");
      Observer::<i32, &str>::complete(&mut observer);
    }
    assert_eq!(sum, 3);
  }

  #[test]
  fn all_members_are_called() {
    let mut next = 0;
    let mut errors = vec![];
    let mut completed = 0;
    {
      let mut observer = handlers()
        .on_error(|e: &'static str| errors.push(e))
        .on_complete(|| completed += 1)
        .on_next(|_: ()| next += 1);
      Observer::<(), &'static str>::next(&mut observer, ());
      Observer::<(), &'static str>::error(&mut observer, "boom");
      Observer::<(), &'static str>::complete(&mut observer);
    }
    assert_eq!(next, 1);
    assert_eq!(errors, vec!["boom"]);
    assert_eq!(completed, 1);
  }

  #[test]
  fn noop_handlers_never_finish() {
    let observer = handlers();
    assert!(!Observer::<(), ()>::is_finished(&observer));
  }
}
