//! # rxpush: push-based reactive streams
//!
//! A small, thread-safe implementation of the push side of
//! [Reactive Extensions](http://reactivex.io/): sources push values into
//! observers, operators transform the pushed values, and every subscription
//! can be cancelled from any thread.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxpush::prelude::*;
//! use std::convert::Infallible;
//!
//! observable::just::<_, Infallible>(vec![2, 3, 5, 7, 11, 13])
//!   .flat_map(
//!     |primes| {
//!       observable::create(move |emitter: Emitter<i32, Infallible>| {
//!         primes.iter().for_each(|p| emitter.next(*p));
//!         emitter.complete();
//!       })
//!     },
//!     1,
//!   )
//!   .unwrap()
//!   .last()
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Consumes an observer and starts one execution |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Emitter`] | Handle a `create` producer pushes events through |
//!
//! Every execution delivers at most one terminal event, and nothing after
//! it. Cancelling a subscription silences its observer without delivering
//! a terminal event.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Emitter`]: subscriber::Emitter

mod delivery;
pub mod error;
pub mod handlers;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod subscriber;
pub mod subscription;
pub mod type_hint;

pub use error::{Error, Result};
pub use prelude::*;
