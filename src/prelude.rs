//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core traits and sources
pub use crate::observable;
pub use crate::observable::{
  Observable, ObservableCreate, ObservableExt, ObservableJust,
};
// Observer trait
pub use crate::observer::{BoxedObserver, Observer};
// Callback sets
pub use crate::handlers::{handlers, Handlers, Noop};
// Operators
pub use crate::ops::{flat_map::FlatMapOp, last::LastOp};
// Subscriber
pub use crate::subscriber::{Emitter, Subscriber};
// Subscription
pub use crate::subscription::{
  Closed, SharedSubscription, Subscription, SubscriptionGuard,
  SubscriptionState,
};
