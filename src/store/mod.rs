//! High-level state management with stores.
//!
//! Stores provide a convenient abstraction for managing application state
//! with automatic reactivity. A [`Store`] is writable; a [`Derived`] view is
//! recomputed from other stores and is read-only. Both implement
//! [`Readable`] so UI code can consume either one.

mod derived;
mod store;

pub use derived::Derived;
pub use store::Store;

use crate::signal::Effect;

/// Read and subscribe access shared by writable stores and derived views.
pub trait Readable<T> {
    /// Current value.
    fn get(&self) -> T;

    /// Call `callback` with the current value now and after every change.
    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static;
}

/// Handle for an active subscription; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _effect: Effect,
}

impl Subscription {
    pub(crate) fn new(effect: Effect) -> Self {
        Self { _effect: effect }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Subscription")
    }
}
