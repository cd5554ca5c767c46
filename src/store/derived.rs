use crate::runtime::ReactiveRuntime;
use crate::signal::Memo;
use crate::store::{Readable, Subscription};

/// A read-only view computed from one or more stores.
///
/// The computation reruns whenever a store it read last time changes;
/// consumers cannot write to it.
pub struct Derived<T> {
    memo: Memo<T>,
}

impl<T: Clone + Send + Sync + 'static> Derived<T> {
    /// Create a derived view from a computation over other stores.
    pub fn new<F>(runtime: &ReactiveRuntime, compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            memo: Memo::new(runtime, compute),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.memo.get()
    }

    /// Read the current value without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.memo.with(f)
    }

    /// Subscribe to changes of the view; called immediately, then after
    /// every change of an input.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Subscription::new(self.memo.watch(move |value| callback(&value)))
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<T> for Derived<T> {
    fn get(&self) -> T {
        Derived::get(self)
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Derived::subscribe(self, callback)
    }
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            memo: self.memo.clone(),
        }
    }
}
