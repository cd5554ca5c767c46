use crate::runtime::ReactiveRuntime;
use crate::signal::Signal;
use crate::store::{Readable, Subscription};

/// A writable store for managing application state.
///
/// Stores provide a higher-level abstraction over signals: the whole value
/// is replaced or edited in place, and every subscriber sees the new value
/// before the write returns.
pub struct Store<T> {
    signal: Signal<T>,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(runtime: &ReactiveRuntime, initial: T) -> Self {
        Self {
            signal: Signal::new(runtime, initial),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        self.signal.get()
    }

    /// Read state through a closure without cloning it.
    ///
    /// Inside a derived computation or subscription this registers a
    /// dependency, same as [`Store::get`].
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.signal.with(f)
    }

    /// Set a new state value.
    pub fn set(&self, new_state: T) {
        self.signal.set(new_state);
    }

    /// Update the state using a function.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.signal.update(f);
    }

    /// Subscribe to state changes.
    ///
    /// The callback is called once with the current state, then after
    /// every write until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Subscription::new(self.signal.watch(move |state| callback(&state)))
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<T> for Store<T> {
    fn get(&self) -> T {
        Store::get(self)
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Store::subscribe(self, callback)
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct AppState {
        count: usize,
        name: String,
    }

    fn initial() -> AppState {
        AppState {
            count: 0,
            name: "test".to_string(),
        }
    }

    #[test]
    fn store_get_set() {
        let runtime = ReactiveRuntime::new();
        let store = Store::new(&runtime, initial());

        assert_eq!(store.get().count, 0);

        store.set(AppState {
            count: 42,
            name: "updated".to_string(),
        });

        assert_eq!(store.get().count, 42);
        assert_eq!(store.get().name, "updated");
    }

    #[test]
    fn store_update() {
        let runtime = ReactiveRuntime::new();
        let store = Store::new(&runtime, initial());

        store.update(|state| {
            state.count += 10;
        });

        assert_eq!(store.read(|state| state.count), 10);
    }

    #[test]
    fn store_subscribe() {
        let runtime = ReactiveRuntime::new();
        let store = Store::new(&runtime, initial());

        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let _subscription = store.subscribe(move |_state| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Called once on subscribe with the current state
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        store.update(|state| state.count += 1);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);

        store.update(|state| state.count += 1);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn subscriber_may_write_back() {
        let runtime = ReactiveRuntime::new();
        let store = Store::new(&runtime, 0);
        let mirror = Store::new(&runtime, 0);

        let _subscription = store.subscribe({
            let mirror = mirror.clone();
            move |value| mirror.set(*value * 2)
        });

        store.set(21);
        assert_eq!(mirror.get(), 42);
    }

    #[test]
    fn subscription_outliving_its_captures_drops_cleanly() {
        let runtime = ReactiveRuntime::new();
        let store = Store::new(&runtime, 0);
        let mirror = Store::new(&runtime, 0);

        let subscription = store.subscribe({
            let mirror = mirror.clone();
            move |value| mirror.set(*value)
        });

        // The closure now owns the last handle to `mirror`
        drop(mirror);
        drop(subscription);
        assert_eq!(runtime.observer_count(), 0);

        store.set(1);
        assert_eq!(store.get(), 1);
    }
}
