use crate::runtime::{Node, NodeId, ReactiveRuntime};
use crate::signal::{Effect, Memo};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

/// A reactive signal that holds a value and notifies subscribers when changed.
///
/// Reading a signal inside a memo or effect registers a dependency; writing
/// it reruns every dependent effect before the write returns.
pub struct Signal<T> {
    value: Arc<RwLock<T>>,
    node: Arc<Node>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            node: Arc::clone(&self.node),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(runtime: &ReactiveRuntime, initial: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
            node: Arc::new(Node::new(runtime)),
        }
    }

    /// Get the current value of the signal.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Read the value with a function without cloning.
    ///
    /// The signal stays read-locked while `f` runs, so `f` must not write
    /// to this same signal.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        if let Some(runtime) = self.node.runtime() {
            runtime.track_read(self.node.id());
        }
        let value = self.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&value)
    }

    /// Set a new value for the signal.
    pub fn set(&self, new_value: T) {
        *self.write() = new_value;
        self.notify();
    }

    /// Update the value using a function.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut value = self.write();
            f(&mut value);
        }
        self.notify();
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Watch this signal for changes.
    ///
    /// The callback runs immediately with the current value and again after
    /// every write, until the returned guard is dropped.
    pub fn watch<F>(&self, callback: F) -> WatchGuard
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let signal = self.clone();
        Effect::attach(self.node.sibling(), move || callback(signal.get()))
    }

    /// Create a derived value by applying a function to this signal's value.
    pub fn map<U, F>(&self, f: F) -> Memo<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        Memo::attach(self.node.sibling(), move || source.with(&f))
    }

    fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.value.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        if let Some(runtime) = self.node.runtime() {
            runtime.notify(self.node.id());
        }
    }
}

/// RAII guard for signal watchers; dropping it stops the callback.
pub type WatchGuard = Effect;

/// Create a new signal.
pub fn create_signal<T>(runtime: &ReactiveRuntime, initial: T) -> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    Signal::new(runtime, initial)
}
