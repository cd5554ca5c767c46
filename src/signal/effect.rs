use crate::runtime::{Node, ReactiveRuntime};
use std::sync::Arc;

/// A side effect that runs when its dependencies change.
///
/// Effects automatically track signal reads and re-run when those signals change.
/// The effect runs immediately on creation to establish initial dependencies,
/// and is removed from the runtime when dropped.
///
/// # Examples
///
/// ```
/// use carpet_stores::runtime::ReactiveRuntime;
/// use carpet_stores::{Effect, Signal};
/// use std::sync::{Arc, atomic::{AtomicI32, Ordering}};
///
/// let runtime = ReactiveRuntime::new();
/// let signal = Signal::new(&runtime, 5);
/// let last_value = Arc::new(AtomicI32::new(0));
/// let last_value_clone = last_value.clone();
///
/// let _effect = Effect::new(&runtime, {
///     let signal = signal.clone();
///     move || {
///         last_value_clone.store(signal.get(), Ordering::SeqCst);
///     }
/// });
///
/// assert_eq!(last_value.load(Ordering::SeqCst), 5);
///
/// signal.set(10);
/// assert_eq!(last_value.load(Ordering::SeqCst), 10);
/// ```
#[must_use = "dropping an Effect unsubscribes it immediately"]
pub struct Effect {
    node: Node,
}

impl Effect {
    /// Create a new effect that runs when dependencies change.
    pub fn new<F>(runtime: &ReactiveRuntime, effect: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::attach(Node::new(runtime), effect)
    }

    pub(crate) fn attach<F>(node: Node, effect: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        match node.runtime() {
            Some(runtime) => {
                runtime.register_effect(node.id(), Arc::new(effect));
                // Run immediately within the observer context to track dependencies
                runtime.run_effect(node.id());
            }
            None => effect(),
        }

        Self { node }
    }

    /// Manually trigger the effect.
    pub fn run(&self) {
        if let Some(runtime) = self.node.runtime() {
            runtime.run_effect(self.node.id());
        }
    }
}

/// Create a new effect that runs when dependencies change.
///
/// The effect runs immediately and then again whenever any signal
/// it reads changes.
pub fn create_effect<F>(runtime: &ReactiveRuntime, effect: F) -> Effect
where
    F: Fn() + Send + Sync + 'static,
{
    Effect::new(runtime, effect)
}
