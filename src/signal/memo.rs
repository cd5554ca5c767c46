use crate::runtime::{Node, ReactiveRuntime};
use crate::signal::Effect;
use std::sync::{Arc, PoisonError, RwLock};

/// A memoized computed value that automatically tracks dependencies.
///
/// Memos recompute lazily: a write to a dependency only marks the memo
/// dirty, and the next read recomputes it. A read never returns a value
/// computed from stale inputs.
pub struct Memo<T> {
    compute: Arc<dyn Fn() -> T + Send + Sync>,
    cached: Arc<RwLock<Option<T>>>,
    node: Arc<Node>,
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            compute: Arc::clone(&self.compute),
            cached: Arc::clone(&self.cached),
            node: Arc::clone(&self.node),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Memo<T> {
    /// Create a new memo with the given computation function.
    pub fn new<F>(runtime: &ReactiveRuntime, compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::attach(Node::new(runtime), compute)
    }

    pub(crate) fn attach<F>(node: Node, compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        if let Some(runtime) = node.runtime() {
            runtime.register_memo(node.id());
        }

        Self {
            compute: Arc::new(compute),
            cached: Arc::new(RwLock::new(None)),
            node: Arc::new(node),
        }
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Read the memoized value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let Some(runtime) = self.node.runtime() else {
            return f(&(self.compute)());
        };
        let id = self.node.id();

        // Track this read in the reactive context
        runtime.track_read(id);

        if runtime.is_memo_dirty(id) {
            let value = runtime.recompute(id, || (self.compute)());
            *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
            runtime.mark_memo_clean(id);
        }

        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        match cached.as_ref() {
            Some(value) => f(value),
            None => f(&(self.compute)()),
        }
    }

    /// Watch the memo; the callback runs now and after each change of any
    /// of its dependencies.
    pub fn watch<F>(&self, callback: F) -> Effect
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let memo = self.clone();
        Effect::attach(self.node.sibling(), move || callback(memo.get()))
    }
}

/// Create a new memoized computation.
///
/// # Example
///
/// ```
/// use carpet_stores::runtime::ReactiveRuntime;
/// use carpet_stores::{create_memo, create_signal};
///
/// let runtime = ReactiveRuntime::new();
/// let count = create_signal(&runtime, 5);
/// let doubled = create_memo(&runtime, {
///     let count = count.clone();
///     move || count.get() * 2
/// });
/// assert_eq!(doubled.get(), 10);
/// ```
pub fn create_memo<T, F>(runtime: &ReactiveRuntime, compute: F) -> Memo<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    Memo::new(runtime, compute)
}
