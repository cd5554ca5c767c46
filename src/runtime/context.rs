use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Identifier of a signal, memo or effect inside one runtime.
///
/// Ids are handed out in creation order, which is also the order in which
/// pending effects run after a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

type ObserverFn = Arc<dyn Fn() + Send + Sync>;

/// Dependency bookkeeping for one runtime.
#[derive(Default)]
struct ReactiveContext {
    current_observer: Option<NodeId>,
    // Map from source ID to the observers that read it
    dependencies: BTreeMap<NodeId, BTreeSet<NodeId>>,
    // Map from observer ID to the sources it read during its last run
    observer_deps: BTreeMap<NodeId, BTreeSet<NodeId>>,
    // Map from effect ID to the effect function
    observers: BTreeMap<NodeId, ObserverFn>,
    // Map from memo ID to dirty state
    memo_dirty: BTreeMap<NodeId, bool>,
}

impl ReactiveContext {
    /// Forget every source the observer read, so its next run starts clean.
    fn unlink(&mut self, observer: NodeId) {
        if let Some(old_deps) = self.observer_deps.remove(&observer) {
            for source in old_deps {
                if let Some(deps) = self.dependencies.get_mut(&source) {
                    deps.remove(&observer);
                    if deps.is_empty() {
                        self.dependencies.remove(&source);
                    }
                }
            }
        }
    }

    /// Mark every memo downstream of `source` dirty and collect the effects
    /// that have to rerun, in creation order.
    fn invalidate(&mut self, source: NodeId) -> Vec<NodeId> {
        let mut pending = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut stack = vec![source];

        while let Some(node) = stack.pop() {
            let Some(observers) = self.dependencies.get(&node) else {
                continue;
            };
            for &observer in observers {
                if !visited.insert(observer) {
                    continue;
                }
                if let Some(dirty) = self.memo_dirty.get_mut(&observer) {
                    *dirty = true;
                    stack.push(observer);
                } else if self.observers.contains_key(&observer) {
                    pending.insert(observer);
                }
            }
        }

        pending.into_iter().collect()
    }

    /// Returns the removed effect closure so the caller can drop it once the
    /// context lock is released; it may own the last handle to another node.
    fn dispose(&mut self, id: NodeId) -> Option<ObserverFn> {
        self.unlink(id);
        let effect = self.observers.remove(&id);
        self.memo_dirty.remove(&id);
        if let Some(observers) = self.dependencies.remove(&id) {
            for observer in observers {
                if let Some(sources) = self.observer_deps.get_mut(&observer) {
                    sources.remove(&id);
                }
            }
        }
        effect
    }
}

/// Shared runtime state.
pub(crate) struct RuntimeInner {
    next_id: AtomicUsize,
    context: Mutex<ReactiveContext>,
}

/// Reactive runtime that owns the dependency graph.
///
/// A runtime is created explicitly and handed to every primitive built on
/// it; there is no process-wide default. Cloning the handle is cheap and
/// every clone refers to the same graph.
///
/// Writes propagate synchronously: by the time [`Signal::set`] returns,
/// every memo that depends on the signal (directly or through other memos)
/// is marked dirty and every dependent effect has rerun once.
///
/// [`Signal::set`]: crate::Signal::set
///
/// # Examples
///
/// ```
/// use carpet_stores::runtime::ReactiveRuntime;
/// use carpet_stores::{Memo, Signal};
///
/// let runtime = ReactiveRuntime::new();
/// let count = Signal::new(&runtime, 2);
/// let doubled = Memo::new(&runtime, {
///     let count = count.clone();
///     move || count.get() * 2
/// });
///
/// assert_eq!(doubled.get(), 4);
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
#[derive(Clone)]
pub struct ReactiveRuntime {
    inner: Arc<RuntimeInner>,
}

impl ReactiveRuntime {
    /// Create a new, empty runtime.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RuntimeInner {
                next_id: AtomicUsize::new(0),
                context: Mutex::new(ReactiveContext::default()),
            }),
        }
    }

    fn context(&self) -> MutexGuard<'_, ReactiveContext> {
        self.inner
            .context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<RuntimeInner> {
        Arc::downgrade(&self.inner)
    }

    /// Clear all observers, dependencies, and state from this runtime.
    ///
    /// Primitives created before the call keep their values but stop
    /// propagating until they are read again inside a new observer.
    pub fn clear(&self) {
        let old = std::mem::take(&mut *self.context());
        drop(old);
    }

    /// Number of live memos and effects. Mostly useful to check that
    /// dropped subscriptions were released.
    pub fn observer_count(&self) -> usize {
        let ctx = self.context();
        ctx.observers.len() + ctx.memo_dirty.len()
    }

    /// Generate the next unique ID for a reactive primitive.
    pub(crate) fn next_id(&self) -> NodeId {
        NodeId(self.inner.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Track a read of `source` by the current observer.
    pub(crate) fn track_read(&self, source: NodeId) {
        let mut ctx = self.context();
        let Some(observer) = ctx.current_observer else {
            return;
        };
        if observer == source {
            return;
        }
        ctx.dependencies.entry(source).or_default().insert(observer);
        ctx.observer_deps.entry(observer).or_default().insert(source);
    }

    /// Propagate a write of `source` through the graph.
    pub(crate) fn notify(&self, source: NodeId) {
        let pending = self.context().invalidate(source);
        for effect in pending {
            self.run_effect(effect);
        }
    }

    pub(crate) fn register_effect(&self, id: NodeId, effect: ObserverFn) {
        self.context().observers.insert(id, effect);
    }

    /// Rerun an effect, re-collecting its dependencies.
    pub(crate) fn run_effect(&self, id: NodeId) {
        let effect = {
            let mut ctx = self.context();
            let effect = ctx.observers.get(&id).cloned();
            if effect.is_some() {
                ctx.unlink(id);
            }
            effect
        };

        // Disposed while queued
        if let Some(effect) = effect {
            self.with_observer(id, || effect());
        }
    }

    /// Run `f` with `observer_id` as the current observer.
    pub(crate) fn with_observer<F, R>(&self, observer_id: NodeId, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let prev = self.context().current_observer.replace(observer_id);
        let _restore = RestoreObserver {
            runtime: self,
            prev,
        };
        f()
    }

    /// Register a memo and mark it as dirty initially.
    pub(crate) fn register_memo(&self, memo_id: NodeId) {
        self.context().memo_dirty.insert(memo_id, true);
    }

    /// Check if a memo is dirty (needs recomputation).
    pub(crate) fn is_memo_dirty(&self, memo_id: NodeId) -> bool {
        self.context()
            .memo_dirty
            .get(&memo_id)
            .copied()
            .unwrap_or(true)
    }

    /// Recompute a memo's value while collecting fresh dependencies.
    pub(crate) fn recompute<F, T>(&self, memo_id: NodeId, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.context().unlink(memo_id);
        self.with_observer(memo_id, compute)
    }

    /// Mark a memo as clean (after recomputation).
    pub(crate) fn mark_memo_clean(&self, memo_id: NodeId) {
        if let Some(dirty) = self.context().memo_dirty.get_mut(&memo_id) {
            *dirty = false;
        }
    }

    /// Remove a node and every edge touching it.
    pub(crate) fn dispose(&self, id: NodeId) {
        let effect = self.context().dispose(id);
        drop(effect);
    }
}

impl Default for ReactiveRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReactiveRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.context();
        f.debug_struct("ReactiveRuntime")
            .field("effects", &ctx.observers.len())
            .field("memos", &ctx.memo_dirty.len())
            .field("sources", &ctx.dependencies.len())
            .finish()
    }
}

struct RestoreObserver<'a> {
    runtime: &'a ReactiveRuntime,
    prev: Option<NodeId>,
}

impl Drop for RestoreObserver<'_> {
    fn drop(&mut self) {
        self.runtime.context().current_observer = self.prev;
    }
}

/// A slot in the graph owned by one primitive.
///
/// Holds the runtime weakly so that closures stored in the runtime never
/// keep it alive. Dropping the node removes it from the graph.
pub(crate) struct Node {
    id: NodeId,
    runtime: Weak<RuntimeInner>,
}

impl Node {
    pub(crate) fn new(runtime: &ReactiveRuntime) -> Self {
        Self {
            id: runtime.next_id(),
            runtime: runtime.downgrade(),
        }
    }

    /// A node that belongs to no runtime; reads and writes never propagate.
    pub(crate) fn detached() -> Self {
        Self {
            id: NodeId(usize::MAX),
            runtime: Weak::new(),
        }
    }

    /// Allocate a new node in the same runtime as `self`.
    pub(crate) fn sibling(&self) -> Self {
        match self.runtime() {
            Some(runtime) => Self::new(&runtime),
            None => Self::detached(),
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn runtime(&self) -> Option<ReactiveRuntime> {
        self.runtime
            .upgrade()
            .map(|inner| ReactiveRuntime { inner })
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime() {
            runtime.dispose(self.id);
        }
    }
}
