//! # Carpet Stores
//!
//! Reactive state for a rule-browsing configuration editor.
//!
//! The crate provides two levels of abstraction:
//!
//! ## Signals (Low-level primitives)
//!
//! Fine-grained reactive primitives, all bound to an explicit
//! [`ReactiveRuntime`]:
//! - `Signal<T>` - Reactive values that notify dependents when changed
//! - `Memo<T>` - Computed values that automatically track dependencies
//! - `Effect` - Side effects that run when dependencies change
//!
//! ## Stores (Editor state)
//!
//! - `Store<T>` / `Derived<T>` - writable stores and read-only views
//! - [`RuleCatalog`] - loaded rules plus sorted distinct filter lists
//! - [`ConfigStore`] - per-file setting values persisted to key-value storage
//! - [`ThemeStore`] - color scheme preference and the dark-theme flag
//! - [`SnackbarSlot`] - the single registered notification handler
//! - [`AppState`] - all of the above, created once at startup
//!
//! ```
//! use std::sync::Arc;
//! use carpet_stores::{AppState, MemoryStorage, Settings};
//!
//! let storage = Arc::new(MemoryStorage::with_items([(
//!     "config",
//!     r#"{"carpet.conf":{"commandLog":"ops"}}"#,
//! )]));
//! let state = AppState::bootstrap(storage, Settings::default());
//!
//! let current = state.config().current().get();
//! assert_eq!(current["commandLog"], "ops");
//! ```

pub mod config;
pub mod error;
pub mod persist;
pub mod rules;
pub mod runtime;
pub mod settings;
pub mod signal;
pub mod snackbar;
pub mod state;
pub mod store;
pub mod theme;

// Re-export main types for convenience
pub use config::{ConfigMap, ConfigStore, FileSettings};
pub use error::{Result, StoreError};
pub use persist::{FileStorage, KeyValueStorage, MemoryStorage};
pub use rules::{Rule, RuleCatalog, RuleOrigin};
pub use runtime::ReactiveRuntime;
pub use settings::Settings;
pub use signal::{create_effect, create_memo, create_signal, Effect, Memo, Signal};
pub use snackbar::{SnackbarAction, SnackbarSlot};
pub use state::AppState;
pub use store::{Derived, Readable, Store, Subscription};
pub use theme::{ColorScheme, ThemeStore};
