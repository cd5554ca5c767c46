//! Application-wide state, built once at startup.

use std::sync::Arc;

use tracing::info;

use crate::config::ConfigStore;
use crate::persist::KeyValueStorage;
use crate::rules::RuleCatalog;
use crate::runtime::ReactiveRuntime;
use crate::settings::Settings;
use crate::snackbar::SnackbarSlot;
use crate::theme::ThemeStore;

/// Every store the editor shares between components.
///
/// Build it once and pass it by reference; nothing in the crate keeps
/// hidden global state.
pub struct AppState {
    runtime: ReactiveRuntime,
    settings: Settings,
    snackbar: SnackbarSlot,
    theme: ThemeStore,
    rules: RuleCatalog,
    config: ConfigStore,
}

impl AppState {
    /// Create the runtime and all stores, loading the configuration map
    /// from `storage`.
    pub fn bootstrap(storage: Arc<dyn KeyValueStorage>, settings: Settings) -> Self {
        let runtime = ReactiveRuntime::new();
        let config = ConfigStore::bootstrap(&runtime, storage, &settings);
        let state = Self {
            snackbar: SnackbarSlot::new(),
            theme: ThemeStore::new(&runtime),
            rules: RuleCatalog::new(&runtime),
            config,
            settings,
            runtime,
        };
        info!(storage_key = %state.settings.storage_key, "application state bootstrapped");
        state
    }

    pub fn runtime(&self) -> &ReactiveRuntime {
        &self.runtime
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snackbar(&self) -> &SnackbarSlot {
        &self.snackbar
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn rules(&self) -> &RuleCatalog {
        &self.rules
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}
