use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{schema, ConfigMap, FileSettings};
use crate::error::Result;
use crate::persist::KeyValueStorage;
use crate::runtime::ReactiveRuntime;
use crate::settings::Settings;
use crate::store::{Derived, Store, Subscription};

/// Configuration map, the selected config file and the settings of that
/// file, kept in sync with a storage backend.
pub struct ConfigStore {
    config: Store<ConfigMap>,
    selected_file: Store<String>,
    current: Derived<FileSettings>,
    storage: Arc<dyn KeyValueStorage>,
    storage_key: String,
    _autosave: Option<Subscription>,
}

impl ConfigStore {
    /// Load the persisted map and build the stores around it.
    ///
    /// Loading never fails; see [`schema::load_or_default`].
    pub fn bootstrap(
        runtime: &ReactiveRuntime,
        storage: Arc<dyn KeyValueStorage>,
        settings: &Settings,
    ) -> Self {
        let initial = schema::load_or_default(storage.as_ref(), &settings.storage_key);
        info!(
            files = initial.len(),
            selected = %settings.default_config_file,
            autosave = settings.autosave,
            "configuration store ready"
        );

        let config = Store::new(runtime, initial);
        let selected_file = Store::new(runtime, settings.default_config_file.clone());
        let current = Derived::new(runtime, {
            let (config, selected_file) = (config.clone(), selected_file.clone());
            move || {
                let file = selected_file.get();
                config.read(|config| config.get(&file).cloned().unwrap_or_default())
            }
        });

        let autosave = settings.autosave.then(|| {
            autosave(
                &config,
                Arc::clone(&storage),
                settings.storage_key.clone(),
            )
        });

        Self {
            config,
            selected_file,
            current,
            storage,
            storage_key: settings.storage_key.clone(),
            _autosave: autosave,
        }
    }

    /// The whole configuration map.
    pub fn config(&self) -> &Store<ConfigMap> {
        &self.config
    }

    /// Name of the config file the editor is showing.
    pub fn selected_file(&self) -> &Store<String> {
        &self.selected_file
    }

    /// Settings of the selected file; empty when the file has none yet.
    pub fn current(&self) -> &Derived<FileSettings> {
        &self.current
    }

    pub fn select_file(&self, file: impl Into<String>) {
        self.selected_file.set(file.into());
    }

    /// Value of `id` in `file`.
    pub fn value(&self, file: &str, id: &str) -> Option<String> {
        self.config
            .read(|config| config.get(file).and_then(|settings| settings.get(id)).cloned())
    }

    /// Store `value` for `id` in `file`, creating the file entry if needed.
    pub fn set_value(&self, file: impl Into<String>, id: impl Into<String>, value: impl Into<String>) {
        let (file, id, value) = (file.into(), id.into(), value.into());
        debug!(%file, %id, %value, "config value set");
        self.config.update(|config| {
            config.entry(file).or_default().insert(id, value);
        });
    }

    /// Store `value` for `id` in the selected file.
    pub fn set_current_value(&self, id: impl Into<String>, value: impl Into<String>) {
        self.set_value(self.selected_file.get(), id, value);
    }

    /// Remove `id` from `file`, dropping the file entry once it is empty.
    pub fn remove_value(&self, file: &str, id: &str) -> Option<String> {
        let present = self.config.read(|config| {
            config
                .get(file)
                .is_some_and(|settings| settings.contains_key(id))
        });
        if !present {
            return None;
        }

        let mut removed = None;
        self.config.update(|config| {
            if let Some(settings) = config.get_mut(file) {
                removed = settings.remove(id);
                if settings.is_empty() {
                    config.remove(file);
                }
            }
        });
        removed
    }

    /// Forget every stored value.
    pub fn reset(&self) {
        self.config.set(ConfigMap::new());
    }

    /// Write the current map to storage.
    pub fn persist(&self) -> Result<()> {
        let raw = self.config.read(schema::encode)?;
        self.storage.set_item(&self.storage_key, &raw)
    }
}

/// Persist on every write after the initial load.
fn autosave(
    config: &Store<ConfigMap>,
    storage: Arc<dyn KeyValueStorage>,
    key: String,
) -> Subscription {
    let loaded = AtomicBool::new(false);
    config.subscribe(move |config| {
        // The first call carries the value just loaded from storage
        if !loaded.swap(true, Ordering::SeqCst) {
            return;
        }
        let result = schema::encode(config).and_then(|raw| storage.set_item(&key, &raw));
        if let Err(err) = result {
            warn!(key = %key, error = %err, "failed to save configuration");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStorage;
    use std::collections::BTreeMap;

    fn bootstrap(
        runtime: &ReactiveRuntime,
        storage: Arc<MemoryStorage>,
        autosave: bool,
    ) -> ConfigStore {
        let settings = Settings {
            autosave,
            ..Settings::default()
        };
        ConfigStore::bootstrap(runtime, storage, &settings)
    }

    #[test]
    fn loads_persisted_bare_map() {
        let runtime = ReactiveRuntime::new();
        let storage = Arc::new(MemoryStorage::with_items([(
            "config",
            r#"{"carpet.conf":{"x":"1"}}"#,
        )]));
        let store = bootstrap(&runtime, storage, false);

        assert_eq!(store.value("carpet.conf", "x").as_deref(), Some("1"));
        assert_eq!(store.current().get().get("x").map(String::as_str), Some("1"));
    }

    #[test]
    fn defaults_without_storage() {
        let runtime = ReactiveRuntime::new();
        let store = bootstrap(&runtime, Arc::new(MemoryStorage::new()), false);
        assert!(store.config().get().is_empty());
        assert_eq!(store.selected_file().get(), "carpet.conf");
        assert!(store.current().get().is_empty());
    }

    #[test]
    fn current_follows_selection_and_writes() {
        let runtime = ReactiveRuntime::new();
        let store = bootstrap(&runtime, Arc::new(MemoryStorage::new()), false);
        store.set_value("carpet.conf", "commandLog", "ops");
        store.set_value("extra.conf", "spawnChunks", "false");

        assert_eq!(
            store.current().get(),
            BTreeMap::from([("commandLog".to_string(), "ops".to_string())])
        );

        store.select_file("extra.conf");
        assert_eq!(
            store.current().get().get("spawnChunks").map(String::as_str),
            Some("false")
        );

        store.set_current_value("spawnChunks", "true");
        assert_eq!(store.value("extra.conf", "spawnChunks").as_deref(), Some("true"));

        store.select_file("unknown.conf");
        assert!(store.current().get().is_empty());
    }

    #[test]
    fn remove_value_drops_empty_files() {
        let runtime = ReactiveRuntime::new();
        let store = bootstrap(&runtime, Arc::new(MemoryStorage::new()), false);
        store.set_value("carpet.conf", "a", "1");

        assert_eq!(store.remove_value("carpet.conf", "missing"), None);
        assert_eq!(store.remove_value("carpet.conf", "a").as_deref(), Some("1"));
        assert!(!store.config().read(|config| config.contains_key("carpet.conf")));
    }

    #[test]
    fn persist_writes_versioned_envelope() {
        let runtime = ReactiveRuntime::new();
        let storage = Arc::new(MemoryStorage::new());
        let store = bootstrap(&runtime, storage.clone(), false);
        store.set_value("carpet.conf", "x", "1");
        assert_eq!(storage.get_item("config").unwrap(), None);

        store.persist().unwrap();
        let raw = storage.get_item("config").unwrap().unwrap();
        assert_eq!(schema::decode(&raw).unwrap(), store.config().get());
        assert!(raw.starts_with(r#"{"version":2"#));
    }

    #[test]
    fn autosave_skips_initial_load_then_saves() {
        let runtime = ReactiveRuntime::new();
        let storage = Arc::new(MemoryStorage::with_items([("config", "{oops")]));
        let store = bootstrap(&runtime, storage.clone(), true);

        // Broken payload stays until the first edit
        assert_eq!(storage.get_item("config").unwrap().as_deref(), Some("{oops"));

        store.set_value("carpet.conf", "x", "1");
        let raw = storage.get_item("config").unwrap().unwrap();
        assert_eq!(schema::decode(&raw).unwrap(), store.config().get());

        store.reset();
        let raw = storage.get_item("config").unwrap().unwrap();
        assert!(schema::decode(&raw).unwrap().is_empty());
    }
}
