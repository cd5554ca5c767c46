//! Persisted layout of the configuration map.
//!
//! Current payloads are wrapped in an envelope that names their schema
//! version:
//!
//! ```json
//! {"version": 2, "files": {"carpet.conf": {"commandLog": "ops"}}}
//! ```
//!
//! A payload without the envelope is schema 1, the bare nested map written
//! by earlier builds. Older payloads are upgraded step by step through
//! [`MIGRATIONS`] before being decoded.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::ConfigMap;
use crate::error::{Result, StoreError};
use crate::persist::KeyValueStorage;

/// Version written by [`encode`].
pub const SCHEMA_VERSION: u32 = 2;

/// Version assumed for payloads that carry no envelope.
const UNVERSIONED: u64 = 1;

/// Upgrade of a payload from `from` to `from + 1`.
pub struct Migration {
    pub from: u64,
    pub apply: fn(Value) -> Result<Value>,
}

/// Every known upgrade step, oldest first.
pub const MIGRATIONS: &[Migration] = &[Migration {
    from: 1,
    apply: wrap_bare_map,
}];

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    files: &'a ConfigMap,
}

#[derive(Deserialize)]
struct Envelope {
    files: ConfigMap,
}

/// Serialize `config` in the current schema.
pub fn encode(config: &ConfigMap) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        files: config,
    })?)
}

/// Parse a persisted payload of any known version.
pub fn decode(raw: &str) -> Result<ConfigMap> {
    let value: Value = serde_json::from_str(raw)?;
    let (mut version, mut payload) = split_version(value);

    if version > u64::from(SCHEMA_VERSION) {
        return Err(StoreError::UnsupportedVersion {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }

    while version < u64::from(SCHEMA_VERSION) {
        let step = MIGRATIONS
            .iter()
            .find(|migration| migration.from == version)
            .ok_or(StoreError::UnsupportedVersion {
                found: version,
                supported: SCHEMA_VERSION,
            })?;
        payload = (step.apply)(payload)?;
        version += 1;
        debug!(version, "configuration payload migrated");
    }

    let envelope: Envelope = serde_json::from_value(payload)?;
    Ok(envelope.files)
}

/// Read and decode the map stored under `key`.
///
/// A missing key, unreadable storage, malformed JSON or an unknown version
/// all yield an empty map; the problem is logged and the stored value is
/// left as it is.
pub fn load_or_default(storage: &dyn KeyValueStorage, key: &str) -> ConfigMap {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no persisted configuration; starting empty");
            return ConfigMap::new();
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read persisted configuration; starting empty");
            return ConfigMap::new();
        }
    };

    match decode(&raw) {
        Ok(config) => {
            debug!(key, files = config.len(), "persisted configuration loaded");
            config
        }
        Err(err) => {
            warn!(key, error = %err, "discarding unreadable configuration; starting empty");
            ConfigMap::new()
        }
    }
}

/// Tell an envelope apart from a bare map. A config file named `version`
/// maps to an object, never to a number, so it cannot be mistaken for one.
fn split_version(value: Value) -> (u64, Value) {
    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .filter(|_| value.get("files").is_some());
    match version {
        Some(version) => (version, value),
        None => (UNVERSIONED, value),
    }
}

fn wrap_bare_map(payload: Value) -> Result<Value> {
    Ok(json!({ "version": 2, "files": payload }))
}
