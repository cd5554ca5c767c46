//! Error types for store persistence and loading.

use std::io;

use thiserror::Error;

/// Primary error type for the crate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend failed to read or write a key.
    #[error("storage backend failed for key `{key}`")]
    Storage {
        /// Key being accessed.
        key: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// JSON payload could not be encoded or decoded.
    #[error("invalid JSON payload")]
    Json(#[from] serde_json::Error),
    /// Persisted configuration carries a schema version this build cannot read.
    #[error("unsupported configuration schema version {found} (newest known is {supported})")]
    UnsupportedVersion {
        /// Version found in storage.
        found: u64,
        /// Newest version this build writes.
        supported: u32,
    },
    /// Color scheme name was not one of `light`, `dark`, `system`.
    #[error("unknown color scheme `{value}`")]
    UnknownColorScheme {
        /// Value provided by the caller.
        value: String,
    },
    /// Settings file could not be parsed.
    #[error("invalid settings")]
    Settings(#[from] toml::de::Error),
}

/// Convenience alias for results returned by this crate.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
