//! The persisted configuration map.
//!
//! Values are grouped by config file name, then by setting id:
//! `carpet.conf -> commandLog -> "ops"`.

pub mod schema;
mod store;

use std::collections::BTreeMap;

pub use store::ConfigStore;

/// Setting id to string-encoded value, for one config file.
pub type FileSettings = BTreeMap<String, String>;

/// Config file name to that file's settings.
pub type ConfigMap = BTreeMap<String, FileSettings>;
