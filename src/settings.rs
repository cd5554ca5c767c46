//! Startup settings for the application state.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Storage key the configuration map has always been saved under.
pub const DEFAULT_STORAGE_KEY: &str = "config";
/// Config file selected before the user picks one.
pub const DEFAULT_CONFIG_FILE: &str = "carpet.conf";

/// Knobs read once when [`AppState`](crate::AppState) is bootstrapped.
///
/// Every field has a default, so an empty TOML document is valid:
///
/// ```
/// use carpet_stores::Settings;
///
/// let settings = Settings::from_toml_str("autosave = true").unwrap();
/// assert_eq!(settings.storage_key, "config");
/// assert!(settings.autosave);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key of the persisted configuration map.
    pub storage_key: String,
    /// File selected in the configuration view at startup.
    pub default_config_file: String,
    /// Write the configuration map back to storage after every change.
    pub autosave: bool,
}

impl Settings {
    /// Parse settings from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_config_file: DEFAULT_CONFIG_FILE.to_string(),
            autosave: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_config_file, "carpet.conf");
    }

    #[test]
    fn overrides_are_applied() {
        let settings = Settings::from_toml_str(
            r#"
            storage_key = "editor.config"
            default_config_file = "world.conf"
            "#,
        )
        .unwrap();
        assert_eq!(settings.storage_key, "editor.config");
        assert_eq!(settings.default_config_file, "world.conf");
        assert!(!settings.autosave);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(Settings::from_toml_str("autosave = \"yes\"").is_err());
    }
}
