//! Color scheme preference and the resolved dark-theme flag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::runtime::ReactiveRuntime;
use crate::store::{Store, Subscription};

/// Color scheme chosen by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the operating system.
    #[default]
    System,
}

impl ColorScheme {
    /// String identifier, as used in settings and CSS datasets.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Whether the dark theme applies, given the system preference.
    #[must_use]
    pub const fn resolve(self, system_prefers_dark: bool) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::System => system_prefers_dark,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => Err(StoreError::UnknownColorScheme {
                value: value.to_string(),
            }),
        }
    }
}

/// Theme stores.
///
/// `dark_theme` is recomputed from `scheme` and `system_prefers_dark`
/// whenever either changes. It stays writable so the UI can flip it
/// directly; the next change of an input overrides that write.
pub struct ThemeStore {
    scheme: Store<ColorScheme>,
    dark_theme: Store<bool>,
    system_prefers_dark: Store<bool>,
    _sync: Subscription,
}

impl ThemeStore {
    pub fn new(runtime: &ReactiveRuntime) -> Self {
        let scheme = Store::new(runtime, ColorScheme::default());
        let dark_theme = Store::new(runtime, false);
        let system_prefers_dark = Store::new(runtime, false);

        let sync = scheme.subscribe({
            let (dark_theme, system_prefers_dark) = (dark_theme.clone(), system_prefers_dark.clone());
            move |scheme| dark_theme.set(scheme.resolve(system_prefers_dark.get()))
        });

        Self {
            scheme,
            dark_theme,
            system_prefers_dark,
            _sync: sync,
        }
    }

    pub fn scheme(&self) -> &Store<ColorScheme> {
        &self.scheme
    }

    pub fn dark_theme(&self) -> &Store<bool> {
        &self.dark_theme
    }

    /// Whether the operating system asks for a dark theme.
    pub fn system_prefers_dark(&self) -> &Store<bool> {
        &self.system_prefers_dark
    }

    pub fn set_scheme(&self, scheme: ColorScheme) {
        self.scheme.set(scheme);
    }

    /// Report a change of the system preference.
    pub fn set_system_preference(&self, prefers_dark: bool) {
        self.system_prefers_dark.set(prefers_dark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_round_trips_through_str() {
        for scheme in [ColorScheme::Light, ColorScheme::Dark, ColorScheme::System] {
            assert_eq!(scheme.as_str().parse::<ColorScheme>().unwrap(), scheme);
        }
        assert_eq!(" Dark ".parse::<ColorScheme>().unwrap(), ColorScheme::Dark);
        assert!("sepia".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&ColorScheme::System).unwrap(), r#""system""#);
        assert_eq!(
            serde_json::from_str::<ColorScheme>(r#""light""#).unwrap(),
            ColorScheme::Light
        );
    }

    #[test]
    fn default_follows_system() {
        let runtime = ReactiveRuntime::new();
        let theme = ThemeStore::new(&runtime);
        assert_eq!(theme.scheme().get(), ColorScheme::System);
        assert!(!theme.dark_theme().get());

        theme.set_system_preference(true);
        assert!(theme.dark_theme().get());
    }

    #[test]
    fn explicit_scheme_wins_over_system() {
        let runtime = ReactiveRuntime::new();
        let theme = ThemeStore::new(&runtime);
        theme.set_system_preference(true);

        theme.set_scheme(ColorScheme::Light);
        assert!(!theme.dark_theme().get());

        theme.set_system_preference(false);
        theme.set_scheme(ColorScheme::Dark);
        assert!(theme.dark_theme().get());
    }
}
