use serde::{Deserialize, Deserializer, Serialize};

/// Metadata and current value of one configurable setting.
///
/// Rules come from an external loader and are never edited in place; the
/// catalog swaps the whole list at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Value type tag, e.g. `boolean`, `int`, `String`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Current value, string-encoded.
    pub value: String,
    #[serde(default)]
    pub strict: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<String>,
    /// Allowed values; `None` when the rule takes free input.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub validators: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub config_files: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub minecraft_versions: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub version_urls: Vec<String>,
    #[serde(flatten)]
    pub origin: RuleOrigin,
}

/// Where a rule is defined.
///
/// Catalogs were first published per mod and later per source repository;
/// both shapes are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleOrigin {
    Mod {
        mod_name: String,
        mod_slug: String,
        #[serde(default)]
        mod_url: String,
    },
    Repository {
        repo: String,
        #[serde(default, deserialize_with = "null_as_empty")]
        branches: Vec<String>,
    },
}

impl Rule {
    /// Display name of the owning mod; the repository name for rules that
    /// only carry a repository.
    pub fn mod_name(&self) -> &str {
        match &self.origin {
            RuleOrigin::Mod { mod_name, .. } => mod_name,
            RuleOrigin::Repository { repo, .. } => repo,
        }
    }

    /// Slug of the owning mod, if the rule was published per mod.
    pub fn mod_slug(&self) -> Option<&str> {
        match &self.origin {
            RuleOrigin::Mod { mod_slug, .. } => Some(mod_slug),
            RuleOrigin::Repository { .. } => None,
        }
    }

    /// Whether the rule is written to `config_file`.
    pub fn applies_to(&self, config_file: &str) -> bool {
        self.config_files.iter().any(|file| file == config_file)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
