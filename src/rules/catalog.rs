use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::config::ConfigMap;
use crate::error::Result;
use crate::rules::Rule;
use crate::runtime::ReactiveRuntime;
use crate::store::{Derived, Store};

/// The loaded rule list together with the filter lists the UI builds
/// from it.
///
/// Every view is derived from the rule store, so replacing the rules
/// recomputes all of them against the new list only.
#[derive(Clone)]
pub struct RuleCatalog {
    rules: Store<Vec<Rule>>,
    categories: Derived<Vec<String>>,
    mods: Derived<Vec<String>>,
    mod_slugs: Derived<Vec<String>>,
    mc_versions: Derived<Vec<String>>,
    config_files: Derived<Vec<String>>,
}

impl RuleCatalog {
    /// Empty catalog.
    pub fn new(runtime: &ReactiveRuntime) -> Self {
        let rules = Store::new(runtime, Vec::new());

        Self {
            categories: distinct_view(runtime, &rules, |rule| {
                rule.categories.iter().map(String::as_str).collect()
            }),
            mods: distinct_view(runtime, &rules, |rule| vec![rule.mod_name()]),
            mod_slugs: distinct_view(runtime, &rules, |rule| rule.mod_slug().into_iter().collect()),
            mc_versions: distinct_view(runtime, &rules, |rule| {
                rule.minecraft_versions.iter().map(String::as_str).collect()
            }),
            config_files: distinct_view(runtime, &rules, |rule| {
                rule.config_files.iter().map(String::as_str).collect()
            }),
            rules,
        }
    }

    /// The underlying rule store.
    pub fn rules(&self) -> &Store<Vec<Rule>> {
        &self.rules
    }

    /// Replace the whole catalog.
    pub fn replace(&self, rules: Vec<Rule>) {
        debug!(count = rules.len(), "rule catalog replaced");
        self.rules.set(rules);
    }

    /// Parse a JSON array of rules and replace the catalog with it.
    ///
    /// On a parse error the current catalog is left untouched.
    pub fn load_json(&self, raw: &str) -> Result<usize> {
        let rules: Vec<Rule> = serde_json::from_str(raw)?;
        let count = rules.len();
        self.replace(rules);
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.rules.read(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read(Vec::is_empty)
    }

    /// Rule with the given id.
    pub fn find(&self, id: &str) -> Option<Rule> {
        self.rules
            .read(|rules| rules.iter().find(|rule| rule.id == id).cloned())
    }

    /// Sorted distinct categories across all rules.
    pub fn categories(&self) -> &Derived<Vec<String>> {
        &self.categories
    }

    /// Sorted distinct mod names.
    pub fn mods(&self) -> &Derived<Vec<String>> {
        &self.mods
    }

    /// Sorted distinct mod slugs.
    pub fn mod_slugs(&self) -> &Derived<Vec<String>> {
        &self.mod_slugs
    }

    /// Sorted distinct Minecraft versions.
    pub fn mc_versions(&self) -> &Derived<Vec<String>> {
        &self.mc_versions
    }

    /// Sorted distinct config file names.
    pub fn config_files(&self) -> &Derived<Vec<String>> {
        &self.config_files
    }

    /// `(file, id)` pairs in `config` whose id matches no loaded rule.
    ///
    /// Entries are only reported, never removed: an id can disappear from
    /// one catalog revision and come back in the next. Returns nothing while
    /// the catalog is empty, since every entry would look orphaned before
    /// the first load.
    pub fn orphaned_settings(&self, config: &ConfigMap) -> Vec<(String, String)> {
        self.rules.read(|rules| {
            if rules.is_empty() {
                return Vec::new();
            }
            let known: HashSet<&str> = rules.iter().map(|rule| rule.id.as_str()).collect();
            let known = &known;
            config
                .iter()
                .flat_map(|(file, settings)| {
                    settings
                        .keys()
                        .filter(move |id| !known.contains(id.as_str()))
                        .map(move |id| (file.clone(), id.clone()))
                })
                .collect()
        })
    }
}

/// Sorted, duplicate-free list of strings.
pub fn distinct_sorted<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn distinct_view<F>(runtime: &ReactiveRuntime, rules: &Store<Vec<Rule>>, field: F) -> Derived<Vec<String>>
where
    F: for<'r> Fn(&'r Rule) -> Vec<&'r str> + Send + Sync + 'static,
{
    let rules = rules.clone();
    Derived::new(runtime, move || {
        rules.read(|rules| distinct_sorted(rules.iter().flat_map(&field)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleOrigin;
    use std::collections::BTreeMap;

    fn rule(id: &str, categories: &[&str], mod_name: &str, versions: &[&str]) -> Rule {
        Rule {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            kind: "boolean".to_string(),
            value: "false".to_string(),
            strict: true,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            options: Some(vec!["true".to_string(), "false".to_string()]),
            extras: None,
            validators: Vec::new(),
            config_files: vec!["carpet.conf".to_string()],
            minecraft_versions: versions.iter().map(|v| v.to_string()).collect(),
            version_urls: Vec::new(),
            origin: RuleOrigin::Mod {
                mod_name: mod_name.to_string(),
                mod_slug: mod_name.to_lowercase(),
                mod_url: String::new(),
            },
        }
    }

    #[test]
    fn distinct_sorted_dedups_and_sorts() {
        assert_eq!(
            distinct_sorted(["survival", "bugfix", "survival", "creative"]),
            vec!["bugfix", "creative", "survival"]
        );
        assert!(distinct_sorted(std::iter::empty()).is_empty());
    }

    #[test]
    fn views_follow_catalog() {
        let runtime = ReactiveRuntime::new();
        let catalog = RuleCatalog::new(&runtime);
        assert!(catalog.categories().get().is_empty());

        catalog.replace(vec![
            rule("a", &["survival", "feature"], "Carpet", &["1.20"]),
            rule("b", &["feature"], "Carpet Extra", &["1.19", "1.20"]),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.categories().get(), vec!["feature", "survival"]);
        assert_eq!(catalog.mods().get(), vec!["Carpet", "Carpet Extra"]);
        assert_eq!(catalog.mod_slugs().get(), vec!["carpet", "carpet extra"]);
        assert_eq!(catalog.mc_versions().get(), vec!["1.19", "1.20"]);
        assert_eq!(catalog.config_files().get(), vec!["carpet.conf"]);
    }

    #[test]
    fn repository_rules_have_no_slug() {
        let runtime = ReactiveRuntime::new();
        let catalog = RuleCatalog::new(&runtime);
        let mut repo_rule = rule("r", &[], "", &[]);
        repo_rule.origin = RuleOrigin::Repository {
            repo: "gnembon/fabric-carpet".to_string(),
            branches: vec!["master".to_string()],
        };

        catalog.replace(vec![repo_rule]);
        assert_eq!(catalog.mods().get(), vec!["gnembon/fabric-carpet"]);
        assert!(catalog.mod_slugs().get().is_empty());
    }

    #[test]
    fn bad_json_keeps_previous_catalog() {
        let runtime = ReactiveRuntime::new();
        let catalog = RuleCatalog::new(&runtime);
        catalog.replace(vec![rule("a", &["x"], "Carpet", &[])]);

        assert!(catalog.load_json("{not json").is_err());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find("a").is_some());
        assert!(catalog.find("b").is_none());
    }

    #[test]
    fn orphans_are_reported_per_file() {
        let runtime = ReactiveRuntime::new();
        let catalog = RuleCatalog::new(&runtime);
        let mut config = ConfigMap::new();
        config.insert(
            "carpet.conf".to_string(),
            BTreeMap::from([
                ("a".to_string(), "true".to_string()),
                ("gone".to_string(), "1".to_string()),
            ]),
        );

        assert!(catalog.orphaned_settings(&config).is_empty());

        catalog.replace(vec![rule("a", &[], "Carpet", &[])]);
        assert_eq!(
            catalog.orphaned_settings(&config),
            vec![("carpet.conf".to_string(), "gone".to_string())]
        );
    }
}
