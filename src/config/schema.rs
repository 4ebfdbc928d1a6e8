//! Configuration schema definitions for playlint.
//!
//! This module contains the [`Options`] struct that maps to the YAML
//! configuration file format (`.ansible-lint`, `.config/ansible-lint.yml`).
//! The value is built once by the loader and passed explicitly into the
//! engines and into every rule constructor.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::error::{LintError, Result};

/// Effective linter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Glob patterns of paths that are never linted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_paths: Vec<String>,

    /// Rule ids, rule tags or finding tags to skip.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_list: Vec<String>,

    /// Rule ids, rule tags or finding tags whose findings are only warnings.
    pub warn_list: Vec<String>,

    /// Opt-in rules to enable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enable_list: Vec<String>,

    /// Restrict the run to rules carrying one of these ids or tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Rule ids or finding tags that may be fixed automatically.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub write_list: Vec<String>,

    /// Profile that restricts the active rule set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Treat warnings as fatal.
    #[serde(default)]
    pub strict: bool,

    /// Share one module resolution cache between evaluation workers.
    #[serde(default)]
    pub shared_cache: bool,

    /// User kind table, consulted before the built-in one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<KindEntry>,

    /// Modules that should be considered installed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mock_modules: Vec<String>,

    /// Collections accepted by the `only-builtins` rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only_builtins_allow_collections: Vec<String>,

    /// Modules accepted by the `only-builtins` rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only_builtins_allow_modules: Vec<String>,

    /// Module prefixes exempt from `fqcn[canonical]`.
    pub canonical_exclusions: Vec<String>,

    /// Canonical redirects for fully qualified module names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub module_redirects: BTreeMap<String, String>,

    /// Fail on documents that match no kind pattern.
    #[serde(default)]
    pub require_known_kind: bool,

    /// Project directory, used to relativize reported paths.
    pub project_dir: PathBuf,

    /// Per-rule settings, keyed by rule id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub rules: HashMap<String, serde_yaml::Value>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            exclude_paths: Vec::new(),
            skip_list: Vec::new(),
            warn_list: vec!["experimental".to_string(), "jinja[spacing]".to_string()],
            enable_list: Vec::new(),
            tags: Vec::new(),
            write_list: Vec::new(),
            profile: None,
            strict: false,
            shared_cache: false,
            kinds: Vec::new(),
            mock_modules: Vec::new(),
            only_builtins_allow_collections: Vec::new(),
            only_builtins_allow_modules: Vec::new(),
            canonical_exclusions: vec![
                "community.general.".to_string(),
                "community.network.".to_string(),
            ],
            module_redirects: BTreeMap::new(),
            require_known_kind: false,
            project_dir: PathBuf::from("."),
            rules: HashMap::new(),
        }
    }
}

impl Options {
    /// Settings for the rule `rule_id`, or an empty mapping.
    pub fn get_rule_config(&self, rule_id: &str) -> Result<serde_yaml::Mapping> {
        match self.rules.get(rule_id) {
            None | Some(serde_yaml::Value::Null) => Ok(serde_yaml::Mapping::new()),
            Some(serde_yaml::Value::Mapping(map)) => Ok(map.clone()),
            Some(other) => Err(LintError::ConfigValidation {
                message: format!("Invalid rule config for {}: {:?}", rule_id, other),
            }),
        }
    }

    /// Whether fixes are enabled at all.
    pub fn fixes_enabled(&self) -> bool {
        !self.write_list.is_empty() && !self.write_list.iter().any(|w| w == "none")
    }
}

/// One `kind: pattern` entry of a kind table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct KindEntry {
    /// Kind name, e.g. `playbook`.
    pub kind: String,
    /// Glob pattern with brace alternation.
    pub pattern: String,
}

impl KindEntry {
    /// Create a new entry.
    pub fn new(kind: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            pattern: pattern.into(),
        }
    }
}

impl TryFrom<BTreeMap<String, String>> for KindEntry {
    type Error = String;

    fn try_from(map: BTreeMap<String, String>) -> std::result::Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "kind entries must hold exactly one `kind: pattern` pair, got {}",
                map.len()
            ));
        }
        let (kind, pattern) = map.into_iter().next().ok_or("empty kind entry")?;
        Ok(Self { kind, pattern })
    }
}

impl From<KindEntry> for BTreeMap<String, String> {
    fn from(entry: KindEntry) -> Self {
        BTreeMap::from([(entry.kind, entry.pattern)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_warn_list_and_exclusions() {
        let options = Options::default();
        assert_eq!(options.warn_list, vec!["experimental", "jinja[spacing]"]);
        assert!(options
            .canonical_exclusions
            .contains(&"community.general.".to_string()));
        assert!(!options.fixes_enabled());
    }

    #[test]
    fn parses_lists_and_kinds() {
        let yaml = r#"
skip_list:
  - fqcn[action]
write_list: [all]
kinds:
  - playbook: "**/deploy/*.yml"
"#;
        let options: Options = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.skip_list, vec!["fqcn[action]"]);
        assert!(options.fixes_enabled());
        assert_eq!(options.kinds, vec![KindEntry::new("playbook", "**/deploy/*.yml")]);
        // untouched fields keep their defaults
        assert_eq!(options.warn_list.len(), 2);
    }

    #[test]
    fn rejects_kind_entry_with_two_pairs() {
        let yaml = "kinds:\n  - {playbook: a.yml, tasks: b.yml}\n";
        assert!(serde_yaml::from_str::<Options>(yaml).is_err());
    }

    #[test]
    fn write_list_none_disables_fixes() {
        let options = Options {
            write_list: vec!["none".into()],
            ..Default::default()
        };
        assert!(!options.fixes_enabled());
    }

    #[test]
    fn rule_config_lookup() {
        let yaml = "rules:\n  fqcn:\n    strict: true\n  broken: 3\n";
        let options: Options = serde_yaml::from_str(yaml).unwrap();

        let fqcn = options.get_rule_config("fqcn").unwrap();
        assert_eq!(
            fqcn.get("strict"),
            Some(&serde_yaml::Value::Bool(true))
        );
        assert!(options.get_rule_config("missing").unwrap().is_empty());
        assert!(options.get_rule_config("broken").is_err());
    }
}
