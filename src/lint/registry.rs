//! Rule registry for managing lint rules.
//!
//! The [`RuleRegistry`] stores rules in registration order and provides
//! methods for registering, selecting, and iterating over them. Order is
//! significant: the engine runs rules in this order on every document.

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::finding::{Tag, INTERNAL_ERROR, LOAD_FAILURE};
use super::resolve::{BuiltinResolver, CachingResolver, ModuleResolver, SharedCache};
use super::rule::{Rule, RuleId, Severity};
use super::rules::{FqcnRule, OnlyBuiltinsRule};
use crate::config::{profile_rules, Options};
use crate::error::{LintError, Result};

/// Tag marking rules that only run when explicitly enabled.
pub const OPT_IN: &str = "opt-in";

/// Registry of lint rules.
pub struct RuleRegistry {
    rules: IndexMap<RuleId, Box<dyn Rule>>,
}

/// Summary of a registered rule, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInfo {
    pub id: RuleId,
    pub description: String,
    pub severity: Severity,
    pub tags: Vec<&'static str>,
}

/// Outcome of applying the selection options to a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected rule ids, in registry order.
    pub enabled: Vec<RuleId>,
    /// Problems with the selection options, such as unknown names.
    pub warnings: Vec<String>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Create a registry with all built-in rules, resolving modules offline.
    pub fn with_builtins(options: &Options) -> Self {
        Self::with_resolver(options, Arc::new(BuiltinResolver::new(options)), None)
    }

    /// Create a registry with all built-in rules using `resolver`.
    ///
    /// Every rule gets a private resolution cache. Passing `shared` makes
    /// those caches consult one cache shared across registries.
    pub fn with_resolver(
        options: &Options,
        resolver: Arc<dyn ModuleResolver>,
        shared: Option<&SharedCache>,
    ) -> Self {
        let cache = || {
            let caching = CachingResolver::new(resolver.clone());
            match shared {
                Some(shared) => caching.with_shared(shared.clone()),
                None => caching,
            }
        };
        let builtins: Vec<Box<dyn Rule>> = vec![
            Box::new(FqcnRule::new(options, cache())),
            Box::new(OnlyBuiltinsRule::new(options, cache())),
        ];

        let mut registry = Self::new();
        for rule in builtins {
            registry.rules.insert(rule.id(), rule);
        }
        registry
    }

    /// Register a lint rule.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRule` when a rule with the same id is present.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<()> {
        let id = rule.id();
        if self.rules.contains_key(&id) {
            return Err(LintError::DuplicateRule { id: id.0 });
        }
        tracing::debug!(rule = %id, "Registered rule");
        self.rules.insert(id, rule);
        Ok(())
    }

    /// Get a rule by ID.
    pub fn get(&self, id: &RuleId) -> Option<&dyn Rule> {
        self.rules.get(id).map(|r| r.as_ref())
    }

    /// Get a rule by ID, mutably.
    pub fn get_mut(&mut self, id: &RuleId) -> Option<&mut Box<dyn Rule>> {
        self.rules.get_mut(id)
    }

    /// Iterate over all rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.values().map(|r| r.as_ref())
    }

    /// Iterate mutably over all rules in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Rule>> {
        self.rules.values_mut()
    }

    /// Get the number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Work out which rules the options select.
    ///
    /// Skipping always wins over enabling. Unknown names are reported as
    /// warnings and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidation` for an unknown profile.
    pub fn select(&self, options: &Options) -> Result<Selection> {
        let profile = options
            .profile
            .as_deref()
            .map(profile_rules)
            .transpose()?;

        let mut selection = Selection::default();
        let known = self.known_names();
        for (list, names) in [
            ("skip_list", &options.skip_list),
            ("enable_list", &options.enable_list),
            ("tags", &options.tags),
        ] {
            for name in names.iter().filter(|name| !known.contains(name.as_str())) {
                let warning = format!("Unknown rule or tag '{}' in {}", name, list);
                tracing::warn!("{}", warning);
                selection.warnings.push(warning);
            }
        }

        for rule in self.iter() {
            let id = rule.id();
            let names: Vec<&str> = std::iter::once(id.as_str())
                .chain(rule.tags().iter().copied())
                .collect();
            let listed =
                |list: &[String]| names.iter().any(|n| list.iter().any(|l| l.as_str() == *n));

            let enabled_explicitly = listed(&options.enable_list);
            if listed(&options.skip_list) {
                continue;
            }
            if rule.tags().contains(&OPT_IN) && !enabled_explicitly {
                continue;
            }
            if !options.tags.is_empty() && !listed(&options.tags) {
                continue;
            }
            if let Some(profile) = &profile {
                if !profile.contains(id.as_str()) && !enabled_explicitly {
                    continue;
                }
            }
            selection.enabled.push(id);
        }
        Ok(selection)
    }

    /// Keep only the selected rules, preserving order.
    pub fn filter(&mut self, selection: &Selection) {
        self.rules.retain(|id, _| selection.enabled.contains(id));
    }

    /// Rule ids, rule tags, full sub-tags and the reserved ids.
    fn known_names(&self) -> HashSet<String> {
        let mut known: HashSet<String> = [INTERNAL_ERROR, LOAD_FAILURE]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for rule in self.iter() {
            let id = rule.id();
            known.extend(rule.tags().iter().map(|t| t.to_string()));
            known.extend(
                rule.sub_tags()
                    .iter()
                    .map(|sub| Tag::sub(id.as_str(), *sub).to_string()),
            );
            known.insert(id.0);
        }
        known
    }

    /// Describe every registered rule.
    pub fn list_rules(&self) -> Vec<RuleInfo> {
        self.iter()
            .map(|rule| RuleInfo {
                id: rule.id(),
                description: rule.description().to_string(),
                severity: rule.severity(),
                tags: rule.tags().to_vec(),
            })
            .collect()
    }

    /// Every tag with the rules carrying it.
    pub fn list_tags(&self) -> BTreeMap<&'static str, Vec<RuleId>> {
        let mut tags: BTreeMap<&'static str, Vec<RuleId>> = BTreeMap::new();
        for rule in self.iter() {
            for tag in rule.tags() {
                tags.entry(*tag).or_default().push(rule.id());
            }
        }
        tags
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
