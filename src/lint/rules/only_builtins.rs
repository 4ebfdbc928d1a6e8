//! Restrict actions to builtin modules.

use crate::config::Options;
use crate::document::{Document, Task};
use crate::lint::resolve::CachingResolver;
use crate::lint::{Capabilities, Finding, Rule, RuleError, RuleId, Severity, Tag};

pub const ID: &str = "only-builtins";

/// Flags actions outside `ansible.builtin` unless allow-listed.
pub struct OnlyBuiltinsRule {
    resolver: CachingResolver,
    allowed_collections: Vec<String>,
    allowed_modules: Vec<String>,
}

impl OnlyBuiltinsRule {
    pub fn new(options: &Options, resolver: CachingResolver) -> Self {
        Self {
            resolver,
            allowed_collections: options.only_builtins_allow_collections.clone(),
            allowed_modules: options.only_builtins_allow_modules.clone(),
        }
    }

    fn is_allowed(&self, module: &str, resolved: &str) -> bool {
        if resolved.starts_with("ansible.builtin.") || resolved.starts_with("ansible.legacy.") {
            return true;
        }
        if self
            .allowed_modules
            .iter()
            .any(|allowed| allowed == module || allowed == resolved)
        {
            return true;
        }
        self.allowed_collections
            .iter()
            .any(|collection| resolved.starts_with(&format!("{collection}.")))
    }
}

impl Rule for OnlyBuiltinsRule {
    fn id(&self) -> RuleId {
        RuleId::new(ID)
    }

    fn description(&self) -> &str {
        "Check whether the playbook uses anything but ansible.builtin"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn tags(&self) -> &[&'static str] {
        &["opt-in", "experimental"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::none().task()
    }

    fn match_task(&mut self, doc: &Document, task: &Task<'_>) -> Result<Vec<Finding>, RuleError> {
        let module = task.action.module.as_str();
        let resolved = self
            .resolver
            .resolve(module)
            .unwrap_or_else(|| module.to_string());
        if self.is_allowed(module, &resolved) {
            return Ok(vec![]);
        }
        Ok(vec![Finding::new(
            Tag::rule(ID),
            self.severity(),
            format!("Use only builtin actions ({module})."),
        )
        .in_document(doc)
        .at(task.line(), task.path.clone())])
    }
}
