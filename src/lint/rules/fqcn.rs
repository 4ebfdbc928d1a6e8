//! Fully qualified collection names.
//!
//! This rule flags actions written with a short or non-canonical module
//! name and plays that rely on the `collections` keyword. Short and
//! non-canonical action names can be fixed by renaming the task key.

use crate::config::Options;
use crate::document::{Document, Kind, NodeMut, Play, Task};
use crate::lint::resolve::CachingResolver;
use crate::lint::{
    Capabilities, Finding, FixError, FixPayload, Rule, RuleError, RuleId, Severity, Tag,
};

pub const ID: &str = "fqcn";

const ACTION_CORE: &str = "action-core";
const ACTION: &str = "action";
const CANONICAL: &str = "canonical";
const KEYWORD: &str = "keyword";

/// Requires fully qualified names for actions.
pub struct FqcnRule {
    resolver: CachingResolver,
    canonical_exclusions: Vec<String>,
}

impl FqcnRule {
    pub fn new(options: &Options, resolver: CachingResolver) -> Self {
        Self {
            resolver,
            canonical_exclusions: options.canonical_exclusions.clone(),
        }
    }

    fn finding(&self, doc: &Document, task: &Task<'_>, sub: &str, message: String) -> Finding {
        Finding::new(Tag::sub(ID, sub), self.severity(), message)
            .in_document(doc)
            .at(task.line(), task.path.clone())
    }
}

impl Rule for FqcnRule {
    fn id(&self) -> RuleId {
        RuleId::new(ID)
    }

    fn description(&self) -> &str {
        "Check whether actions are using fully qualified collection names"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn tags(&self) -> &[&'static str] {
        &["formatting"]
    }

    fn sub_tags(&self) -> &[&'static str] {
        &[ACTION_CORE, ACTION, CANONICAL, KEYWORD]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::none().play().task().fix()
    }

    fn match_play(&mut self, doc: &Document, play: &Play<'_>) -> Result<Vec<Finding>, RuleError> {
        if doc.kind() != Kind::Playbook || !play.node.contains_key("collections") {
            return Ok(vec![]);
        }
        Ok(vec![Finding::new(
            Tag::sub(ID, KEYWORD),
            self.severity(),
            "Avoid `collections` keyword by using FQCN for all plugins, modules, roles and playbooks.",
        )
        .in_document(doc)
        .at(play.line(), play.path.clone())])
    }

    fn match_task(&mut self, doc: &Document, task: &Task<'_>) -> Result<Vec<Finding>, RuleError> {
        let module = task.action.module.as_str();
        // Unresolved names are treated as already canonical.
        let Some(target) = self.resolver.resolve(module) else {
            return Ok(vec![]);
        };
        if module == target {
            return Ok(vec![]);
        }

        // Only the `module: args` form names the module by its key.
        let rename = task.action.is_direct().then(|| FixPayload::RenameKey {
            from: module.to_string(),
            to: target.clone(),
        });

        let finding = if let Some(short) = target.strip_prefix("ansible.builtin.") {
            let legacy = format!("ansible.legacy.{short}");
            if module == legacy {
                return Ok(vec![]);
            }
            self.finding(
                doc,
                task,
                ACTION_CORE,
                format!("Use FQCN for builtin module actions ({module})."),
            )
            .with_details(format!("Use `{target}` or `{legacy}` instead."))
        } else if module.matches('.').count() < 2 {
            self.finding(
                doc,
                task,
                ACTION,
                format!("Use FQCN for module actions, such `{target}`."),
            )
            .with_details(format!("Action `{module}` is not FQCN."))
        } else if self
            .canonical_exclusions
            .iter()
            .any(|prefix| module.starts_with(prefix.as_str()))
        {
            return Ok(vec![]);
        } else {
            self.finding(
                doc,
                task,
                CANONICAL,
                format!("You should use canonical module name `{target}` instead of `{module}`."),
            )
        };

        Ok(vec![match rename {
            Some(payload) => finding.with_fix(payload),
            None => finding,
        }])
    }

    fn fixable_tags(&self) -> &[&'static str] {
        &[ACTION_CORE, ACTION, CANONICAL]
    }

    fn fix(&mut self, finding: &Finding, node: &mut NodeMut<'_>) -> Result<(), FixError> {
        match &finding.fix {
            Some(FixPayload::RenameKey { from, to }) => Ok(node.rename_key(from, to)?),
            None => Err(FixError::MissingPayload),
        }
    }
}
