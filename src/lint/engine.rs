//! Rule evaluation.
//!
//! The [`Evaluator`] runs every rule of a registry against documents and
//! turns the raw matches into the final, ordered finding list:
//!
//! 1. Per document, per rule in registry order: the document matcher, the
//!    play matcher once per play, then the task matcher once per task.
//! 2. A matcher that fails or panics yields one `internal-error` finding
//!    and the engine moves on to the next rule.
//! 3. Findings suppressed by `# noqa` or by a skipped sub-tag are dropped,
//!    levels are assigned from `warn_list`, duplicates collapse and the
//!    result is sorted by file, line and rule id.

use rayon::prelude::*;
use regex::Regex;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::LazyLock;

use super::finding::{Finding, Tag, INTERNAL_ERROR, LOAD_FAILURE};
use super::registry::RuleRegistry;
use super::rule::{Level, Rule, RuleId, Severity};
use crate::config::Options;
use crate::document::{Document, Kind};
use crate::error::LintError;

static NOQA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*noqa:\s*([^#]*)").expect("valid noqa pattern"));

/// Runs rules over documents.
pub struct Evaluator<'a> {
    options: &'a Options,
    skipped_tags: Vec<Tag>,
}

impl<'a> Evaluator<'a> {
    pub fn new(options: &'a Options) -> Self {
        let skipped_tags = options
            .skip_list
            .iter()
            .filter(|name| name.contains('['))
            .map(|name| Tag::parse(name))
            .collect();
        Self {
            options,
            skipped_tags,
        }
    }

    /// Evaluate `documents` with one registry, in order.
    pub fn evaluate(&self, documents: &[Document], registry: &mut RuleRegistry) -> Vec<Finding> {
        let mut findings = Vec::new();
        for doc in documents {
            findings.extend(evaluate_document(doc, registry));
        }
        let rule_tags = rule_tags(registry);
        self.finish(findings, documents, &rule_tags)
    }

    /// Evaluate `documents` across worker threads.
    ///
    /// Every worker builds its own registry with `factory`, so rule state is
    /// never shared between threads. The result is identical to
    /// [`Evaluator::evaluate`] with one registry from the same factory.
    pub fn evaluate_parallel<F>(&self, documents: &[Document], factory: F) -> Vec<Finding>
    where
        F: Fn() -> RuleRegistry + Sync,
    {
        let per_document: Vec<Vec<Finding>> = documents
            .par_iter()
            .map_init(&factory, |registry, doc| evaluate_document(doc, registry))
            .collect();
        let rule_tags = rule_tags(&factory());
        self.finish(per_document.into_iter().flatten().collect(), documents, &rule_tags)
    }

    fn finish(
        &self,
        findings: Vec<Finding>,
        documents: &[Document],
        rule_tags: &HashMap<RuleId, Vec<&'static str>>,
    ) -> Vec<Finding> {
        let by_path: HashMap<&Path, &Document> =
            documents.iter().map(|doc| (doc.path(), doc)).collect();

        let mut seen = HashSet::new();
        let mut kept: Vec<Finding> = Vec::new();
        for mut finding in findings {
            if self.skipped_tags.contains(&finding.tag) {
                continue;
            }
            if let Some(doc) = by_path.get(finding.file()) {
                if is_suppressed(doc, &finding) {
                    tracing::debug!(tag = %finding.tag, line = finding.line, "Suppressed by noqa");
                    continue;
                }
            }
            finding.level = self.level_for(&finding, rule_tags);
            let key = (
                finding.file.clone(),
                finding.line,
                finding.tag.clone(),
                finding.message.clone(),
            );
            if seen.insert(key) {
                kept.push(finding);
            }
        }

        kept.sort_by(|a, b| {
            (a.file(), a.line, a.rule_id()).cmp(&(b.file(), b.line, b.rule_id()))
        });
        kept
    }

    fn level_for(&self, finding: &Finding, rule_tags: &HashMap<RuleId, Vec<&'static str>>) -> Level {
        let warn = &self.options.warn_list;
        let full_tag = finding.tag.to_string();
        let tags = rule_tags.get(finding.rule_id()).map(Vec::as_slice).unwrap_or(&[]);
        let listed = warn.iter().any(|name| {
            name == finding.rule_id().as_str()
                || *name == full_tag
                || tags.contains(&name.as_str())
        });
        if listed {
            Level::Warning
        } else {
            Level::Error
        }
    }
}

fn rule_tags(registry: &RuleRegistry) -> HashMap<RuleId, Vec<&'static str>> {
    registry
        .iter()
        .map(|rule| (rule.id(), rule.tags().to_vec()))
        .collect()
}

/// Raw findings of every rule on one document, before post-processing.
pub fn evaluate_document(doc: &Document, registry: &mut RuleRegistry) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(message) = doc.parse_error() {
        tracing::warn!(path = %doc.path().display(), "Failed to parse: {}", message);
        findings.push(
            Finding::new(
                Tag::rule(LOAD_FAILURE),
                Severity::VeryHigh,
                "Failed to load or parse file.",
            )
            .in_document(doc)
            .at(1, Default::default())
            .with_details(message),
        );
    }

    // Broken and unclassified documents only get document-level checks.
    let structured = doc.parse_error().is_none() && doc.kind() != Kind::Unknown;
    let plays = if structured { doc.plays() } else { Vec::new() };
    let tasks = if structured { doc.tasks() } else { Vec::new() };

    for rule in registry.iter_mut() {
        let rule: &mut dyn Rule = rule.as_mut();
        let id = rule.id();
        let caps = rule.capabilities();
        let mut found = Vec::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if caps.document {
                found.extend(rule.match_document(doc)?);
            }
            if caps.play {
                for play in &plays {
                    found.extend(rule.match_play(doc, play)?);
                }
            }
            if caps.task {
                for task in &tasks {
                    found.extend(rule.match_task(doc, task)?);
                }
            }
            Ok::<(), super::rule::RuleError>(())
        }));

        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        for finding in &mut found {
            if finding.file.as_os_str().is_empty() {
                finding.file = doc.path().to_path_buf();
            }
        }
        findings.extend(found);

        if let Some(message) = failure {
            let err = LintError::RuleInternal {
                rule: id.0.clone(),
                path: doc.path().to_path_buf(),
                message,
            };
            tracing::warn!(rule = %id, "{}", err);
            findings.push(
                Finding::new(Tag::rule(INTERNAL_ERROR), Severity::VeryHigh, err.to_string())
                    .in_document(doc)
                    .at(1, Default::default()),
            );
        }
    }
    findings
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "rule panicked".to_string()
    }
}

/// Whether a `# noqa: ...` comment on the finding's line lists its rule id
/// or its tag.
fn is_suppressed(doc: &Document, finding: &Finding) -> bool {
    let Some(line) = doc.line_text(finding.line) else {
        return false;
    };
    let Some(captures) = NOQA.captures(line) else {
        return false;
    };
    let tag = finding.tag.to_string();
    captures[1]
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|name| !name.is_empty())
        .any(|name| name == finding.rule_id().as_str() || name == tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Play, Task};
    use crate::lint::{Capabilities, RuleError};
    use std::sync::{Arc, Mutex};

    /// Reports every task, failing or panicking on marker modules.
    struct Probe {
        id: &'static str,
        caps: Capabilities,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Probe {
        fn new(id: &'static str, caps: Capabilities) -> Box<dyn Rule> {
            Self::logged(id, caps, Arc::default())
        }

        fn logged(
            id: &'static str,
            caps: Capabilities,
            log: Arc<Mutex<Vec<String>>>,
        ) -> Box<dyn Rule> {
            Box::new(Self { id, caps, log })
        }

        fn record(&self, call: String) {
            self.log.lock().unwrap().push(call);
        }
    }

    impl Rule for Probe {
        fn id(&self) -> RuleId {
            RuleId::new(self.id)
        }
        fn description(&self) -> &str {
            "probe"
        }
        fn severity(&self) -> Severity {
            Severity::Low
        }
        fn tags(&self) -> &[&'static str] {
            &["probe-tag"]
        }
        fn capabilities(&self) -> Capabilities {
            self.caps
        }
        fn match_document(&mut self, _doc: &Document) -> Result<Vec<Finding>, RuleError> {
            self.record(format!("{} document", self.id));
            Ok(vec![])
        }
        fn match_play(&mut self, _doc: &Document, play: &Play<'_>) -> Result<Vec<Finding>, RuleError> {
            self.record(format!("{} play {}", self.id, play.index));
            Ok(vec![])
        }
        fn match_task(&mut self, _doc: &Document, task: &Task<'_>) -> Result<Vec<Finding>, RuleError> {
            self.record(format!("{} task {}", self.id, task.action.module));
            match task.action.module.as_str() {
                "fail" => Err(RuleError::Message("boom".into())),
                "panic" => panic!("probe panicked"),
                module => Ok(vec![Finding::new(
                    Tag::sub(self.id, "seen"),
                    Severity::Low,
                    format!("saw {module}"),
                )
                .at(task.line(), task.path.clone())]),
            }
        }
    }

    fn tasks_doc(text: &str) -> Document {
        Document::with_kind("tasks.yml", Kind::Tasks, text)
    }

    fn registry_of(rules: Vec<Box<dyn Rule>>) -> RuleRegistry {
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.register(rule).unwrap();
        }
        registry
    }

    #[test]
    fn invokes_granularities_in_order() {
        let doc = Document::with_kind(
            "site.yml",
            Kind::Playbook,
            "- hosts: a\n  tasks:\n    - ping:\n- hosts: b\n  tasks:\n    - debug:\n",
        );
        let log = Arc::new(Mutex::new(Vec::new()));
        let caps = Capabilities::none().document().play().task();
        let mut registry = registry_of(vec![
            Probe::logged("one", caps, log.clone()),
            Probe::logged("two", Capabilities::none().task(), log.clone()),
        ]);

        evaluate_document(&doc, &mut registry);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "one document",
                "one play 0",
                "one play 1",
                "one task ping",
                "one task debug",
                "two task ping",
                "two task debug",
            ]
        );
    }

    #[test]
    fn undeclared_matchers_are_not_called() {
        let doc = tasks_doc("- ping:\n");
        let mut registry = registry_of(vec![Probe::new("probe", Capabilities::none().document())]);
        let findings = evaluate_document(&doc, &mut registry);
        assert!(findings.is_empty());
    }

    #[test]
    fn failing_rule_becomes_internal_error() {
        let doc = tasks_doc("- ping:\n- fail:\n- debug:\n");
        let mut registry = registry_of(vec![
            Probe::new("first", Capabilities::none().task()),
            Probe::new("second", Capabilities::none().task()),
        ]);
        let options = Options::default();

        let findings = Evaluator::new(&options).evaluate(std::slice::from_ref(&doc), &mut registry);

        let internal: Vec<_> = findings
            .iter()
            .filter(|f| f.rule_id().as_str() == INTERNAL_ERROR)
            .collect();
        assert_eq!(internal.len(), 2);
        assert!(internal[0].message.contains("boom"));
        // Findings made before the failure are kept; later tasks are skipped.
        assert_eq!(findings.iter().filter(|f| f.message == "saw ping").count(), 2);
        assert!(!findings.iter().any(|f| f.message == "saw debug"));
    }

    #[test]
    fn panicking_rule_becomes_internal_error() {
        let doc = tasks_doc("- panic:\n");
        let mut registry = registry_of(vec![Probe::new("probe", Capabilities::none().task())]);

        let findings = evaluate_document(&doc, &mut registry);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tag.to_string(), INTERNAL_ERROR);
        assert!(findings[0].message.contains("probe panicked"));
    }

    #[test]
    fn broken_document_yields_load_failure() {
        let doc = tasks_doc("- ping: [oops\n");
        let mut registry = registry_of(vec![Probe::new("probe", Capabilities::none().task())]);

        let findings = evaluate_document(&doc, &mut registry);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tag.to_string(), LOAD_FAILURE);
    }

    #[test]
    fn duplicates_collapse_and_output_is_sorted() {
        let a = Document::with_kind("b.yml", Kind::Tasks, "- ping:\n- ping:\n");
        let b = Document::with_kind("a.yml", Kind::Tasks, "- debug:\n");
        let mut registry = registry_of(vec![Probe::new("probe", Capabilities::none().task())]);
        let options = Options::default();

        let findings = Evaluator::new(&options).evaluate(&[a, b], &mut registry);

        let summary: Vec<_> = findings
            .iter()
            .map(|f| (f.file().to_string_lossy().into_owned(), f.line))
            .collect();
        assert_eq!(
            summary,
            vec![("a.yml".into(), 1), ("b.yml".into(), 1), ("b.yml".into(), 2)]
        );
    }

    #[test]
    fn identical_findings_are_deduplicated() {
        let finding = Finding::new(Tag::sub("x", "y"), Severity::Low, "same").in_file("a.yml");
        let options = Options::default();
        let findings = Evaluator::new(&options).finish(
            vec![finding.clone(), finding],
            &[],
            &HashMap::new(),
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn noqa_suppresses_listed_tags() {
        let doc = tasks_doc("- ping:  # noqa: probe[seen]\n- debug:  # noqa: other\n");
        let mut registry = registry_of(vec![Probe::new("probe", Capabilities::none().task())]);
        let options = Options::default();

        let findings = Evaluator::new(&options).evaluate(std::slice::from_ref(&doc), &mut registry);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "saw debug");
    }

    #[test]
    fn skipped_sub_tags_are_dropped() {
        let doc = tasks_doc("- ping:\n");
        let mut registry = registry_of(vec![Probe::new("probe", Capabilities::none().task())]);
        let options = Options {
            skip_list: vec!["probe[seen]".into()],
            ..Default::default()
        };

        let findings = Evaluator::new(&options).evaluate(std::slice::from_ref(&doc), &mut registry);

        assert!(findings.is_empty());
    }

    #[test]
    fn warn_list_sets_level() {
        let doc = tasks_doc("- ping:\n");
        let options = Options {
            warn_list: vec!["probe-tag".into()],
            ..Default::default()
        };
        let mut registry = registry_of(vec![Probe::new("probe", Capabilities::none().task())]);

        let findings = Evaluator::new(&options).evaluate(std::slice::from_ref(&doc), &mut registry);

        assert_eq!(findings[0].level, Level::Warning);
        assert!(!findings[0].is_fatal());
    }

    #[test]
    fn unknown_kind_runs_document_matchers_only() {
        let doc = Document::with_kind("README", Kind::Unknown, "- ping:\n");
        let mut registry = registry_of(vec![Probe::new(
            "probe",
            Capabilities::none().document().task(),
        )]);

        let findings = evaluate_document(&doc, &mut registry);

        assert!(findings.is_empty());
    }

    #[test]
    fn parallel_matches_sequential() {
        let docs: Vec<Document> = (0..8)
            .map(|i| Document::with_kind(format!("t{i}.yml"), Kind::Tasks, "- ping:\n- debug:\n"))
            .collect();
        let options = Options::default();
        let factory = || registry_of(vec![Probe::new("probe", Capabilities::none().task())]);
        let evaluator = Evaluator::new(&options);

        let sequential = evaluator.evaluate(&docs, &mut factory());
        let parallel = evaluator.evaluate_parallel(&docs, factory);

        assert_eq!(sequential, parallel);
    }
}
