//! Library integration tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use playlint::config::Options;
use playlint::document::{Document, Kind};
use playlint::lint::{
    Capabilities, DocumentWriter, Evaluator, Finding, JsonFormatter, LintFormatter,
    ModuleResolver, RuleError, RuleId, RuleRegistry, Severity, Tag, Transformer,
};
use playlint::{LintError, Result};

const PLAYBOOK: &str = "\
- hosts: all
  tasks:
    - name: Install httpd
      yum:
        name: httpd
    - name: Say hi
      shell: echo hi
      register: out
";

#[derive(Default)]
struct MemoryWriter {
    written: Vec<(PathBuf, String)>,
}

impl DocumentWriter for MemoryWriter {
    fn write(&mut self, doc: &Document) -> Result<()> {
        self.written
            .push((doc.path().to_path_buf(), doc.text().to_string()));
        Ok(())
    }
}

fn evaluate(options: &Options, docs: &[Document]) -> Vec<Finding> {
    let mut registry = RuleRegistry::with_builtins(options);
    let selection = registry.select(options).unwrap();
    registry.filter(&selection);
    Evaluator::new(options).evaluate(docs, &mut registry)
}

fn tags(findings: &[Finding]) -> Vec<String> {
    findings.iter().map(|f| f.tag.to_string()).collect()
}

#[test]
fn error_types_are_public() {
    let err = LintError::DuplicateRule { id: "fqcn".into() };
    assert!(err.to_string().contains("fqcn"));
}

#[test]
fn scenario_unqualified_builtin() {
    let docs = vec![Document::with_kind(
        "tasks.yml",
        Kind::Tasks,
        "- name: Install\n  yum:\n    name: httpd\n",
    )];

    let findings = evaluate(&Options::default(), &docs);

    assert_eq!(tags(&findings), vec!["fqcn[action-core]"]);
    assert_eq!(
        findings[0].details.as_deref(),
        Some("Use `ansible.builtin.yum` or `ansible.legacy.yum` instead.")
    );
}

#[test]
fn scenario_qualified_collection_module() {
    let docs = vec![Document::with_kind(
        "tasks.yml",
        Kind::Tasks,
        "- name: Foo\n  community.general.foo:\n    bar: 1\n",
    )];

    assert!(evaluate(&Options::default(), &docs).is_empty());
}

#[test]
fn scenario_collections_keyword() {
    let docs = vec![Document::with_kind(
        "site.yml",
        Kind::Playbook,
        "- hosts: all\n  collections:\n    - community.general\n  tasks:\n    - ansible.builtin.ping:\n",
    )];

    let findings = evaluate(&Options::default(), &docs);

    assert_eq!(tags(&findings), vec!["fqcn[keyword]"]);
    assert_eq!(findings[0].line, 1);
}

#[test]
fn scenario_fix_preserves_sibling_order() {
    let options = Options {
        write_list: vec!["all".to_string()],
        ..Default::default()
    };
    let mut docs = vec![Document::with_kind(
        "tasks.yml",
        Kind::Tasks,
        "- name: Say hi # greet\n  shell: \"echo hi\"\n  register: out\n",
    )];
    let mut registry = RuleRegistry::with_builtins(&options);
    let mut findings = Evaluator::new(&options).evaluate(&docs, &mut registry);
    let mut writer = MemoryWriter::default();

    let report =
        Transformer::new(&options).apply_fixes(&mut findings, &mut docs, &mut registry, &mut writer);

    assert_eq!(report.applied, 1);
    assert!(findings[0].is_fixed());
    assert_eq!(
        docs[0].text(),
        "- name: Say hi # greet\n  ansible.builtin.shell: \"echo hi\"\n  register: out\n"
    );
    assert_eq!(writer.written.len(), 1);
}

const TAGGED_TASKS: &str = "\
- name: Set secret
  ansible.builtin.set_fact:
    password: !vault |
      $ANSIBLE_VAULT;1.1;AES256
      6162
- name: Say hi
  shell: echo hi
  environment: &env
    LANG: C
- name: List
  ansible.builtin.command: ls
  environment:
    <<: *env
    TZ: UTC
";

#[test]
fn tags_and_anchors_are_linted_and_fixed() {
    let options = Options {
        write_list: vec!["all".to_string()],
        ..Default::default()
    };
    let mut docs = vec![Document::with_kind("tasks.yml", Kind::Tasks, TAGGED_TASKS)];
    assert!(docs[0].parse_error().is_none());

    let mut registry = RuleRegistry::with_builtins(&options);
    let mut findings = Evaluator::new(&options).evaluate(&docs, &mut registry);
    assert_eq!(tags(&findings), vec!["fqcn[action-core]"]);
    assert_eq!(findings[0].line, 6);

    Transformer::new(&options).apply_fixes(
        &mut findings,
        &mut docs,
        &mut registry,
        &mut MemoryWriter::default(),
    );

    assert!(findings[0].is_fixed());
    assert_eq!(
        docs[0].text(),
        TAGGED_TASKS.replace("  shell: echo hi", "  ansible.builtin.shell: echo hi")
    );
    assert!(Evaluator::new(&options)
        .evaluate(&docs, &mut registry)
        .is_empty());
}

#[test]
fn evaluation_is_deterministic() {
    let options = Options::default();
    let docs = vec![
        Document::with_kind("b.yml", Kind::Playbook, PLAYBOOK),
        Document::with_kind("a.yml", Kind::Playbook, PLAYBOOK),
    ];

    let first = evaluate(&options, &docs);
    let second = evaluate(&options, &docs);
    assert_eq!(first, second);

    let render = |findings: &[Finding]| {
        let mut out = Vec::new();
        JsonFormatter::new().format(findings, &mut out).unwrap();
        out
    };
    assert_eq!(render(&first), render(&second));
    assert_eq!(first[0].file(), std::path::Path::new("a.yml"));
}

#[test]
fn fixes_are_idempotent() {
    let options = Options {
        write_list: vec!["fqcn".to_string()],
        ..Default::default()
    };
    let mut docs = vec![Document::with_kind("site.yml", Kind::Playbook, PLAYBOOK)];
    let mut registry = RuleRegistry::with_builtins(&options);
    let mut findings = Evaluator::new(&options).evaluate(&docs, &mut registry);
    assert_eq!(findings.len(), 2);

    Transformer::new(&options).apply_fixes(
        &mut findings,
        &mut docs,
        &mut registry,
        &mut MemoryWriter::default(),
    );
    assert!(findings.iter().all(Finding::is_fixed));

    let again = Evaluator::new(&options).evaluate(&docs, &mut registry);
    assert!(again.is_empty(), "unexpected findings: {:?}", tags(&again));
}

#[test]
fn unmodified_documents_round_trip() {
    let texts = [
        PLAYBOOK,
        "# comment\n---\n- hosts: web   # trailing\n  vars: {a: 1, b: [x, y]}\n  tasks: []\n",
        "key: 'quoted'\nlist:\n  - one\n\n  - two\n",
    ];
    for text in texts {
        let doc = Document::with_kind("doc.yml", Kind::Yaml, text);
        assert_eq!(doc.reserialize(), text);
    }
}

struct CountingResolver {
    calls: Mutex<HashMap<String, usize>>,
}

impl ModuleResolver for CountingResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += 1;
        match name {
            "yum" | "shell" => Some(format!("ansible.builtin.{name}")),
            _ => None,
        }
    }
}

#[test]
fn resolution_runs_once_per_name() {
    let options = Options::default();
    let resolver = Arc::new(CountingResolver {
        calls: Mutex::new(HashMap::new()),
    });
    let mut registry = RuleRegistry::with_resolver(&options, resolver.clone(), None);
    let selection = registry.select(&options).unwrap();
    registry.filter(&selection);
    let text = "- yum: name=a\n- yum: name=b\n- shell: ls\n- yum: name=c\n";
    let docs = vec![
        Document::with_kind("one.yml", Kind::Tasks, text),
        Document::with_kind("two.yml", Kind::Tasks, text),
    ];

    let findings = Evaluator::new(&options).evaluate(&docs, &mut registry);

    assert_eq!(findings.len(), 8);
    let details: Vec<_> = findings
        .iter()
        .filter(|f| f.message.contains("(yum)"))
        .map(|f| f.details.clone())
        .collect();
    assert_eq!(details.len(), 6);
    assert!(details.windows(2).all(|w| w[0] == w[1]));

    let calls = resolver.calls.lock().unwrap();
    assert_eq!(calls.get("yum"), Some(&1));
    assert_eq!(calls.get("shell"), Some(&1));
}

struct Chatty;

impl playlint::lint::Rule for Chatty {
    fn id(&self) -> RuleId {
        RuleId::new("chatty")
    }

    fn description(&self) -> &str {
        "Reports the same thing twice"
    }

    fn severity(&self) -> Severity {
        Severity::Low
    }

    fn tags(&self) -> &[&'static str] {
        &["test"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::none().document()
    }

    fn match_document(&mut self, doc: &Document) -> std::result::Result<Vec<Finding>, RuleError> {
        let finding = Finding::new(Tag::sub("chatty", "again"), Severity::Low, "Hello")
            .in_document(doc)
            .at(1, Default::default());
        Ok(vec![finding.clone(), finding])
    }
}

#[test]
fn duplicate_findings_collapse() {
    let options = Options::default();
    let mut registry = RuleRegistry::new();
    registry.register(Box::new(Chatty)).unwrap();
    let docs = vec![Document::with_kind("a.yml", Kind::Yaml, "a: 1\n")];

    let findings = Evaluator::new(&options).evaluate(&docs, &mut registry);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].tag.to_string(), "chatty[again]");
}

#[test]
fn duplicate_rule_ids_are_rejected() {
    let mut registry = RuleRegistry::new();
    registry.register(Box::new(Chatty)).unwrap();
    let err = registry.register(Box::new(Chatty)).unwrap_err();
    assert!(matches!(err, LintError::DuplicateRule { .. }));
}
