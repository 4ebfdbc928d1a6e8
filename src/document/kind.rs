//! Document kinds and path classification.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::{effective_kinds, KindEntry, Options};
use crate::error::{LintError, Result};

/// Classification of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Jinja2,
    Yaml,
    Text,
    ExecutionEnvironment,
    AnsibleLintConfig,
    AnsibleNavigatorConfig,
    Inventory,
    Requirements,
    Galaxy,
    Reno,
    Vars,
    Tasks,
    Rulebook,
    Playbook,
    Role,
    Handlers,
    TestMeta,
    Meta,
    MetaRuntime,
    RoleArgSpec,
    Changelog,
    SanityIgnoreFile,
    /// No pattern matched; only document-level rules run.
    Unknown,
}

impl Kind {
    const NAMES: &'static [(Kind, &'static str)] = &[
        (Kind::Jinja2, "jinja2"),
        (Kind::Yaml, "yaml"),
        (Kind::Text, "text"),
        (Kind::ExecutionEnvironment, "execution-environment"),
        (Kind::AnsibleLintConfig, "ansible-lint-config"),
        (Kind::AnsibleNavigatorConfig, "ansible-navigator-config"),
        (Kind::Inventory, "inventory"),
        (Kind::Requirements, "requirements"),
        (Kind::Galaxy, "galaxy"),
        (Kind::Reno, "reno"),
        (Kind::Vars, "vars"),
        (Kind::Tasks, "tasks"),
        (Kind::Rulebook, "rulebook"),
        (Kind::Playbook, "playbook"),
        (Kind::Role, "role"),
        (Kind::Handlers, "handlers"),
        (Kind::TestMeta, "test-meta"),
        (Kind::Meta, "meta"),
        (Kind::MetaRuntime, "meta-runtime"),
        (Kind::RoleArgSpec, "role-arg-spec"),
        (Kind::Changelog, "changelog"),
        (Kind::SanityIgnoreFile, "sanity-ignore-file"),
        (Kind::Unknown, "unknown"),
    ];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(kind, _)| kind == self)
            .map_or("unknown", |(_, name)| name)
    }

    /// Kinds whose root is a list of task-like nodes.
    pub fn holds_tasks(&self) -> bool {
        matches!(self, Kind::Tasks | Kind::Handlers)
    }

    /// Kinds whose content is parsed as YAML.
    pub fn is_yaml(&self) -> bool {
        !matches!(
            self,
            Kind::Jinja2 | Kind::Text | Kind::SanityIgnoreFile | Kind::Unknown
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| LintError::ConfigValidation {
                message: format!("Unknown kind '{}'", s),
            })
    }
}

/// An ordered `(name, pattern)` table compiled into one glob set.
#[derive(Debug, Clone)]
pub struct PatternTable {
    names: Vec<String>,
    set: GlobSet,
}

impl PatternTable {
    /// Compile a table. Invalid patterns are fatal.
    pub fn new(entries: &[KindEntry]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for entry in entries {
            let glob = GlobBuilder::new(&entry.pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| LintError::InvalidKindPattern {
                    kind: entry.kind.clone(),
                    pattern: entry.pattern.clone(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| LintError::InvalidKindPattern {
            kind: String::new(),
            pattern: String::new(),
            message: e.to_string(),
        })?;
        Ok(Self {
            names: entries.iter().map(|e| e.kind.clone()).collect(),
            set,
        })
    }

    /// Name of the first entry whose pattern matches `path`.
    pub fn first_match(&self, path: &Path) -> Option<&str> {
        self.set
            .matches(path)
            .into_iter()
            .min()
            .map(|index| self.names[index].as_str())
    }
}

/// Assigns kinds to document paths.
#[derive(Debug, Clone)]
pub struct Classifier {
    kinds: PatternTable,
    require_match: bool,
}

impl Classifier {
    /// Build the classifier for the given configuration.
    ///
    /// Fails when a kind table holds an invalid pattern or an unknown kind.
    pub fn new(options: &Options) -> Result<Self> {
        let entries = effective_kinds(&options.kinds);
        for entry in &entries {
            entry.kind.parse::<Kind>()?;
        }
        Ok(Self {
            kinds: PatternTable::new(&entries)?,
            require_match: options.require_known_kind,
        })
    }

    /// Kind of the first matching pattern.
    ///
    /// Without a match this is `Kind::Unknown`, or `UnknownKind` when the
    /// configuration requires every document to be classified.
    pub fn classify(&self, path: &Path) -> Result<Kind> {
        match self.kinds.first_match(path) {
            Some(name) => name.parse(),
            None if self.require_match => Err(LintError::UnknownKind {
                path: path.to_path_buf(),
            }),
            None => Ok(Kind::Unknown),
        }
    }
}
