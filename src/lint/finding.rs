//! Lint findings.
//!
//! This module provides the [`Finding`] type for representing violations
//! found in documents, the [`Tag`] that names them, and the typed
//! [`FixPayload`] a matcher attaches for the transform engine.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

use super::rule::{Level, RuleId, Severity};
use crate::document::{Document, YamlPath};

/// Reserved id for matchers that failed unexpectedly.
pub const INTERNAL_ERROR: &str = "internal-error";

/// Reserved id for documents that could not be loaded.
pub const LOAD_FAILURE: &str = "load-failure";

/// A finding tag: `rule-id` or `rule-id[sub-tag]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub rule: RuleId,
    pub sub: Option<String>,
}

impl Tag {
    /// Tag without a sub-tag.
    pub fn rule(rule: impl Into<String>) -> Self {
        Self {
            rule: RuleId::new(rule),
            sub: None,
        }
    }

    /// Tag with a sub-tag.
    pub fn sub(rule: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            rule: RuleId::new(rule),
            sub: Some(sub.into()),
        }
    }

    /// Parse `id` or `id[sub]`.
    pub fn parse(text: &str) -> Self {
        match text.strip_suffix(']').and_then(|t| t.split_once('[')) {
            Some((rule, sub)) => Self::sub(rule, sub),
            None => Self::rule(text),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "{}[{}]", self.rule, sub),
            None => write!(f, "{}", self.rule),
        }
    }
}

impl Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Typed parameters a fixer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FixPayload {
    /// Rename a key of the mapping at the finding's path.
    RenameKey { from: String, to: String },
}

/// A violation produced by a lint rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub tag: Tag,
    pub severity: Severity,
    /// Set by the engine from `warn_list`.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Optional remediation detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// File the finding belongs to.
    pub file: PathBuf,
    /// 1-indexed line, 0 when unknown.
    pub line: usize,
    /// Structural path to the offending node.
    pub path: YamlPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixPayload>,
    fixed: bool,
}

impl Finding {
    /// Create a new finding.
    pub fn new(tag: Tag, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            tag,
            severity,
            level: Level::Error,
            message: message.into(),
            details: None,
            file: PathBuf::new(),
            line: 0,
            path: YamlPath::root(),
            fix: None,
            fixed: false,
        }
    }

    /// Attach to a document.
    pub fn in_document(mut self, doc: &Document) -> Self {
        self.file = doc.path().to_path_buf();
        self
    }

    /// Attach to a file by path.
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    /// Locate at a node.
    pub fn at(mut self, line: usize, path: YamlPath) -> Self {
        self.line = line;
        self.path = path;
        self
    }

    /// Add remediation detail.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach fix parameters.
    pub fn with_fix(mut self, fix: FixPayload) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn rule_id(&self) -> &RuleId {
        &self.tag.rule
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Report the file relative to `base` when it lives below it.
    pub fn relativize(&mut self, base: &Path) {
        if let Ok(relative) = self.file.strip_prefix(base) {
            if !relative.as_os_str().is_empty() {
                self.file = relative.to_path_buf();
            }
        }
    }

    /// Whether the transform engine fixed this finding.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub(crate) fn mark_fixed(&mut self) {
        self.fixed = true;
    }

    /// Whether this finding fails the run.
    pub fn is_fatal(&self) -> bool {
        self.level == Level::Error && !self.fixed
    }

    /// Stable hex fingerprint of path, tag, line and message.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.file.to_string_lossy().as_bytes());
        hasher.update([0]);
        hasher.update(self.tag.to_string().as_bytes());
        hasher.update([0]);
        hasher.update(self.line.to_string().as_bytes());
        hasher.update([0]);
        hasher.update(self.message.as_bytes());
        hex::encode(hasher.finalize())
    }
}
