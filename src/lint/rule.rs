//! Lint rule definitions.
//!
//! This module provides the core traits and types for defining lint rules:
//!
//! - [`Rule`] - The trait that all lint rules must implement
//! - [`RuleId`] - Unique identifier for a lint rule
//! - [`Severity`] - How serious a violation is
//! - [`Level`] - Whether a finding is fatal
//! - [`Capabilities`] - Which entry points a rule implements

use serde::Serialize;
use thiserror::Error;

use super::finding::Finding;
use crate::document::{Document, EditError, NodeMut, Play, Task};

/// Unique identifier for a lint rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl RuleId {
    /// Create a new rule ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::VeryLow => write!(f, "very_low"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::VeryHigh => write!(f, "very_high"),
        }
    }
}

/// Whether a finding fails the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warning,
    #[default]
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// The entry points a rule implements.
///
/// The engine only calls the matchers and the fixer a rule declares here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub document: bool,
    pub play: bool,
    pub task: bool,
    pub fix: bool,
}

impl Capabilities {
    pub const fn none() -> Self {
        Self {
            document: false,
            play: false,
            task: false,
            fix: false,
        }
    }

    pub const fn document(mut self) -> Self {
        self.document = true;
        self
    }

    pub const fn play(mut self) -> Self {
        self.play = true;
        self
    }

    pub const fn task(mut self) -> Self {
        self.task = true;
        self
    }

    pub const fn fix(mut self) -> Self {
        self.fix = true;
        self
    }
}

/// A matcher failed unexpectedly.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A fix could not be applied.
#[derive(Debug, Error)]
pub enum FixError {
    #[error("finding carries no fix parameters")]
    MissingPayload,

    #[error("rule cannot fix '{0}'")]
    Unsupported(String),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// A lint rule that checks documents.
///
/// Rules are stateful: matchers take `&mut self` so a rule can keep
/// caches for the lifetime of a run. A rule instance is only ever used by
/// one worker at a time.
pub trait Rule: Send {
    /// Unique identifier for this rule.
    fn id(&self) -> RuleId;

    /// Description of what this rule checks.
    fn description(&self) -> &str;

    /// Default severity for findings of this rule.
    fn severity(&self) -> Severity;

    /// Tags used for selection, e.g. `formatting` or `opt-in`.
    fn tags(&self) -> &[&'static str];

    /// Sub-tags this rule may emit, e.g. `action-core`.
    fn sub_tags(&self) -> &[&'static str] {
        &[]
    }

    /// The entry points this rule implements.
    fn capabilities(&self) -> Capabilities;

    /// Check a whole document.
    fn match_document(&mut self, _doc: &Document) -> Result<Vec<Finding>, RuleError> {
        Ok(vec![])
    }

    /// Check one play of a playbook.
    fn match_play(&mut self, _doc: &Document, _play: &Play<'_>) -> Result<Vec<Finding>, RuleError> {
        Ok(vec![])
    }

    /// Check one task-like node.
    fn match_task(&mut self, _doc: &Document, _task: &Task<'_>) -> Result<Vec<Finding>, RuleError> {
        Ok(vec![])
    }

    /// Sub-tags the fixer handles. Fixes are never attempted for others.
    fn fixable_tags(&self) -> &[&'static str] {
        &[]
    }

    /// Fix the node a finding was computed against.
    ///
    /// The fixer only mutates; marking the finding fixed is left to the
    /// transform engine once the result re-parses.
    fn fix(&mut self, finding: &Finding, _node: &mut NodeMut<'_>) -> Result<(), FixError> {
        Err(FixError::Unsupported(finding.tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_id_equality() {
        let id1 = RuleId::new("test-rule");
        let id2 = RuleId::new("test-rule");
        let id3 = RuleId::new("other-rule");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn rule_id_display() {
        let id = RuleId::new("my-rule");
        assert_eq!(format!("{}", id), "my-rule");
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::VeryLow < Severity::Low);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::VeryHigh);
    }

    #[test]
    fn severity_display() {
        assert_eq!(format!("{}", Severity::Medium), "medium");
        assert_eq!(format!("{}", Severity::VeryHigh), "very_high");
    }

    #[test]
    fn level_defaults_to_error() {
        assert_eq!(Level::default(), Level::Error);
        assert_eq!(Level::Warning.to_string(), "warning");
    }

    #[test]
    fn capabilities_builder() {
        let caps = Capabilities::none().task().fix();
        assert!(caps.task && caps.fix);
        assert!(!caps.document && !caps.play);
    }
}
