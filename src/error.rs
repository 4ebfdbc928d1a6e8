//! Error types for playlint operations.
//!
//! This module defines [`LintError`], the primary error type used throughout
//! the library, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Structural misconfiguration (duplicate rule ids, invalid kind tables,
//!   unreadable configuration) is fatal and surfaces as `LintError`
//! - Per-document and per-rule failures are recovered inside the engines:
//!   they become a finding, a skipped fix, or a logged warning
//! - Use `anyhow::Error` (via `LintError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for playlint operations.
#[derive(Debug, Error)]
pub enum LintError {
    /// No kind pattern matched a document path.
    #[error("No kind pattern matches {path}")]
    UnknownKind { path: PathBuf },

    /// Two rules were registered under the same id.
    #[error("Rule '{id}' is already registered")]
    DuplicateRule { id: String },

    /// A rule failed while matching a document.
    #[error("Rule '{rule}' failed on {path}: {message}")]
    RuleInternal {
        rule: String,
        path: PathBuf,
        message: String,
    },

    /// A fix target no longer resolves in the document tree.
    #[error("Path {yaml_path} no longer resolves in {path}")]
    StalePath { path: PathBuf, yaml_path: String },

    /// A module reference could not be resolved to a canonical name.
    #[error("Unable to resolve FQCN for module {reference}")]
    UnresolvedReference { reference: String },

    /// A kind table entry holds a pattern that does not compile.
    #[error("Invalid pattern '{pattern}' for kind '{kind}': {message}")]
    InvalidKindPattern {
        kind: String,
        pattern: String,
        message: String,
    },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidation { message: String },

    /// Failed to parse a document.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for playlint operations.
pub type Result<T> = std::result::Result<T, LintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_displays_path() {
        let err = LintError::UnknownKind {
            path: PathBuf::from("docs/notes.txt"),
        };
        assert!(err.to_string().contains("docs/notes.txt"));
    }

    #[test]
    fn duplicate_rule_displays_id() {
        let err = LintError::DuplicateRule { id: "fqcn".into() };
        assert_eq!(err.to_string(), "Rule 'fqcn' is already registered");
    }

    #[test]
    fn rule_internal_displays_rule_path_and_message() {
        let err = LintError::RuleInternal {
            rule: "fqcn".into(),
            path: PathBuf::from("site.yml"),
            message: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("fqcn"));
        assert!(msg.contains("site.yml"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn stale_path_displays_yaml_path() {
        let err = LintError::StalePath {
            path: PathBuf::from("site.yml"),
            yaml_path: "[0].tasks[2]".into(),
        };
        assert!(err.to_string().contains("[0].tasks[2]"));
    }

    #[test]
    fn unresolved_reference_displays_reference() {
        let err = LintError::UnresolvedReference {
            reference: "mystery_module".into(),
        };
        assert!(err.to_string().contains("mystery_module"));
    }

    #[test]
    fn invalid_kind_pattern_displays_kind_and_pattern() {
        let err = LintError::InvalidKindPattern {
            kind: "rulebook".into(),
            pattern: "**/rulebooks/*.{yml,yaml".into(),
            message: "unclosed alternate group".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("rulebook"));
        assert!(msg.contains("**/rulebooks/*.{yml,yaml"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: LintError = io_err.into();
        assert!(matches!(err, LintError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(LintError::ConfigValidation {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
