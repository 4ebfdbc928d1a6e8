//! Playlint - Static analysis and auto-fixing for ansible content.
//!
//! Playlint loads playbooks, task files and related YAML documents,
//! evaluates a registry of rules against them and optionally rewrites
//! the offending nodes while preserving the original formatting.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Options loading, profiles and file kinds
//! - [`document`] - Document model, traversal and text edits
//! - [`error`] - Error types and result aliases
//! - [`lint`] - Rules, evaluation engine, fixes and output
//!
//! # Example
//!
//! ```
//! use playlint::config::parse_options;
//! use std::path::Path;
//!
//! let options = parse_options("warn_list:\n  - only-builtins\n", Path::new(".ansible-lint")).unwrap();
//! assert_eq!(options.warn_list, vec!["only-builtins".to_string()]);
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod lint;

pub use error::{LintError, Result};
