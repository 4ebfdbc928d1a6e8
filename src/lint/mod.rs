//! Playbook linting.
//!
//! This module provides rule-based static analysis of ansible content
//! together with automatic, format-preserving fixes.
//!
//! # Overview
//!
//! The lint system consists of:
//!
//! - **Rules** - Individual checks ([`Rule`] trait)
//! - **Registry** - Ordered collection of rules ([`RuleRegistry`])
//! - **Findings** - Violations with tag, severity and location ([`Finding`])
//! - **Engine** - Runs rules over documents ([`Evaluator`])
//! - **Transform** - Applies rule fixes to documents ([`Transformer`])
//!
//! # Example
//!
//! ```
//! use playlint::config::Options;
//! use playlint::document::{Document, Kind};
//! use playlint::lint::{Evaluator, RuleRegistry};
//!
//! let options = Options::default();
//! let mut registry = RuleRegistry::with_builtins(&options);
//! let docs = vec![Document::with_kind(
//!     "tasks.yml",
//!     Kind::Tasks,
//!     "- name: Install\n  yum:\n    name: httpd\n",
//! )];
//!
//! let findings = Evaluator::new(&options).evaluate(&docs, &mut registry);
//! assert_eq!(findings[0].tag.to_string(), "fqcn[action-core]");
//! ```

pub mod engine;
pub mod finding;
pub mod output;
pub mod registry;
pub mod resolve;
pub mod rule;
pub mod rules;
pub mod transform;

pub use engine::{evaluate_document, Evaluator};
pub use finding::{Finding, FixPayload, Tag, INTERNAL_ERROR, LOAD_FAILURE};
pub use output::{HumanFormatter, JsonFormatter, LintFormatter, OutputFormat, SarifFormatter};
pub use registry::{RuleInfo, RuleRegistry, Selection, OPT_IN};
pub use resolve::{BuiltinResolver, CachingResolver, ModuleResolver, SharedCache};
pub use rule::{Capabilities, FixError, Level, Rule, RuleError, RuleId, Severity};
pub use rules::{FqcnRule, OnlyBuiltinsRule};
pub use transform::{DocumentWriter, FsWriter, TransformReport, Transformer};
