//! Configuration loading and built-in tables for playlint.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - The ordered kind classification tables in [`kinds`]
//! - Rule profiles in [`profiles`]
//!
//! # Example
//!
//! ```
//! use playlint::config::{load_options, Options};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".ansible-lint"), "write_list: [fqcn]").unwrap();
//!
//! let options = load_options(temp.path(), None).unwrap();
//! assert!(options.fixes_enabled());
//! ```
//!
//! # Configuration File Locations
//!
//! The first existing file wins:
//! 1. `.ansible-lint`
//! 2. `.ansible-lint.yml` / `.ansible-lint.yaml`
//! 3. `.config/ansible-lint.yml` / `.config/ansible-lint.yaml`

pub mod kinds;
pub mod loader;
pub mod profiles;
pub mod schema;

pub use kinds::{effective_kinds, DEFAULT_KINDS};
pub use loader::{
    find_config_file, find_project_root, load_options, load_options_file, parse_options,
    CONFIG_CANDIDATES,
};
pub use profiles::{find_profile, profile_rules, Profile, PROFILES};
pub use schema::{KindEntry, Options};
