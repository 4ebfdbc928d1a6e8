//! Configuration file discovery and loading.
//!
//! This module finds the linter configuration for a project and parses it
//! into [`Options`].

use crate::config::schema::Options;
use crate::error::{LintError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file locations relative to the project root, in priority order.
pub const CONFIG_CANDIDATES: &[&str] = &[
    ".ansible-lint",
    ".ansible-lint.yml",
    ".ansible-lint.yaml",
    ".config/ansible-lint.yml",
    ".config/ansible-lint.yaml",
];

/// Find the first existing config file under `project_dir`.
pub fn find_config_file(project_dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| project_dir.join(candidate))
        .find(|path| path.is_file())
}

/// Find the project root by walking up from `start`.
///
/// Looks for a directory holding one of the config candidates, then for a
/// `.git` directory.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if find_config_file(&current).is_some() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Parse YAML content into [`Options`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_options(content: &str, source_path: &Path) -> Result<Options> {
    if content.trim().is_empty() {
        return Ok(Options::default());
    }
    serde_yaml::from_str(content).map_err(|e| LintError::ConfigParse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `ConfigParse` if the YAML
/// is invalid.
pub fn load_options_file(path: &Path) -> Result<Options> {
    let content = fs::read_to_string(path)?;
    parse_options(&content, path)
}

/// Load the configuration for `project_dir`.
///
/// An explicit `config_override` is loaded as-is. Otherwise the first
/// discovered config file is used, falling back to defaults. The
/// resulting `project_dir` always points at the directory that was linted.
pub fn load_options(project_dir: &Path, config_override: Option<&Path>) -> Result<Options> {
    let mut options = match config_override {
        Some(path) => load_options_file(path)?,
        None => match find_config_file(project_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration");
                load_options_file(&path)?
            }
            None => Options::default(),
        },
    };
    options.project_dir = project_dir.to_path_buf();
    Ok(options)
}
