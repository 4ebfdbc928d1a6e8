//! Lintable file discovery.
//!
//! Explicit file arguments are always linted. Directories are walked and
//! only files the classifier recognizes are kept. Anything matching an
//! `exclude_paths` glob, or living below a matching directory, is dropped.
//! Exclude patterns are matched against the path relative to the project
//! directory as well as the path as given.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Options;
use crate::document::{Classifier, Kind};
use crate::error::{LintError, Result};

/// Directories that are never descended into.
const SKIPPED_DIRS: &[&str] = &[".git", ".tox", ".venv", "__pycache__", "node_modules"];

/// Compiled `exclude_paths`.
#[derive(Debug, Clone)]
pub struct Excludes {
    set: GlobSet,
}

impl Excludes {
    /// Compile exclude patterns. Each pattern also excludes everything below it.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.trim_end_matches('/');
            for candidate in [pattern.to_string(), format!("{}/**", pattern)] {
                let glob = Glob::new(&candidate).map_err(|e| LintError::ConfigValidation {
                    message: format!("Invalid exclude_paths entry '{}': {}", pattern, e),
                })?;
                builder.add(glob);
            }
        }
        let set = builder.build().map_err(|e| LintError::ConfigValidation {
            message: format!("Invalid exclude_paths: {}", e),
        })?;
        Ok(Self { set })
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }

    /// Whether `path`, as given or relative to `project_dir`, is excluded.
    pub fn is_excluded_in(&self, path: &Path, project_dir: &Path) -> bool {
        let relative = normalize(path.strip_prefix(project_dir).unwrap_or(path));
        self.is_excluded(path) || (!relative.as_os_str().is_empty() && self.is_excluded(&relative))
    }
}

/// Drop a leading `./` so paths match kind patterns.
fn normalize(path: &Path) -> PathBuf {
    path.strip_prefix(".").unwrap_or(path).to_path_buf()
}

/// Files to lint below `paths`, sorted and without duplicates.
pub fn discover(paths: &[PathBuf], options: &Options, classifier: &Classifier) -> Result<Vec<PathBuf>> {
    let excludes = Excludes::new(&options.exclude_paths)?;
    let mut found = BTreeSet::new();

    for root in paths {
        let root = normalize(root);
        if root.is_file() {
            if !excludes.is_excluded_in(&root, &options.project_dir) {
                found.insert(root);
            }
            continue;
        }

        let start = if root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            root.as_path()
        };
        let walker = WalkDir::new(start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let path = normalize(entry.path());
                let skipped = entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| SKIPPED_DIRS.contains(&name));
                !skipped
                    && (path.as_os_str().is_empty()
                        || !excludes.is_excluded_in(&path, &options.project_dir))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to access directory entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = normalize(entry.path());
            match classifier.classify(&path) {
                Ok(Kind::Unknown) => {}
                Ok(kind) => {
                    tracing::debug!(path = %path.display(), kind = %kind, "Discovered file");
                    found.insert(path);
                }
                Err(err) => tracing::warn!(path = %path.display(), "{}", err),
            }
        }
    }

    tracing::info!("Discovered {} lintable file(s)", found.len());
    Ok(found.into_iter().collect())
}
