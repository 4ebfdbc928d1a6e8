//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::Options;
use crate::lint::OutputFormat;

/// Playlint - Lint and fix playbooks, roles and task files.
#[derive(Debug, Clone, Parser)]
#[command(name = "playlint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to lint (defaults to the project directory)
    pub paths: Vec<PathBuf>,

    /// Path to config file (overrides discovery of .ansible-lint)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project directory (default: nearest parent with a config file or .git)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Restrict rules to a profile
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Only run rules with these ids or tags (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Skip rules, rule tags or finding tags (comma-separated)
    #[arg(short = 'x', long = "skip-list", value_delimiter = ',')]
    pub skip_list: Vec<String>,

    /// Report these rules or tags as warnings only (comma-separated)
    #[arg(short = 'w', long = "warn-list", value_delimiter = ',')]
    pub warn_list: Vec<String>,

    /// Enable opt-in rules (comma-separated)
    #[arg(long = "enable-list", value_delimiter = ',')]
    pub enable_list: Vec<String>,

    /// Apply fixes, optionally only for the given rules or tags
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "all")]
    pub fix: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Fail on warnings too
    #[arg(long)]
    pub strict: bool,

    /// Share one module resolution cache between worker threads
    #[arg(long)]
    pub shared_cache: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List all rules and exit
    #[arg(short = 'L', long)]
    pub list_rules: bool,

    /// List all tags with their rules and exit
    #[arg(short = 'T', long)]
    pub list_tags: bool,
}

impl Cli {
    /// Overlay command-line selections onto loaded options.
    pub fn apply_to(&self, options: &mut Options) {
        options.skip_list.extend(self.skip_list.iter().cloned());
        options.warn_list.extend(self.warn_list.iter().cloned());
        options.enable_list.extend(self.enable_list.iter().cloned());
        options.tags.extend(self.tags.iter().cloned());
        if let Some(ref profile) = self.profile {
            options.profile = Some(profile.clone());
        }
        if let Some(ref fix) = self.fix {
            options.write_list = fix
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        options.strict |= self.strict;
        options.shared_cache |= self.shared_cache;
    }
}
