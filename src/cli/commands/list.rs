//! List command implementation.
//!
//! `playlint --list-rules` prints every registered rule and
//! `playlint --list-tags` prints every tag with the rules carrying it.

use console::style;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::args::Cli;
use crate::config::load_options;
use crate::error::Result;
use crate::lint::RuleRegistry;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    args: Cli,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, args: Cli) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    fn write_rules(&self, registry: &RuleRegistry, out: &mut dyn Write) -> std::io::Result<()> {
        for rule in registry.list_rules() {
            writeln!(
                out,
                "{}: {}",
                style(rule.id.as_str()).bold(),
                rule.description
            )?;
            writeln!(
                out,
                "  {} {}  {} {}",
                style("severity:").dim(),
                rule.severity,
                style("tags:").dim(),
                rule.tags.join(", ")
            )?;
        }
        Ok(())
    }

    fn write_tags(&self, registry: &RuleRegistry, out: &mut dyn Write) -> std::io::Result<()> {
        for (tag, rules) in registry.list_tags() {
            let ids: Vec<&str> = rules.iter().map(|id| id.as_str()).collect();
            writeln!(out, "{}: {}", style(tag).bold(), ids.join(", "))?;
        }
        Ok(())
    }
}

impl Command for ListCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let mut options = load_options(&self.project_root, self.args.config.as_deref())?;
        self.args.apply_to(&mut options);
        let registry = RuleRegistry::with_builtins(&options);

        if self.args.list_rules {
            self.write_rules(&registry, out)?;
        }
        if self.args.list_tags {
            self.write_tags(&registry, out)?;
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn run(flag: &str) -> String {
        console::set_colors_enabled(false);
        let temp = TempDir::new().unwrap();
        let cmd = ListCommand::new(temp.path(), Cli::parse_from(["playlint", flag]));
        let mut out = Vec::new();
        assert!(cmd.execute(&mut out).unwrap().success);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn lists_rules() {
        insta::assert_snapshot!(run("-L"), @r"
        fqcn: Check whether actions are using fully qualified collection names
          severity: medium  tags: formatting
        only-builtins: Check whether the playbook uses anything but ansible.builtin
          severity: medium  tags: opt-in, experimental
        ");
    }

    #[test]
    fn lists_tags() {
        insta::assert_snapshot!(run("-T"), @r"
        experimental: only-builtins
        formatting: fqcn
        opt-in: only-builtins
        ");
    }
}
