//! Human-readable output formatter.
//!
//! Formats findings for terminal display with optional color support.

use super::LintFormatter;
use crate::lint::{Finding, Level};
use console::style;
use std::io::Write;

/// Formats lint output for human consumption.
pub struct HumanFormatter {
    /// Whether to use colors (ANSI escape codes).
    pub use_color: bool,
}

impl HumanFormatter {
    /// Create a new human formatter.
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn tag(&self, finding: &Finding) -> String {
        let tag = finding.tag.to_string();
        if !self.use_color {
            return tag;
        }
        match finding.level {
            Level::Error => style(tag).red().bold().to_string(),
            Level::Warning => style(tag).yellow().to_string(),
        }
    }

    fn location(&self, finding: &Finding) -> String {
        let location = if finding.line > 0 {
            format!("{}:{}", finding.file.display(), finding.line)
        } else {
            finding.file.display().to_string()
        };
        if self.use_color {
            style(location).cyan().to_string()
        } else {
            location
        }
    }
}

impl LintFormatter for HumanFormatter {
    fn format<W: Write>(&self, findings: &[Finding], writer: &mut W) -> std::io::Result<()> {
        for finding in findings {
            // Header line: path:line: tag: message
            let mut header = format!(
                "{}: {}: {}",
                self.location(finding),
                self.tag(finding),
                finding.message
            );
            if finding.is_fixed() {
                header.push_str(" (fixed)");
            } else if finding.level == Level::Warning {
                header.push_str(" (warning)");
            }
            writeln!(writer, "{}", header)?;

            if let Some(ref details) = finding.details {
                writeln!(writer, "   = help: {}", details)?;
            }
        }

        let fatal = findings.iter().filter(|f| f.is_fatal()).count();
        let fixed = findings.iter().filter(|f| f.is_fixed()).count();
        let warnings = findings
            .iter()
            .filter(|f| !f.is_fixed() && f.level == Level::Warning)
            .count();

        if !findings.is_empty() {
            writeln!(writer)?;
            writeln!(
                writer,
                "Found {} failure(s), {} warning(s) and {} fixed",
                fatal, warnings, fixed
            )?;
        }

        Ok(())
    }
}
