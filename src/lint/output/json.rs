//! JSON output formatter.
//!
//! Formats findings as machine-readable JSON for tooling integration.

use super::LintFormatter;
use crate::lint::{Finding, Level};
use serde::Serialize;
use std::io::Write;

/// Formats lint output as JSON.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    findings: Vec<JsonFinding<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFinding<'a> {
    #[serde(flatten)]
    finding: &'a Finding,
    rule_id: &'a str,
    fingerprint: String,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    failures: usize,
    warnings: usize,
    fixed: usize,
}

impl JsonFormatter {
    /// Create a new JSON formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LintFormatter for JsonFormatter {
    fn format<W: Write>(&self, findings: &[Finding], writer: &mut W) -> std::io::Result<()> {
        let json_findings: Vec<_> = findings
            .iter()
            .map(|finding| JsonFinding {
                finding,
                rule_id: finding.rule_id().as_str(),
                fingerprint: finding.fingerprint(),
            })
            .collect();

        let summary = JsonSummary {
            total: findings.len(),
            failures: findings.iter().filter(|f| f.is_fatal()).count(),
            warnings: findings
                .iter()
                .filter(|f| !f.is_fixed() && f.level == Level::Warning)
                .count(),
            fixed: findings.iter().filter(|f| f.is_fixed()).count(),
        };

        let output = JsonOutput {
            findings: json_findings,
            summary,
        };

        serde_json::to_writer_pretty(&mut *writer, &output).map_err(std::io::Error::other)?;
        writeln!(writer)?;

        Ok(())
    }
}
