//! SARIF output formatter.
//!
//! SARIF (Static Analysis Results Interchange Format) is an OASIS standard
//! for static analysis tools, supported by GitHub, VS Code, and other tools.

use super::LintFormatter;
use crate::lint::{Finding, Level, RuleInfo};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// SARIF version we generate.
const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// Formats lint output as SARIF.
pub struct SarifFormatter {
    /// Tool name to report.
    pub tool_name: String,
    /// Tool version to report.
    pub tool_version: String,
    /// Known rules, used for rule descriptions.
    pub rules: Vec<RuleInfo>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    short_description: SarifMessage,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
struct SarifRuleProperties {
    tags: Vec<String>,
    severity: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: &'static str,
    message: SarifMessage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    locations: Vec<SarifLocation>,
    partial_fingerprints: SarifFingerprints,
}

#[derive(Serialize)]
struct SarifFingerprints {
    #[serde(rename = "playlint/v1")]
    primary: String,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
}

impl SarifFormatter {
    /// Create a new SARIF formatter.
    pub fn new(tool_name: impl Into<String>, tool_version: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_version: tool_version.into(),
            rules: Vec::new(),
        }
    }

    /// Describe rules from a registry listing.
    pub fn with_rules(mut self, rules: Vec<RuleInfo>) -> Self {
        self.rules = rules;
        self
    }

    fn result_level(finding: &Finding) -> &'static str {
        if finding.is_fixed() {
            return "note";
        }
        match finding.level {
            Level::Error => "error",
            Level::Warning => "warning",
        }
    }

    fn rule(&self, id: &str, finding: &Finding) -> SarifRule {
        match self.rules.iter().find(|info| info.id.as_str() == id) {
            Some(info) => SarifRule {
                id: id.to_string(),
                short_description: SarifMessage {
                    text: info.description.clone(),
                },
                properties: SarifRuleProperties {
                    tags: info.tags.iter().map(|t| t.to_string()).collect(),
                    severity: info.severity.to_string(),
                },
            },
            // Reserved ids such as load-failure have no registered rule.
            None => SarifRule {
                id: id.to_string(),
                short_description: SarifMessage {
                    text: format!("Rule {}", id),
                },
                properties: SarifRuleProperties {
                    tags: Vec::new(),
                    severity: finding.severity.to_string(),
                },
            },
        }
    }
}

impl LintFormatter for SarifFormatter {
    fn format<W: Write>(&self, findings: &[Finding], writer: &mut W) -> std::io::Result<()> {
        let mut rules = BTreeMap::new();
        for finding in findings {
            let id = finding.rule_id().as_str();
            rules
                .entry(id)
                .or_insert_with(|| self.rule(id, finding));
        }

        let results: Vec<_> = findings
            .iter()
            .map(|f| {
                let region = (f.line > 0).then_some(SarifRegion { start_line: f.line });
                SarifResult {
                    rule_id: f.rule_id().to_string(),
                    level: Self::result_level(f),
                    message: SarifMessage {
                        text: match &f.details {
                            Some(details) => format!("[{}] {} {}", f.tag, f.message, details),
                            None => format!("[{}] {}", f.tag, f.message),
                        },
                    },
                    locations: vec![SarifLocation {
                        physical_location: SarifPhysicalLocation {
                            artifact_location: SarifArtifactLocation {
                                uri: f.file.display().to_string(),
                            },
                            region,
                        },
                    }],
                    partial_fingerprints: SarifFingerprints {
                        primary: f.fingerprint(),
                    },
                }
            })
            .collect();

        let log = SarifLog {
            schema: SARIF_SCHEMA,
            version: SARIF_VERSION,
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: self.tool_name.clone(),
                        version: self.tool_version.clone(),
                        rules: rules.into_values().collect(),
                    },
                },
                results,
            }],
        };

        serde_json::to_writer_pretty(&mut *writer, &log).map_err(std::io::Error::other)?;
        writeln!(writer)?;

        Ok(())
    }
}
