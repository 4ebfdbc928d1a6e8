//! Automatic fix application.
//!
//! The [`Transformer`] applies rule fixes to the documents their findings
//! came from. Fixes only run for findings whose rule declares the fix
//! capability, whose tag the rule lists as fixable, and which the
//! configured `write_list` allows.
//!
//! Per document, every eligible fix mutates the tree in place. The
//! document is then re-serialized and the new text re-parsed; only when
//! that succeeds are the findings marked fixed and the document handed to
//! the [`DocumentWriter`]. A failed check discards the document's edits.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use super::finding::Finding;
use super::registry::RuleRegistry;
use crate::config::Options;
use crate::document::Document;
use crate::error::Result;

/// Persists fixed documents.
pub trait DocumentWriter {
    fn write(&mut self, doc: &Document) -> Result<()>;
}

/// Writes documents back to their paths.
#[derive(Debug, Default)]
pub struct FsWriter;

impl DocumentWriter for FsWriter {
    fn write(&mut self, doc: &Document) -> Result<()> {
        fs::write(doc.path(), doc.text())?;
        tracing::info!(path = %doc.path().display(), "Wrote fixed document");
        Ok(())
    }
}

/// Result of attempting to apply fixes.
#[derive(Debug, Default)]
pub struct TransformReport {
    /// Number of findings fixed.
    pub applied: usize,
    /// Fixes that were skipped, with the reason.
    pub skipped: Vec<String>,
    /// Documents whose fixes could not be kept or written.
    pub errors: Vec<String>,
    /// Documents that were written.
    pub written: Vec<PathBuf>,
}

/// Applies fixes for findings.
pub struct Transformer<'a> {
    options: &'a Options,
}

impl<'a> Transformer<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Whether `write_list` allows fixing `finding`.
    fn allowed(&self, finding: &Finding) -> bool {
        let write = &self.options.write_list;
        if write.iter().any(|name| name == "none") {
            return false;
        }
        let tag = finding.tag.to_string();
        write
            .iter()
            .any(|name| name == "all" || name == finding.rule_id().as_str() || *name == tag)
    }

    /// Whether the finding's rule can fix it and the options allow it.
    pub fn is_eligible(&self, finding: &Finding, registry: &RuleRegistry) -> bool {
        if finding.is_fixed() || !self.allowed(finding) {
            return false;
        }
        let Some(rule) = registry.get(finding.rule_id()) else {
            return false;
        };
        let Some(sub) = finding.tag.sub.as_deref() else {
            return false;
        };
        rule.capabilities().fix && rule.fixable_tags().contains(&sub)
    }

    /// Fix eligible findings in place and persist the changed documents.
    pub fn apply_fixes(
        &self,
        findings: &mut [Finding],
        documents: &mut [Document],
        registry: &mut RuleRegistry,
        writer: &mut dyn DocumentWriter,
    ) -> TransformReport {
        let mut report = TransformReport::default();

        let mut by_file: HashMap<PathBuf, Vec<usize>> = HashMap::new();
        for (index, finding) in findings.iter().enumerate() {
            if self.is_eligible(finding, registry) {
                by_file.entry(finding.file.clone()).or_default().push(index);
            }
        }

        for doc in documents.iter_mut() {
            let Some(targets) = by_file.get(doc.path()) else {
                continue;
            };

            let mut pending = Vec::new();
            for &index in targets {
                let finding = &findings[index];
                let Some(rule) = registry.get_mut(finding.rule_id()) else {
                    continue;
                };
                let outcome = doc
                    .node_mut(&finding.path)
                    .map_err(|err| err.to_string())
                    .and_then(|mut node| rule.fix(finding, &mut node).map_err(|err| err.to_string()));
                match outcome {
                    Ok(()) => pending.push(index),
                    Err(reason) => {
                        tracing::warn!(
                            tag = %finding.tag,
                            path = %doc.path().display(),
                            line = finding.line,
                            "Skipping fix: {}",
                            reason
                        );
                        report.skipped.push(format!(
                            "{}:{}: {}: {}",
                            doc.path().display(),
                            finding.line,
                            finding.tag,
                            reason
                        ));
                    }
                }
            }

            if pending.is_empty() || !doc.is_modified() {
                continue;
            }

            let text = doc.reserialize();
            if let Err(err) = doc.commit(text) {
                tracing::warn!(path = %doc.path().display(), "Discarding fixes: {}", err);
                doc.discard_edits();
                report.errors.push(err.to_string());
                continue;
            }

            for index in pending {
                findings[index].mark_fixed();
                report.applied += 1;
            }
            match writer.write(doc) {
                Ok(()) => report.written.push(doc.path().to_path_buf()),
                Err(err) => report
                    .errors
                    .push(format!("{}: {}", doc.path().display(), err)),
            }
        }

        report
    }
}
