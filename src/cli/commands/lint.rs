//! Lint command implementation.
//!
//! The default `playlint [PATHS]` command discovers lintable files, runs
//! the selected rules, applies fixes when enabled and prints the findings
//! with paths relative to the project directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::args::Cli;
use crate::cli::discovery::discover;
use crate::config::{load_options, Options};
use crate::document::{Classifier, Document};
use crate::error::Result;
use crate::lint::{
    BuiltinResolver, Evaluator, Finding, FsWriter, HumanFormatter, JsonFormatter, LintFormatter,
    ModuleResolver, OutputFormat, RuleRegistry, SarifFormatter, SharedCache, Transformer,
};

use super::dispatcher::{Command, CommandResult};

/// Exit code when fatal findings remain.
pub const EXIT_VIOLATIONS: i32 = 2;

/// The lint command implementation.
pub struct LintCommand {
    project_root: PathBuf,
    args: Cli,
}

impl LintCommand {
    /// Create a new lint command.
    pub fn new(project_root: &Path, args: Cli) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Loaded configuration with the command-line overlay applied.
    pub fn options(&self) -> Result<Options> {
        let mut options = load_options(&self.project_root, self.args.config.as_deref())?;
        self.args.apply_to(&mut options);
        Ok(options)
    }

    /// Resolution cache shared by every worker, only when enabled.
    ///
    /// By default each worker's rules keep private caches.
    fn shared_cache(options: &Options) -> Option<SharedCache> {
        options.shared_cache.then(SharedCache::new)
    }

    fn load_documents(&self, options: &Options, classifier: &Classifier) -> Result<Vec<Document>> {
        let roots = if self.args.paths.is_empty() {
            vec![self.project_root.clone()]
        } else {
            self.args.paths.clone()
        };

        let mut documents = Vec::new();
        for path in discover(&roots, options, classifier)? {
            match Document::load(&path, classifier) {
                Ok(doc) => documents.push(doc),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable file: {}", err)
                }
            }
        }
        Ok(documents)
    }

    /// Format findings using the requested formatter.
    fn format_output(
        &self,
        findings: &[Finding],
        registry: &RuleRegistry,
        mut out: &mut dyn Write,
    ) -> std::io::Result<()> {
        match self.args.format {
            OutputFormat::Human => {
                HumanFormatter::new(console::colors_enabled() && !self.args.no_color)
                    .format(findings, &mut out)
            }
            OutputFormat::Json => JsonFormatter::new().format(findings, &mut out),
            OutputFormat::Sarif => SarifFormatter::new("playlint", env!("CARGO_PKG_VERSION"))
                .with_rules(registry.list_rules())
                .format(findings, &mut out),
        }
    }
}

impl Command for LintCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let options = self.options()?;
        let classifier = Classifier::new(&options)?;

        let resolver: Arc<dyn ModuleResolver> = Arc::new(BuiltinResolver::new(&options));
        let shared = Self::shared_cache(&options);
        let selection =
            RuleRegistry::with_resolver(&options, resolver.clone(), shared.as_ref()).select(&options)?;
        let mut documents = self.load_documents(&options, &classifier)?;
        let factory = || {
            let mut registry = RuleRegistry::with_resolver(&options, resolver.clone(), shared.as_ref());
            registry.filter(&selection);
            registry
        };
        tracing::debug!(rules = ?selection.enabled, "Selected rules");

        let mut findings = Evaluator::new(&options).evaluate_parallel(&documents, &factory);

        let mut registry = factory();
        if options.fixes_enabled() {
            let report = Transformer::new(&options).apply_fixes(
                &mut findings,
                &mut documents,
                &mut registry,
                &mut FsWriter,
            );
            tracing::info!(
                applied = report.applied,
                skipped = report.skipped.len(),
                "Modified {} file(s)",
                report.written.len()
            );
            for error in &report.errors {
                tracing::error!("{}", error);
            }
        }

        for finding in &mut findings {
            finding.relativize(&options.project_dir);
        }

        let fatal = findings
            .iter()
            .filter(|f| {
                if options.strict {
                    !f.is_fixed()
                } else {
                    f.is_fatal()
                }
            })
            .count();
        if fatal > 0 {
            tracing::warn!("Listing {} violation(s) that are fatal", fatal);
        }

        self.format_output(&findings, &registry, out)?;
        if findings.is_empty() && self.args.format == OutputFormat::Human {
            writeln!(out, "Passed: 0 failure(s), 0 warning(s) in {} file(s)", documents.len())?;
        }

        if fatal > 0 {
            Ok(CommandResult::failure(EXIT_VIOLATIONS))
        } else {
            Ok(CommandResult::success())
        }
    }
}
