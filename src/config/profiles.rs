//! Built-in rule profiles.
//!
//! Profiles are ordered; each one extends the profile before it, so
//! `production` contains every rule of `shared`, `safety` and so on.

use std::collections::HashSet;

use crate::error::{LintError, Result};

/// A named profile and the rules it adds to the one it extends.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub name: &'static str,
    pub description: &'static str,
    pub extends: Option<&'static str>,
    pub rules: &'static [&'static str],
}

/// All built-in profiles, from least to most strict.
pub const PROFILES: &[Profile] = &[
    Profile {
        name: "min",
        description: "Rules that would make the engine fail to load content.",
        extends: None,
        rules: &["internal-error", "load-failure", "parser-error", "syntax-check"],
    },
    Profile {
        name: "basic",
        description: "Prevent common coding issues and encourage reuse.",
        extends: Some("min"),
        rules: &[
            "command-instead-of-module",
            "command-instead-of-shell",
            "deprecated-bare-vars",
            "deprecated-local-action",
            "deprecated-module",
            "inline-env-var",
            "key-order",
            "literal-compare",
            "jinja",
            "no-free-form",
            "no-jinja-when",
            "no-tabs",
            "partial-become",
            "playbook-extension",
            "role-name",
            "schema",
            "name",
            "var-naming",
            "yaml",
        ],
    },
    Profile {
        name: "moderate",
        description: "Ensure content adheres to best practices for readability.",
        extends: Some("basic"),
        rules: &["name[template]", "name[imperative]", "name[casing]", "spell-var-name"],
    },
    Profile {
        name: "safety",
        description: "Avoid module calls that can have non-deterministic outcomes.",
        extends: Some("moderate"),
        rules: &[
            "avoid-implicit",
            "latest",
            "package-latest",
            "risky-file-permissions",
            "risky-octal",
            "risky-shell-pipe",
        ],
    },
    Profile {
        name: "shared",
        description: "Ensure content can be shared with others.",
        extends: Some("safety"),
        rules: &[
            "galaxy",
            "ignore-errors",
            "layout",
            "meta-incorrect",
            "meta-no-tags",
            "meta-video-links",
            "meta-version",
            "meta-runtime",
            "no-changed-when",
            "no-changelog",
            "no-handler",
            "no-relative-paths",
            "max-block-depth",
            "max-tasks",
            "unsafe-loops",
        ],
    },
    Profile {
        name: "production",
        description: "Ensure content meets requirements for inclusion in production.",
        extends: Some("shared"),
        rules: &[
            "avoid-dot-notation",
            "sanity",
            "fqcn",
            "import-task-no-when",
            "meta-no-dependencies",
            "single-entry-point",
            "use-loop",
        ],
    },
];

/// Look up a profile by name.
pub fn find_profile(name: &str) -> Option<&'static Profile> {
    PROFILES.iter().find(|p| p.name == name)
}

/// Every rule id in `name`, including those inherited through `extends`.
pub fn profile_rules(name: &str) -> Result<HashSet<&'static str>> {
    let mut rules = HashSet::new();
    let mut current = Some(name);
    while let Some(profile_name) = current {
        let profile = find_profile(profile_name).ok_or_else(|| LintError::ConfigValidation {
            message: format!(
                "Unknown profile '{}', expected one of: {}",
                profile_name,
                PROFILES
                    .iter()
                    .map(|p| p.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })?;
        rules.extend(profile.rules.iter().copied());
        current = profile.extends;
    }
    Ok(rules)
}
