//! Built-in kind tables.
//!
//! Each table is an ordered list of `(kind, pattern)` pairs. The first
//! pattern that matches a path decides the kind, so the order below is
//! significant and must not be sorted.

use super::schema::KindEntry;

/// Default document kinds.
pub const DEFAULT_KINDS: &[(&str, &str)] = &[
    // jinja2 templates are not always parsable as something else
    ("jinja2", "**/*.j2"),
    ("jinja2", "**/*.j2.*"),
    ("yaml", ".github/**/*.{yaml,yml}"),
    ("text", "**/templates/**/*.*"),
    ("execution-environment", "**/execution-environment.yml"),
    ("ansible-lint-config", "**/.ansible-lint"),
    ("ansible-lint-config", "**/.config/ansible-lint.yml"),
    ("ansible-navigator-config", "**/ansible-navigator.{yaml,yml}"),
    ("inventory", "**/inventory/**.{yaml,yml}"),
    ("requirements", "**/meta/requirements.{yaml,yml}"),
    ("galaxy", "**/galaxy.yml"),
    ("reno", "**/releasenotes/*/*.{yaml,yml}"),
    ("vars", "**/{host_vars,group_vars,vars,defaults}/**/*.{yaml,yml}"),
    ("tasks", "**/tasks/**/*.{yaml,yml}"),
    ("rulebook", "**/rulebooks/*.{yml,yaml}"),
    ("playbook", "**/playbooks/*.{yml,yaml}"),
    ("playbook", "**/*playbook*.{yml,yaml}"),
    ("role", "**/roles/*/"),
    ("handlers", "**/handlers/*.{yaml,yml}"),
    ("test-meta", "**/tests/integration/targets/*/meta/main.{yaml,yml}"),
    ("meta", "**/meta/main.{yaml,yml}"),
    ("meta-runtime", "**/meta/runtime.{yaml,yml}"),
    ("role-arg-spec", "**/meta/argument_specs.{yaml,yml}"),
    ("yaml", ".config/molecule/config.{yaml,yml}"),
    (
        "requirements",
        "**/molecule/*/{collections,requirements}.{yaml,yml}",
    ),
    ("yaml", "**/molecule/*/{base,molecule}.{yaml,yml}"),
    ("requirements", "**/requirements.{yaml,yml}"),
    ("playbook", "**/molecule/*/*.{yaml,yml}"),
    ("yaml", "**/{.ansible-lint,.yamllint}"),
    ("changelog", "**/changelogs/changelog.yaml"),
    ("yaml", "**/*.{yaml,yml}"),
    ("yaml", "**/.*.{yaml,yml}"),
    ("sanity-ignore-file", "**/tests/sanity/ignore-*.txt"),
];

/// The effective kind table: user entries first, then the defaults.
pub fn effective_kinds(user: &[KindEntry]) -> Vec<KindEntry> {
    user.iter()
        .cloned()
        .chain(
            DEFAULT_KINDS
                .iter()
                .map(|(kind, pattern)| KindEntry::new(*kind, *pattern)),
        )
        .collect()
}
