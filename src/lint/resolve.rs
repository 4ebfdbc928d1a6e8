//! Module name resolution.
//!
//! Canonical-name rules need to know what an action like `yum` really is.
//! [`ModuleResolver`] is the lookup; [`BuiltinResolver`] answers from the
//! builtin module list and the configured redirects, and [`CachingResolver`]
//! memoizes answers for a run.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::Options;

/// Modules shipped in `ansible.builtin`.
pub const BUILTIN_MODULES: &[&str] = &[
    "add_host",
    "apt",
    "apt_key",
    "apt_repository",
    "assemble",
    "assert",
    "async_status",
    "blockinfile",
    "command",
    "copy",
    "cron",
    "debconf",
    "debug",
    "dnf",
    "dpkg_selections",
    "expect",
    "fail",
    "fetch",
    "file",
    "find",
    "gather_facts",
    "get_url",
    "getent",
    "git",
    "group",
    "group_by",
    "hostname",
    "import_playbook",
    "import_role",
    "import_tasks",
    "include",
    "include_role",
    "include_tasks",
    "include_vars",
    "iptables",
    "known_hosts",
    "lineinfile",
    "meta",
    "package",
    "package_facts",
    "pause",
    "ping",
    "pip",
    "raw",
    "reboot",
    "replace",
    "rpm_key",
    "script",
    "service",
    "service_facts",
    "set_fact",
    "set_stats",
    "setup",
    "shell",
    "slurp",
    "stat",
    "subversion",
    "systemd",
    "sysvinit",
    "tempfile",
    "template",
    "unarchive",
    "uri",
    "user",
    "wait_for",
    "wait_for_connection",
    "yum",
    "yum_repository",
];

/// Pseudo action used for `block`/`rescue`/`always` nodes.
pub const BLOCK_PSEUDO_ACTION: &str = "block/always/rescue";

const BUILTIN_PREFIX: &str = "ansible.builtin.";
const LEGACY_PREFIX: &str = "ansible.legacy.";

/// Resolves a module reference to its canonical name.
pub trait ModuleResolver: Send + Sync {
    /// The fully-qualified canonical name, or `None` when unknown.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Offline resolver backed by the builtin module list.
#[derive(Debug, Clone, Default)]
pub struct BuiltinResolver {
    builtins: HashSet<&'static str>,
    redirects: BTreeMap<String, String>,
    mocks: HashSet<String>,
}

impl BuiltinResolver {
    pub fn new(options: &Options) -> Self {
        Self {
            builtins: BUILTIN_MODULES.iter().copied().collect(),
            redirects: options.module_redirects.clone(),
            mocks: options.mock_modules.iter().cloned().collect(),
        }
    }
}

impl ModuleResolver for BuiltinResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(target) = self.redirects.get(name) {
            return Some(target.clone());
        }
        let short = name
            .strip_prefix(BUILTIN_PREFIX)
            .or_else(|| name.strip_prefix(LEGACY_PREFIX))
            .unwrap_or(name);
        if self.builtins.contains(short) {
            return Some(format!("{BUILTIN_PREFIX}{short}"));
        }
        if name.split('.').count() >= 3 || self.mocks.contains(name) {
            return Some(name.to_string());
        }
        None
    }
}

/// A resolution cache shared between workers.
#[derive(Debug, Clone, Default)]
pub struct SharedCache(Arc<Mutex<HashMap<String, Option<String>>>>);

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, name: &str) -> Option<Option<String>> {
        let cache = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(name).cloned()
    }

    fn insert(&self, name: &str, value: Option<String>) {
        let mut cache = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        cache.entry(name.to_string()).or_insert(value);
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Memoizing front of a [`ModuleResolver`].
///
/// Each distinct reference reaches the inner resolver at most once per
/// cache. Unresolved references are remembered too, and logged once.
pub struct CachingResolver {
    inner: Arc<dyn ModuleResolver>,
    cache: HashMap<String, Option<String>>,
    shared: Option<SharedCache>,
}

impl CachingResolver {
    pub fn new(inner: Arc<dyn ModuleResolver>) -> Self {
        let mut cache = HashMap::new();
        cache.insert(
            BLOCK_PSEUDO_ACTION.to_string(),
            Some(BLOCK_PSEUDO_ACTION.to_string()),
        );
        Self {
            inner,
            cache,
            shared: None,
        }
    }

    /// Consult and fill `shared` in addition to the private cache.
    pub fn with_shared(mut self, shared: SharedCache) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Resolve `name`, using cached answers when present.
    pub fn resolve(&mut self, name: &str) -> Option<String> {
        if let Some(hit) = self.cache.get(name) {
            return hit.clone();
        }
        if let Some(hit) = self.shared.as_ref().and_then(|shared| shared.get(name)) {
            self.cache.insert(name.to_string(), hit.clone());
            return hit;
        }

        let resolved = self.inner.resolve(name);
        match &resolved {
            Some(target) => {
                tracing::debug!(module = %name, target = %target, "Resolved module");
                self.cache
                    .entry(target.clone())
                    .or_insert_with(|| Some(target.clone()));
            }
            None => {
                let err = crate::error::LintError::UnresolvedReference {
                    reference: name.to_string(),
                };
                tracing::warn!("{}", err);
            }
        }
        self.cache.insert(name.to_string(), resolved.clone());
        if let Some(shared) = &self.shared {
            shared.insert(name, resolved.clone());
        }
        resolved
    }
}
