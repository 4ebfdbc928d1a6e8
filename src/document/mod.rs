//! The document model.
//!
//! A [`Document`] is one lintable file: its path, its [`Kind`], its raw
//! text and, for YAML kinds, the parsed [`Node`] tree. The tree is owned
//! by the document and only the transform engine mutates it, through
//! [`Document::node_mut`]. Every mutation is mirrored as a [`TextEdit`]
//! so [`Document::reserialize`] can rebuild the text without touching
//! anything a fix did not change.
//!
//! # Example
//!
//! ```
//! use playlint::config::Options;
//! use playlint::document::{Classifier, Document, Kind};
//!
//! let classifier = Classifier::new(&Options::default()).unwrap();
//! let doc = Document::from_text("roles/web/tasks/main.yml", "- yum: name=httpd\n", &classifier);
//!
//! assert_eq!(doc.kind(), Kind::Tasks);
//! assert_eq!(doc.tasks()[0].action.module, "yum");
//! assert_eq!(doc.reserialize(), doc.text());
//! ```

pub mod edit;
pub mod kind;
pub mod path;
pub mod tree;
pub mod walk;

pub use edit::{apply_edits, locate_key, EditError, KeySpan, NodeMut, TextEdit};
pub use kind::{Classifier, Kind, PatternTable};
pub use path::{PathStep, YamlPath};
pub use tree::{parse, Entry, Key, Mapping, Node, Position, Scalar, Sequence};
pub use walk::{plays, tasks, Action, Play, Task, BLOCK_KEYS, TASK_KEYWORDS};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LintError, Result};

/// A lintable file.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    kind: Kind,
    text: String,
    tree: Option<Node>,
    parse_error: Option<String>,
    edits: Vec<TextEdit>,
}

impl Document {
    /// Build a document from in-memory text, classifying it by path.
    ///
    /// A path no pattern matches falls back to [`Kind::Unknown`] with a
    /// warning, even when the classifier is configured to require a match.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>, classifier: &Classifier) -> Self {
        let path = path.into();
        let kind = match classifier.classify(&path) {
            Ok(kind) => kind,
            Err(err) => {
                tracing::warn!(path = %path.display(), "{}", err);
                Kind::Unknown
            }
        };
        Self::build(path, kind, text.into())
    }

    /// Build a document with an explicit kind.
    pub fn with_kind(path: impl Into<PathBuf>, kind: Kind, text: impl Into<String>) -> Self {
        Self::build(path.into(), kind, text.into())
    }

    /// Read and classify a file from disk.
    pub fn load(path: &Path, classifier: &Classifier) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(path, text, classifier))
    }

    fn build(path: PathBuf, kind: Kind, text: String) -> Self {
        let mut doc = Self {
            path,
            kind,
            text,
            tree: None,
            parse_error: None,
            edits: Vec::new(),
        };
        if kind.is_yaml() {
            match parse(&doc.text) {
                Ok(tree) => doc.tree = tree,
                Err(err) => doc.parse_error = Some(err.to_string()),
            }
        }
        if doc.kind == Kind::Yaml && doc.looks_like_playbook() {
            tracing::debug!(path = %doc.path.display(), "Treating generic YAML as a playbook");
            doc.kind = Kind::Playbook;
        }
        doc
    }

    /// A list of mappings holding `hosts` or `import_playbook`.
    fn looks_like_playbook(&self) -> bool {
        let Some(items) = self.tree.as_ref().and_then(Node::as_sequence) else {
            return false;
        };
        !items.is_empty()
            && items.iter().all(|item| {
                item.as_mapping().is_some_and(|play| {
                    play.keys().any(|key| {
                        key == "hosts" || key == "import_playbook" || key.ends_with(".import_playbook")
                    })
                })
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The text the document was loaded from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed tree. `None` for empty, unparsed or broken documents.
    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    /// Parser message when the text could not be parsed.
    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    /// The 1-indexed source line, without its terminator.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        line.checked_sub(1).and_then(|index| self.text.lines().nth(index))
    }

    pub fn node(&self, path: &YamlPath) -> Option<&Node> {
        self.tree.as_ref().and_then(|tree| tree.lookup(path))
    }

    /// Mutable access to the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StalePath` when the path does not resolve in the current tree.
    pub fn node_mut(&mut self, path: &YamlPath) -> Result<NodeMut<'_>> {
        let node = self
            .tree
            .as_mut()
            .and_then(|tree| tree.lookup_mut(path))
            .ok_or_else(|| LintError::StalePath {
                path: self.path.clone(),
                yaml_path: path.to_string(),
            })?;
        Ok(NodeMut::new(node, &self.text, &mut self.edits))
    }

    /// Whether mutations are pending since the last commit.
    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Render the current tree back to text.
    ///
    /// Unmodified documents return their original text unchanged.
    pub fn reserialize(&self) -> String {
        apply_edits(&self.text, &self.edits)
    }

    /// Accept `text` as the new content of the document.
    ///
    /// The text is re-parsed first; on failure the document is left as it
    /// was, pending edits included.
    pub fn commit(&mut self, text: String) -> Result<()> {
        let tree = if self.kind.is_yaml() {
            parse(&text).map_err(|err| LintError::Parse {
                path: self.path.clone(),
                message: err.to_string(),
            })?
        } else {
            None
        };
        self.text = text;
        self.tree = tree;
        self.parse_error = None;
        self.edits.clear();
        Ok(())
    }

    /// Drop pending edits and restore the tree from the current text.
    pub fn discard_edits(&mut self) {
        if self.edits.is_empty() {
            return;
        }
        self.edits.clear();
        self.tree = parse(&self.text).ok().flatten();
    }

    /// The plays of a playbook.
    pub fn plays(&self) -> Vec<Play<'_>> {
        self.tree
            .as_ref()
            .map(|tree| walk::plays(self.kind, tree))
            .unwrap_or_default()
    }

    /// Every task-like node, in document order.
    pub fn tasks(&self) -> Vec<Task<'_>> {
        self.tree
            .as_ref()
            .map(|tree| walk::tasks(self.kind, tree))
            .unwrap_or_default()
    }
}
