//! Order-preserving document tree with source positions.
//!
//! The tree is built from `yaml_rust2` parser events. Mapping entries keep
//! their source order and every node and key remembers where it started,
//! so rules can report lines and the transform engine can map a tree edit
//! back onto the original text.
//!
//! Tags (`!vault`, `!unsafe`) are dropped and the value is kept as written.
//! Aliases are replaced by a copy of the anchored node and `<<` merge keys
//! are expanded in place, explicit keys taking precedence.

use std::collections::{HashMap, HashSet};

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError};

use super::path::{PathStep, YamlPath};

/// The YAML merge key.
pub const MERGE_KEY: &str = "<<";

/// A 1-indexed source position. Line 0 means "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    fn from_marker(marker: &Marker) -> Self {
        // Parser columns are 0-indexed.
        Self::new(marker.line(), marker.col() + 1)
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Mapping(Mapping),
    Sequence(Sequence),
}

/// A scalar value, kept as written.
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub value: String,
    pub position: Position,
}

/// A mapping key.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub name: String,
    pub position: Position,
}

/// One `key: value` pair of a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: Key,
    pub value: Node,
}

/// A mapping whose entries stay in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    entries: Vec<Entry>,
    position: Position,
}

/// A sequence of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    items: Vec<Node>,
    position: Position,
}

/// Parse `text` into a tree.
///
/// Only the first document of a stream is loaded. Documents holding
/// nothing but comments, blank lines and document markers parse to `None`.
pub fn parse(text: &str) -> Result<Option<Node>, ScanError> {
    if is_blank_document(text) {
        return Ok(None);
    }
    let mut builder = TreeBuilder::default();
    Parser::new_from_str(text).load(&mut builder, false)?;
    match builder.error {
        Some(err) => Err(err),
        None => Ok(builder.root),
    }
}

fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// A collection still being filled.
enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<Node>,
        position: Position,
    },
    Mapping {
        anchor: usize,
        entries: Vec<Entry>,
        key: Option<Key>,
        position: Position,
    },
}

/// Builds a [`Node`] tree from parser events.
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Node>,
    root: Option<Node>,
    error: Option<ScanError>,
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        let position = Position::from_marker(&marker);
        match event {
            Event::Scalar(value, _style, anchor, _tag) => {
                let node = Node::Scalar(Scalar { value, position });
                self.finish(anchor, node, marker);
            }
            Event::Alias(anchor) => match self.anchors.get(&anchor) {
                Some(node) => {
                    let node = node.clone();
                    self.push(node, marker);
                }
                None => self.error = Some(ScanError::new(marker, "unknown anchor")),
            },
            Event::SequenceStart(anchor, _tag) => self.stack.push(Frame::Sequence {
                anchor,
                items: Vec::new(),
                position,
            }),
            Event::MappingStart(anchor, _tag) => self.stack.push(Frame::Mapping {
                anchor,
                entries: Vec::new(),
                key: None,
                position,
            }),
            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Sequence {
                    anchor,
                    items,
                    position,
                }) => self.finish(anchor, Node::Sequence(Sequence { items, position }), marker),
                Some(Frame::Mapping {
                    anchor,
                    entries,
                    position,
                    ..
                }) => {
                    let entries = expand_merges(entries);
                    self.finish(anchor, Node::Mapping(Mapping { entries, position }), marker)
                }
                None => self.error = Some(ScanError::new(marker, "unbalanced collection end")),
            },
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}
        }
    }
}

impl TreeBuilder {
    /// Record a completed node under its anchor, then attach it.
    fn finish(&mut self, anchor: usize, node: Node, marker: Marker) {
        if anchor != 0 {
            self.anchors.insert(anchor, node.clone());
        }
        self.push(node, marker);
    }

    fn push(&mut self, node: Node, marker: Marker) {
        match self.stack.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping { entries, key, .. }) => match key.take() {
                Some(key) => entries.push(Entry { key, value: node }),
                None => match node {
                    Node::Scalar(scalar) => {
                        *key = Some(Key {
                            name: scalar.value,
                            position: scalar.position,
                        })
                    }
                    _ => {
                        self.error = Some(ScanError::new(marker, "mapping keys must be scalars"))
                    }
                },
            },
        }
    }
}

/// Replace `<<` entries by the entries of the merged mappings.
///
/// Keys written in the mapping itself win over merged ones, and earlier
/// merge sources win over later ones.
fn expand_merges(entries: Vec<Entry>) -> Vec<Entry> {
    if !entries.iter().any(|entry| entry.key.name == MERGE_KEY) {
        return entries;
    }
    let mut seen: HashSet<String> = entries
        .iter()
        .filter(|entry| entry.key.name != MERGE_KEY)
        .map(|entry| entry.key.name.clone())
        .collect();

    let mut expanded = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.key.name != MERGE_KEY || matches!(entry.value, Node::Scalar(_)) {
            expanded.push(entry);
            continue;
        }
        let sources: Vec<Mapping> = match entry.value {
            Node::Mapping(mapping) => vec![mapping],
            Node::Sequence(sequence) => sequence
                .items
                .into_iter()
                .filter_map(|item| match item {
                    Node::Mapping(mapping) => Some(mapping),
                    _ => None,
                })
                .collect(),
            Node::Scalar(_) => Vec::new(),
        };
        for merged in sources.into_iter().flat_map(|mapping| mapping.entries) {
            if seen.insert(merged.key.name.clone()) {
                expanded.push(merged);
            }
        }
    }
    expanded
}

impl Node {
    /// Where this node starts.
    pub fn position(&self) -> Position {
        match self {
            Node::Scalar(s) => s.position,
            Node::Mapping(m) => m.position,
            Node::Sequence(s) => s.position,
        }
    }

    /// The 1-indexed line this node starts on.
    pub fn line(&self) -> usize {
        self.position().line
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(&s.value),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Node::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Follow a single step.
    pub fn child(&self, step: &PathStep) -> Option<&Node> {
        match (self, step) {
            (Node::Mapping(m), PathStep::Key(key)) => m.get(key),
            (Node::Sequence(s), PathStep::Index(index)) => s.get(*index),
            _ => None,
        }
    }

    fn child_mut(&mut self, step: &PathStep) -> Option<&mut Node> {
        match (self, step) {
            (Node::Mapping(m), PathStep::Key(key)) => m.get_mut(key),
            (Node::Sequence(s), PathStep::Index(index)) => s.items.get_mut(*index),
            _ => None,
        }
    }

    /// Resolve a structural path from this node.
    pub fn lookup(&self, path: &YamlPath) -> Option<&Node> {
        path.steps()
            .iter()
            .try_fold(self, |node, step| node.child(step))
    }

    /// Resolve a structural path from this node, mutably.
    pub fn lookup_mut(&mut self, path: &YamlPath) -> Option<&mut Node> {
        let mut node = self;
        for step in path.steps() {
            node = node.child_mut(step)?;
        }
        Some(node)
    }
}

impl Mapping {
    /// Where the mapping starts.
    pub fn position(&self) -> Position {
        self.position
    }

    /// The 1-indexed line of the mapping's first key.
    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.name.as_str())
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key.name == key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entry(key).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|e| e.key.name == key)
            .map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Rename `from` to `to`, keeping every entry in its original slot.
    ///
    /// The entries are drained and rebuilt in order, substituting only the
    /// matched key. Returns the original key, or `None` when `from` is
    /// absent (nothing is changed in that case).
    pub fn rename_key(&mut self, from: &str, to: &str) -> Option<Key> {
        if !self.contains_key(from) {
            return None;
        }
        let mut renamed = None;
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .map(|mut entry| {
                if renamed.is_none() && entry.key.name == from {
                    renamed = Some(entry.key.clone());
                    entry.key.name = to.to_string();
                }
                entry
            })
            .collect();
        renamed
    }
}

impl Sequence {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYBOOK: &str = "\
- name: Example
  hosts: all
  tasks:
    - name: Install
      yum: name=httpd
    - shell: echo hi
";

    fn root(text: &str) -> Node {
        parse(text).unwrap().unwrap()
    }

    #[test]
    fn preserves_key_order_and_lines() {
        let tree = root(PLAYBOOK);
        let play = tree.as_sequence().unwrap().get(0).unwrap().as_mapping().unwrap();

        assert_eq!(play.keys().collect::<Vec<_>>(), vec!["name", "hosts", "tasks"]);
        assert_eq!(play.line(), 1);

        let tasks = play.get("tasks").unwrap().as_sequence().unwrap();
        assert_eq!(tasks.get(0).unwrap().line(), 4);
        assert_eq!(tasks.get(1).unwrap().line(), 6);
    }

    #[test]
    fn lookup_follows_keys_and_indices() {
        let tree = root(PLAYBOOK);
        let path = YamlPath::root().index(0).key("tasks").index(1).key("shell");

        assert_eq!(tree.lookup(&path).and_then(Node::as_str), Some("echo hi"));
        assert!(tree.lookup(&YamlPath::root().index(3)).is_none());
        assert!(tree.lookup(&YamlPath::root().key("tasks")).is_none());
    }

    #[test]
    fn rename_key_keeps_sibling_order() {
        let mut tree = root("- name: Say hi\n  shell: echo hi\n  register: out\n");
        let task = tree
            .lookup_mut(&YamlPath::root().index(0))
            .and_then(Node::as_mapping_mut)
            .unwrap();

        let old = task.rename_key("shell", "ansible.builtin.shell").unwrap();

        assert_eq!(old.name, "shell");
        assert_eq!(old.position.line, 2);
        assert_eq!(
            task.keys().collect::<Vec<_>>(),
            vec!["name", "ansible.builtin.shell", "register"]
        );
        assert_eq!(task.get("ansible.builtin.shell").and_then(Node::as_str), Some("echo hi"));
    }

    #[test]
    fn rename_missing_key_is_a_no_op() {
        let mut tree = root("shell: echo hi\n");
        let mapping = tree.as_mapping_mut().unwrap();
        assert!(mapping.rename_key("command", "ansible.builtin.command").is_none());
        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["shell"]);
    }

    #[test]
    fn blank_documents_have_no_tree() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("---\n# only a comment\n\n").unwrap().is_none());
    }

    #[test]
    fn broken_yaml_is_an_error() {
        assert!(parse("- name: [unclosed\n").is_err());
    }

    #[test]
    fn tagged_scalars_keep_their_value() {
        let tree = root(
            "password: !vault |\n  $ANSIBLE_VAULT;1.1;AES256\n  6162\nraw: !unsafe '{{ x }}'\n",
        );
        let mapping = tree.as_mapping().unwrap();

        assert_eq!(
            mapping.get("password").and_then(Node::as_str),
            Some("$ANSIBLE_VAULT;1.1;AES256\n6162\n")
        );
        assert_eq!(mapping.get("raw").and_then(Node::as_str), Some("{{ x }}"));
        assert_eq!(mapping.entry("raw").unwrap().key.position.line, 4);
    }

    #[test]
    fn aliases_copy_the_anchored_node() {
        let tree = root("base: &base [a, b]\ncopy: *base\n");
        let mapping = tree.as_mapping().unwrap();

        assert_eq!(mapping.get("copy"), mapping.get("base"));
        assert_eq!(mapping.get("copy").and_then(Node::as_sequence).unwrap().len(), 2);
    }

    #[test]
    fn merge_keys_expand_in_place() {
        let tree = root(
            "defaults: &defaults\n  become: true\n  tags: [web]\ntask:\n  name: Ping\n  <<: *defaults\n  tags: [db]\n",
        );
        let task = tree.as_mapping().unwrap().get("task").unwrap().as_mapping().unwrap();

        assert_eq!(task.keys().collect::<Vec<_>>(), vec!["name", "become", "tags"]);
        let tags = task.get("tags").and_then(Node::as_sequence).unwrap();
        assert_eq!(tags.get(0).and_then(Node::as_str), Some("db"));
    }

    #[test]
    fn merge_sequences_prefer_earlier_sources() {
        let tree = root("a: &a {x: 1}\nb: &b {x: 2, y: 2}\nc:\n  <<: [*a, *b]\n");
        let c = tree.as_mapping().unwrap().get("c").unwrap().as_mapping().unwrap();

        assert_eq!(c.get("x").and_then(Node::as_str), Some("1"));
        assert_eq!(c.get("y").and_then(Node::as_str), Some("2"));
        assert!(!c.contains_key(MERGE_KEY));
    }

    #[test]
    fn unknown_alias_is_an_error() {
        assert!(parse("a: *missing\n").is_err());
    }
}
