//! Play and task discovery.
//!
//! Rules match at three granularities. The document itself is one; this
//! module finds the other two: the plays of a playbook and every task-like
//! node of playbooks, task files and handler files.

use super::path::YamlPath;
use super::tree::{Mapping, Node, Sequence};
use super::Kind;

/// Keys that configure a task rather than name its action.
pub const TASK_KEYWORDS: &[&str] = &[
    "name", "when", "loop", "loop_control", "register", "notify", "listen",
    "ignore_errors", "ignore_unreachable", "changed_when", "failed_when",
    "tags", "become", "become_exe", "become_flags", "become_method", "become_user",
    "delegate_to", "delegate_facts", "run_once", "retries", "delay", "until",
    "async", "poll", "environment", "vars", "args", "connection", "throttle",
    "timeout", "no_log", "diff", "check_mode", "module_defaults",
    "any_errors_fatal", "debugger", "collections", "remote_user", "port",
];

/// Keys that hold nested task lists.
pub const BLOCK_KEYS: &[&str] = &["block", "rescue", "always"];

/// Play keys that hold task lists.
pub const PLAY_TASK_SECTIONS: &[&str] = &["pre_tasks", "tasks", "post_tasks", "handlers"];

/// The action a task performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Module name as written, e.g. `yum` or `ansible.builtin.yum`.
    pub module: String,
    /// The mapping key naming the action: the module itself, or `action`
    /// and `local_action` for the indirect forms.
    pub key: String,
}

impl Action {
    /// Extract the action of a task mapping.
    ///
    /// Returns `None` for mappings that only hold task keywords, which are
    /// data rather than tasks.
    pub fn of(task: &Mapping) -> Option<Self> {
        for indirect in ["action", "local_action"] {
            if let Some(value) = task.get(indirect) {
                let module = match value {
                    Node::Scalar(s) => s.value.split_whitespace().next().map(str::to_string),
                    Node::Mapping(m) => m.get("module").and_then(Node::as_str).map(str::to_string),
                    Node::Sequence(_) => None,
                }?;
                return Some(Self {
                    module,
                    key: indirect.to_string(),
                });
            }
        }
        task.keys()
            .find(|key| {
                !TASK_KEYWORDS.contains(key) && !BLOCK_KEYS.contains(key) && !key.starts_with("with_")
            })
            .map(|key| Self {
                module: key.to_string(),
                key: key.to_string(),
            })
    }

    /// Whether the module is named directly by its mapping key.
    pub fn is_direct(&self) -> bool {
        self.module == self.key
    }
}

/// A play of a playbook.
#[derive(Debug, Clone)]
pub struct Play<'a> {
    /// Position of the play in the playbook.
    pub index: usize,
    pub node: &'a Mapping,
    pub path: YamlPath,
}

impl Play<'_> {
    pub fn line(&self) -> usize {
        self.node.line()
    }
}

/// A task-like node.
#[derive(Debug, Clone)]
pub struct Task<'a> {
    pub node: &'a Mapping,
    pub path: YamlPath,
    pub action: Action,
    /// Index of the enclosing play, for tasks found in playbooks.
    pub play_index: Option<usize>,
}

impl Task<'_> {
    pub fn line(&self) -> usize {
        self.node.line()
    }

    pub fn name(&self) -> Option<&str> {
        self.node.get("name").and_then(Node::as_str)
    }
}

/// The plays of a playbook tree, in order.
pub fn plays(kind: Kind, root: &Node) -> Vec<Play<'_>> {
    if kind != Kind::Playbook {
        return Vec::new();
    }
    let Some(items) = root.as_sequence() else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            item.as_mapping().map(|node| Play {
                index,
                node,
                path: YamlPath::root().index(index),
            })
        })
        .collect()
}

/// Every task-like node of a tree, in document order.
pub fn tasks(kind: Kind, root: &Node) -> Vec<Task<'_>> {
    let mut found = Vec::new();
    if kind == Kind::Playbook {
        for play in plays(kind, root) {
            // import_playbook entries sit where plays do but behave as tasks
            if let Some(action) = play_level_action(play.node) {
                found.push(Task {
                    node: play.node,
                    path: play.path.clone(),
                    action,
                    play_index: Some(play.index),
                });
                continue;
            }
            for section in PLAY_TASK_SECTIONS {
                if let Some(list) = play.node.get(section).and_then(Node::as_sequence) {
                    collect_tasks(list, play.path.clone().key(*section), Some(play.index), &mut found);
                }
            }
        }
    } else if kind.holds_tasks() {
        if let Some(list) = root.as_sequence() {
            collect_tasks(list, YamlPath::root(), None, &mut found);
        }
    }
    found
}

fn play_level_action(play: &Mapping) -> Option<Action> {
    let action = Action::of(play)?;
    action.module.ends_with("import_playbook").then_some(action)
}

fn collect_tasks<'a>(
    list: &'a Sequence,
    path: YamlPath,
    play_index: Option<usize>,
    found: &mut Vec<Task<'a>>,
) {
    for (index, item) in list.iter().enumerate() {
        let Some(node) = item.as_mapping() else {
            continue;
        };
        let item_path = path.clone().index(index);
        if BLOCK_KEYS.iter().any(|key| node.contains_key(key)) {
            for key in BLOCK_KEYS {
                if let Some(nested) = node.get(key).and_then(Node::as_sequence) {
                    collect_tasks(nested, item_path.clone().key(*key), play_index, found);
                }
            }
            continue;
        }
        if let Some(action) = Action::of(node) {
            found.push(Task {
                node,
                path: item_path,
                action,
                play_index,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tree::parse;

    const PLAYBOOK: &str = "\
- import_playbook: other.yml
- name: Web
  hosts: web
  pre_tasks:
    - ping:
  tasks:
    - name: Install
      yum: name=httpd
    - block:
        - shell: echo hi
      rescue:
        - ansible.builtin.debug: msg=oops
    - name: Only data
      when: true
    - action: copy src=a dest=b
";

    #[test]
    fn finds_plays_in_order() {
        let tree = parse(PLAYBOOK).unwrap().unwrap();
        let plays = plays(Kind::Playbook, &tree);
        assert_eq!(plays.len(), 2);
        assert_eq!(plays[1].index, 1);
        assert_eq!(plays[1].line(), 2);
    }

    #[test]
    fn finds_tasks_through_blocks() {
        let tree = parse(PLAYBOOK).unwrap().unwrap();
        let tasks = tasks(Kind::Playbook, &tree);
        let modules: Vec<_> = tasks.iter().map(|t| t.action.module.as_str()).collect();

        assert_eq!(
            modules,
            vec!["import_playbook", "ping", "yum", "shell", "ansible.builtin.debug", "copy"]
        );
        assert_eq!(tasks[3].path, YamlPath::root().index(1).key("tasks").index(1).key("block").index(0));
        assert_eq!(tasks[2].name(), Some("Install"));
        assert_eq!(tasks[2].play_index, Some(1));
    }

    #[test]
    fn indirect_action_keeps_its_key() {
        let tree = parse(PLAYBOOK).unwrap().unwrap();
        let tasks = tasks(Kind::Playbook, &tree);
        let copy = tasks.last().unwrap();
        assert_eq!(copy.action.key, "action");
        assert!(!copy.action.is_direct());
    }

    #[test]
    fn task_files_are_flat_lists() {
        let tree = parse("- name: a\n  command: ls\n- debug: msg=x\n").unwrap().unwrap();
        assert_eq!(tasks(Kind::Tasks, &tree).len(), 2);
        assert!(plays(Kind::Tasks, &tree).is_empty());
    }

    #[test]
    fn vars_files_have_no_tasks() {
        let tree = parse("- shell: not a task here\n").unwrap().unwrap();
        assert!(tasks(Kind::Vars, &tree).is_empty());
    }

    #[test]
    fn local_action_mapping_form() {
        let tree = parse("- local_action:\n    module: command\n    cmd: ls\n").unwrap().unwrap();
        let found = tasks(Kind::Tasks, &tree);
        assert_eq!(found[0].action.module, "command");
        assert_eq!(found[0].action.key, "local_action");
    }
}
