//! Format-preserving text edits.
//!
//! Tree mutations are mirrored as byte-range replacements against the
//! original text. Re-serializing a document applies those replacements,
//! so everything a fix did not touch (comments, quoting, indentation,
//! blank lines) comes back byte for byte.

use std::ops::Range;
use thiserror::Error;

use super::tree::{Node, Position};

/// A replacement of a byte range of the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte range in the original text.
    pub range: Range<usize>,
    /// Replacement text.
    pub replacement: String,
}

/// Failure to mutate a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("target node is not a mapping")]
    NotAMapping,

    #[error("key '{0}' not found")]
    KeyNotFound(String),

    #[error("key '{0}' could not be located in the source text")]
    Unlocatable(String),
}

/// Where a mapping key sits in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpan {
    /// Byte range of the key, including quotes when quoted.
    pub range: Range<usize>,
    /// Quote character, when the key is quoted.
    pub quote: Option<char>,
}

/// Locate a mapping key given its reported position.
///
/// The column reported by the parser is only used as a hint: every
/// occurrence of the key on the line that is followed by `:` is a
/// candidate, and the one closest to the hint wins.
pub fn locate_key(text: &str, position: Position, name: &str) -> Option<KeySpan> {
    if position.line == 0 || name.is_empty() {
        return None;
    }
    let line_start = line_offset(text, position.line)?;
    let line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |i| line_start + i);
    let line = &text[line_start..line_end];
    let hint = position.column.saturating_sub(1);

    line.match_indices(name)
        .filter_map(|(at, _)| key_span_at(line, at, name))
        .min_by_key(|span| span.range.start.abs_diff(hint))
        .map(|span| KeySpan {
            range: line_start + span.range.start..line_start + span.range.end,
            quote: span.quote,
        })
}

fn key_span_at(line: &str, at: usize, name: &str) -> Option<KeySpan> {
    let before = line[..at].chars().next_back();
    let quote = match before {
        Some(q @ ('"' | '\'')) => Some(q),
        _ => None,
    };
    let start = match quote {
        Some(q) => at - q.len_utf8(),
        None => at,
    };
    let preceding = line[..start].chars().next_back();
    if !matches!(preceding, None | Some(' ' | '\t' | '-' | '{' | ',' | '?')) {
        return None;
    }

    let mut end = at + name.len();
    if let Some(q) = quote {
        if !line[end..].starts_with(q) {
            return None;
        }
        end += q.len_utf8();
    }
    if !line[end..].trim_start_matches([' ', '\t']).starts_with(':') {
        return None;
    }
    Some(KeySpan {
        range: start..end,
        quote,
    })
}

fn line_offset(text: &str, line: usize) -> Option<usize> {
    if line == 1 {
        return Some(0);
    }
    text.match_indices('\n')
        .nth(line - 2)
        .map(|(i, _)| i + 1)
        .filter(|offset| *offset <= text.len())
}

/// Apply edits to `text`, returning the new text.
///
/// Edits are applied from the end of the text backwards so earlier byte
/// ranges stay valid. Edits overlapping one already applied are dropped.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut output = text.to_string();
    let mut floor = text.len();
    for edit in sorted {
        if edit.range.end > floor || edit.range.start > edit.range.end {
            tracing::debug!(range = ?edit.range, "Dropping overlapping edit");
            continue;
        }
        output.replace_range(edit.range.clone(), &edit.replacement);
        floor = edit.range.start;
    }
    output
}

/// Mutable access to one node of a document, recording text edits.
pub struct NodeMut<'a> {
    node: &'a mut Node,
    source: &'a str,
    edits: &'a mut Vec<TextEdit>,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(node: &'a mut Node, source: &'a str, edits: &'a mut Vec<TextEdit>) -> Self {
        Self {
            node,
            source,
            edits,
        }
    }

    /// The node as it currently is.
    pub fn node(&self) -> &Node {
        self.node
    }

    /// Rename a key of the mapping, keeping the value and the relative
    /// order of every other key.
    pub fn rename_key(&mut self, from: &str, to: &str) -> Result<(), EditError> {
        let mapping = self.node.as_mapping_mut().ok_or(EditError::NotAMapping)?;
        let key = mapping
            .entry(from)
            .map(|entry| entry.key.clone())
            .ok_or_else(|| EditError::KeyNotFound(from.to_string()))?;
        let span = locate_key(self.source, key.position, &key.name)
            .ok_or_else(|| EditError::Unlocatable(from.to_string()))?;

        mapping.rename_key(from, to);
        let replacement = match span.quote {
            Some(q) => format!("{q}{to}{q}"),
            None => to.to_string(),
        };
        self.edits.push(TextEdit {
            range: span.range,
            replacement,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_plain_key_in_sequence_item() {
        let text = "- name: x\n  shell: echo hi\n";
        let span = locate_key(text, Position::new(2, 3), "shell").unwrap();
        assert_eq!(&text[span.range.clone()], "shell");
        assert_eq!(span.quote, None);
    }

    #[test]
    fn locates_key_after_dash() {
        let text = "- yum: name=httpd\n";
        let span = locate_key(text, Position::new(1, 3), "yum").unwrap();
        assert_eq!(span.range, 2..5);
    }

    #[test]
    fn locates_quoted_key() {
        let text = "- \"shell\": echo hi\n";
        let span = locate_key(text, Position::new(1, 3), "shell").unwrap();
        assert_eq!(&text[span.range.clone()], "\"shell\"");
        assert_eq!(span.quote, Some('"'));
    }

    #[test]
    fn ignores_value_occurrences() {
        // `shell` also appears in the value; only the key is followed by `:`
        let text = "  shell: run shell stuff\n";
        let span = locate_key(text, Position::new(1, 3), "shell").unwrap();
        assert_eq!(span.range, 2..7);
    }

    #[test]
    fn rejects_prefix_matches() {
        let text = "  myshell: x\n";
        assert!(locate_key(text, Position::new(1, 3), "shell").is_none());
    }

    #[test]
    fn unknown_line_is_not_located() {
        assert!(locate_key("a: b\n", Position::new(0, 0), "a").is_none());
        assert!(locate_key("a: b\n", Position::new(7, 1), "a").is_none());
    }

    #[test]
    fn applies_edits_back_to_front() {
        let text = "aaa bbb ccc";
        let edits = vec![
            TextEdit {
                range: 0..3,
                replacement: "AAAA".into(),
            },
            TextEdit {
                range: 8..11,
                replacement: "C".into(),
            },
        ];
        assert_eq!(apply_edits(text, &edits), "AAAA bbb C");
    }

    #[test]
    fn drops_overlapping_edits() {
        let edits = vec![
            TextEdit {
                range: 0..5,
                replacement: "x".into(),
            },
            TextEdit {
                range: 3..7,
                replacement: "y".into(),
            },
        ];
        assert_eq!(apply_edits("0123456789", &edits), "012y789");
    }

    #[test]
    fn no_edits_is_identity() {
        let text = "# comment\n- a: 1   # trailing\n";
        assert_eq!(apply_edits(text, &[]), text);
    }
}
