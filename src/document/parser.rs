//! YAML parsing with anchor and style preservation.
//!
//! Documents are read with the `yaml-rust2` event parser. The parser reports
//! anchors only as numeric ids and does not say whether a collection was
//! written in flow or block form, so both are recovered from the source text
//! around each event's mark: the anchor name is the `&name` token in front of
//! the node, and a collection is flow-styled when its first character is `{`
//! or `[`.
//!
//! # Example
//!
//! ```
//! use quillq::document::node::Style;
//! use quillq::document::parser::parse_documents;
//!
//! let docs = parse_documents("a: &x {b: 1}\nc: *x\n---\nd: 2\n").unwrap();
//! assert_eq!(docs.len(), 2);
//!
//! let a = docs[0].get("a").unwrap();
//! assert_eq!(a.anchor(), Some("x"));
//! assert_eq!(a.style(), Style::Flow);
//! assert_eq!(docs[0].get("c").unwrap().alias_target(), Some("x"));
//! ```

use super::node::{resolve_scalar_tag, tags, Node, NodeContent, Style};
use std::collections::HashMap;
use thiserror::Error;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

/// Errors that can occur while reading YAML documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("invalid YAML: {0}")]
    Scan(#[from] ScanError),
    #[error("alias refers to an unknown anchor (id {0})")]
    UnknownAnchor(usize),
}

/// Parses every document in a YAML stream into root nodes.
///
/// An empty document yields a `null` root.
pub fn parse_documents(source: &str) -> Result<Vec<Node>, DocumentError> {
    let chars: Vec<char> = source.chars().collect();
    let mut builder = DocumentBuilder::new(&chars);
    let mut parser = Parser::new_from_str(source);
    parser.load(&mut builder, true)?;
    builder.finish()
}

enum Frame {
    Mapping {
        node: Node,
        entries: Vec<(Node, Node)>,
        pending_key: Option<Node>,
    },
    Sequence {
        node: Node,
        items: Vec<Node>,
    },
}

/// Builds nodes from parser events.
struct DocumentBuilder<'s> {
    source: &'s [char],
    documents: Vec<Node>,
    current_root: Option<Node>,
    stack: Vec<Frame>,
    anchor_names: HashMap<usize, String>,
    error: Option<DocumentError>,
}

impl<'s> DocumentBuilder<'s> {
    fn new(source: &'s [char]) -> Self {
        Self {
            source,
            documents: Vec::new(),
            current_root: None,
            stack: Vec::new(),
            anchor_names: HashMap::new(),
            error: None,
        }
    }

    fn finish(self) -> Result<Vec<Node>, DocumentError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.documents),
        }
    }

    fn insert(&mut self, node: Node) {
        match self.stack.last_mut() {
            None => self.current_root = Some(node),
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => *pending_key = Some(node),
            },
        }
    }

    fn is_name_char(ch: char) -> bool {
        !ch.is_whitespace() && !matches!(ch, ',' | '[' | ']' | '{' | '}')
    }

    /// Index of the node's own content, past any anchor or tag at `index`.
    fn content_start(&self, mut index: usize) -> usize {
        while let Some(&ch) = self.source.get(index) {
            if ch != '&' && ch != '!' {
                break;
            }
            while self
                .source
                .get(index)
                .is_some_and(|&c| Self::is_name_char(c))
            {
                index += 1;
            }
            while self.source.get(index).is_some_and(|c| c.is_whitespace()) {
                index += 1;
            }
        }
        index
    }

    /// Finds the `&name` token attached to the node whose event is at `index`.
    fn anchor_name_at(&self, index: usize) -> Option<String> {
        if self.source.get(index) == Some(&'&') {
            let name: String = self.source[index + 1..]
                .iter()
                .take_while(|&&c| Self::is_name_char(c))
                .collect();
            return Some(name);
        }

        // The mark sits on the content; walk back over whitespace, comments
        // and tags.
        let mut end = index.min(self.source.len());
        loop {
            end = self.skip_back_trivia(end);
            let mut start = end;
            while start > 0 && Self::is_name_char(self.source[start - 1]) {
                start -= 1;
            }
            if start == end {
                return None;
            }
            match self.source[start] {
                '&' => return Some(self.source[start + 1..end].iter().collect()),
                '!' => end = start,
                _ => return None,
            }
        }
    }

    /// Moves `end` back over whitespace and `#` comments.
    fn skip_back_trivia(&self, mut end: usize) -> usize {
        loop {
            while end > 0 && self.source[end - 1].is_whitespace() {
                end -= 1;
            }
            let line_start = self.source[..end]
                .iter()
                .rposition(|&c| c == '\n')
                .map_or(0, |newline| newline + 1);
            match self.comment_start(line_start, end) {
                Some(hash) => end = hash,
                None => return end,
            }
        }
    }

    /// Position of a `#` that opens a comment between `line_start` and `end`.
    fn comment_start(&self, line_start: usize, end: usize) -> Option<usize> {
        (line_start..end).find(|&i| {
            self.source[i] == '#' && (i == line_start || self.source[i - 1].is_whitespace())
        })
    }

    fn anchor_for(&mut self, anchor_id: usize, mark: &Marker) -> Option<String> {
        if anchor_id == 0 {
            return None;
        }
        let name = self
            .anchor_name_at(mark.index())
            .unwrap_or_else(|| format!("anchor{}", anchor_id));
        self.anchor_names.insert(anchor_id, name.clone());
        Some(name)
    }

    fn collection_style(&self, mark: &Marker, open: char) -> Style {
        let start = self.content_start(mark.index());
        if self.source.get(start) == Some(&open) {
            Style::Flow
        } else {
            Style::Default
        }
    }
}

fn explicit_tag(handle: &str, suffix: &str) -> String {
    if handle == "!!" || handle == "tag:yaml.org,2002:" {
        format!("!!{}", suffix)
    } else {
        format!("{}{}", handle, suffix)
    }
}

fn scalar_style(style: TScalarStyle) -> Style {
    match style {
        TScalarStyle::SingleQuoted => Style::SingleQuoted,
        TScalarStyle::DoubleQuoted => Style::DoubleQuoted,
        TScalarStyle::Literal => Style::Literal,
        TScalarStyle::Folded => Style::Folded,
        _ => Style::Default,
    }
}

impl MarkedEventReceiver for DocumentBuilder<'_> {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        match event {
            Event::DocumentEnd => {
                let root = self.current_root.take().unwrap_or_else(Node::null);
                self.documents.push(root);
            }
            Event::Alias(anchor_id) => match self.anchor_names.get(&anchor_id) {
                Some(name) => {
                    let node = Node::alias(name.clone());
                    self.insert(node);
                }
                None => self.error = Some(DocumentError::UnknownAnchor(anchor_id)),
            },
            Event::Scalar(value, style, anchor_id, tag) => {
                let style = scalar_style(style);
                let tag = match tag {
                    Some(tag) => explicit_tag(&tag.handle, &tag.suffix),
                    None if style == Style::Default => resolve_scalar_tag(&value).to_string(),
                    None => tags::STR.to_string(),
                };
                let mut node = Node::scalar(&tag, value).with_style(style);
                node.set_anchor(self.anchor_for(anchor_id, &mark));
                self.insert(node);
            }
            Event::SequenceStart(anchor_id, tag) => {
                let mut node = Node::sequence(Vec::new())
                    .with_style(self.collection_style(&mark, '['));
                if let Some(tag) = tag {
                    node.set_tag(explicit_tag(&tag.handle, &tag.suffix));
                }
                node.set_anchor(self.anchor_for(anchor_id, &mark));
                self.stack.push(Frame::Sequence {
                    node,
                    items: Vec::new(),
                });
            }
            Event::SequenceEnd => {
                if let Some(Frame::Sequence { mut node, items }) = self.stack.pop() {
                    node.content = NodeContent::Sequence(items);
                    self.insert(node);
                }
            }
            Event::MappingStart(anchor_id, tag) => {
                let mut node = Node::mapping(Vec::new())
                    .with_style(self.collection_style(&mark, '{'));
                if let Some(tag) = tag {
                    node.set_tag(explicit_tag(&tag.handle, &tag.suffix));
                }
                node.set_anchor(self.anchor_for(anchor_id, &mark));
                self.stack.push(Frame::Mapping {
                    node,
                    entries: Vec::new(),
                    pending_key: None,
                });
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping {
                    mut node, entries, ..
                }) = self.stack.pop()
                {
                    node.content = NodeContent::Mapping(entries);
                    self.insert(node);
                }
            }
            _ => {}
        }
    }
}
