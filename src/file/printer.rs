//! YAML rendering of query results.
//!
//! The printer honors the style hints carried by each node: flow collections
//! stay on one line, block collections are indented with
//! `PrinterOptions::indent_size` spaces per level, quoted scalars keep their
//! quotes and literal/folded scalars are written as block scalars where the
//! surrounding context allows it. Anchors, aliases, non-default tags and
//! attached comments are written back out.
//!
//! # Example
//!
//! ```
//! use quillq::document::node::{Node, Style};
//! use quillq::file::printer::{Printer, PrinterOptions};
//!
//! let node = Node::mapping(vec![
//!     (Node::string("a"), Node::mapping(vec![
//!         (Node::string("things"), Node::string("great")),
//!     ]).with_style(Style::Flow)),
//!     (Node::string("b"), Node::sequence(vec![Node::int(1), Node::int(2)])),
//! ]);
//!
//! let printer = Printer::new(PrinterOptions::default());
//! assert_eq!(printer.render(&node), "a: {things: great}\nb:\n  - 1\n  - 2\n");
//! ```

use crate::config::Config;
use crate::document::node::{resolve_scalar_tag, tags, Node, NodeContent, Style};
use crate::engine::context::{Context, MatchedValue};

/// Writer settings, passed in explicitly rather than read from global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterOptions {
    /// Spaces per block indentation level
    pub indent_size: usize,
    /// Print top-level scalars as their bare value
    pub unwrap_scalars: bool,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            unwrap_scalars: true,
        }
    }
}

impl PrinterOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            indent_size: config.indent_size,
            unwrap_scalars: config.unwrap_scalars,
        }
    }
}

/// Renders nodes as YAML text.
#[derive(Debug, Clone, Default)]
pub struct Printer {
    options: PrinterOptions,
}

impl Printer {
    pub fn new(options: PrinterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrinterOptions {
        &self.options
    }

    /// Renders one node as a YAML document body, ending with a newline.
    pub fn render(&self, node: &Node) -> String {
        let mut out = String::new();
        if let Some(head) = &node.comments().head {
            write_comment_lines(head, 0, &mut out);
        }

        if is_block(node) {
            let props = properties(node);
            if !props.is_empty() {
                out.push_str(&props);
                out.push('\n');
            }
            self.write_block(node, 0, &mut out);
        } else if let Some(value) = self.unwrapped(node) {
            out.push_str(value);
            if !value.ends_with('\n') {
                out.push('\n');
            }
        } else if uses_block_scalar(node) {
            let props = properties(node);
            if !props.is_empty() {
                out.push_str(&props);
                out.push(' ');
            }
            self.write_block_scalar(node, self.options.indent_size, &mut out);
        } else {
            out.push_str(&inline(node, false));
            push_line_comment(node, &mut out);
            out.push('\n');
        }

        if let Some(foot) = &node.comments().foot {
            write_comment_lines(foot, 0, &mut out);
        }
        out
    }

    /// Renders every match, separating documents with `---` when asked.
    pub fn render_context(&self, context: &Context, separators: bool) -> String {
        let mut out = String::new();
        for (i, value) in context.iter().enumerate() {
            if i > 0 && separators {
                out.push_str("---\n");
            }
            out.push_str(&self.render(value.node()));
        }
        out
    }

    /// Diagnostic form of a match: `D<doc>, P[<path>], (<tag>)::<yaml>`.
    ///
    /// ```
    /// use quillq::document::node::Node;
    /// use quillq::document::tree::PathElement;
    /// use quillq::engine::context::MatchedValue;
    /// use quillq::file::printer::Printer;
    ///
    /// let value = MatchedValue::from_node(
    ///     Node::sequence(vec![Node::int(1), Node::int(2)]).with_style(quillq::document::Style::Flow),
    ///     0,
    ///     vec![PathElement::Key("a".to_string())],
    /// );
    /// assert_eq!(Printer::default().trace(&value), "D0, P[a], (!!seq)::[1, 2]\n");
    /// ```
    pub fn trace(&self, value: &MatchedValue) -> String {
        let path: Vec<String> = value.path().iter().map(|e| e.to_string()).collect();
        let node = value.node();
        let tag = if node.is_alias() { "alias" } else { node.tag() };
        format!(
            "D{}, P[{}], ({})::{}",
            value.document_index(),
            path.join(" "),
            tag,
            self.render(node)
        )
    }

    fn unwrapped<'n>(&self, node: &'n Node) -> Option<&'n str> {
        if !self.options.unwrap_scalars || node.anchor().is_some() {
            return None;
        }
        node.scalar_value()
    }

    fn write_block(&self, node: &Node, indent: usize, out: &mut String) {
        match node.content() {
            NodeContent::Mapping(entries) => self.write_mapping(entries, indent, out),
            NodeContent::Sequence(items) => self.write_sequence(items, indent, out),
            NodeContent::Scalar(_) | NodeContent::Alias { .. } => {
                out.push_str(&" ".repeat(indent));
                out.push_str(&inline(node, false));
                out.push('\n');
            }
        }
    }

    fn write_mapping(&self, entries: &[(Node, Node)], indent: usize, out: &mut String) {
        let pad = " ".repeat(indent);
        for (key, value) in entries {
            if let Some(head) = key.comments().head.as_ref().or(value.comments().head.as_ref()) {
                write_comment_lines(head, indent, out);
            }
            out.push_str(&pad);
            out.push_str(&inline(key, true));
            if key.is_alias() {
                out.push(' ');
            }
            out.push(':');

            let child_indent = indent + self.options.indent_size;
            if is_block(value) {
                let props = properties(value);
                if !props.is_empty() {
                    out.push(' ');
                    out.push_str(&props);
                }
                push_line_comment(value, out);
                out.push('\n');
                self.write_block(value, child_indent, out);
            } else if uses_block_scalar(value) {
                out.push(' ');
                let props = properties(value);
                if !props.is_empty() {
                    out.push_str(&props);
                    out.push(' ');
                }
                self.write_block_scalar(value, child_indent, out);
            } else {
                out.push(' ');
                out.push_str(&inline(value, false));
                push_line_comment(value, out);
                out.push('\n');
            }

            if let Some(foot) = &value.comments().foot {
                write_comment_lines(foot, indent, out);
            }
        }
    }

    fn write_sequence(&self, items: &[Node], indent: usize, out: &mut String) {
        let pad = " ".repeat(indent);
        let child_indent = indent + 2;
        for item in items {
            if let Some(head) = &item.comments().head {
                write_comment_lines(head, indent, out);
            }
            out.push_str(&pad);
            out.push_str("- ");

            if is_block(item) {
                let props = properties(item);
                if props.is_empty() {
                    // First line of the nested block shares the dash line.
                    let mut nested = String::new();
                    self.write_block(item, child_indent, &mut nested);
                    out.push_str(&nested[child_indent.min(nested.len())..]);
                } else {
                    out.push_str(&props);
                    out.push('\n');
                    self.write_block(item, child_indent, out);
                }
            } else if uses_block_scalar(item) {
                let props = properties(item);
                if !props.is_empty() {
                    out.push_str(&props);
                    out.push(' ');
                }
                self.write_block_scalar(item, child_indent, out);
            } else {
                out.push_str(&inline(item, false));
                push_line_comment(item, out);
                out.push('\n');
            }

            if let Some(foot) = &item.comments().foot {
                write_comment_lines(foot, indent, out);
            }
        }
    }

    /// Writes a `|` or `>` block scalar whose body sits at `indent`.
    fn write_block_scalar(&self, node: &Node, indent: usize, out: &mut String) {
        let value = node.scalar_value().unwrap_or_default();
        let body = value.trim_end_matches('\n');
        let trailing = value.len() - body.len();
        let folded = node.style() == Style::Folded;

        out.push(if folded { '>' } else { '|' });
        match trailing {
            0 => out.push('-'),
            1 => {}
            _ => out.push('+'),
        }
        push_line_comment(node, out);
        out.push('\n');

        let pad = " ".repeat(indent);
        for (i, line) in body.split('\n').enumerate() {
            if folded && i > 0 {
                out.push('\n');
            }
            if !line.is_empty() {
                out.push_str(&pad);
                out.push_str(line);
            }
            out.push('\n');
        }
        for _ in 1..trailing {
            out.push('\n');
        }
    }
}

/// Non-empty collection printed in block form.
fn is_block(node: &Node) -> bool {
    match node.content() {
        NodeContent::Mapping(_) | NodeContent::Sequence(_) => {
            node.style() != Style::Flow && !node.is_empty_collection()
        }
        _ => false,
    }
}

/// Literal or folded scalar that can be written in block form.
fn uses_block_scalar(node: &Node) -> bool {
    let Some(value) = node.scalar_value() else {
        return false;
    };
    match node.style() {
        Style::Literal => !value.is_empty() && !value.starts_with(&[' ', '\n'][..]),
        Style::Folded => {
            !value.is_empty() && value.split('\n').all(|line| !line.starts_with(&[' ', '\t'][..]))
        }
        _ => false,
    }
}

/// `&anchor` and explicit tag, space separated.
fn properties(node: &Node) -> String {
    let mut parts = Vec::new();
    if let Some(anchor) = node.anchor() {
        parts.push(format!("&{}", anchor));
    }
    if shows_tag(node) {
        parts.push(node.tag().to_string());
    }
    parts.join(" ")
}

/// True when the tag differs from the one a reader would infer.
fn shows_tag(node: &Node) -> bool {
    match node.content() {
        NodeContent::Alias { .. } => false,
        NodeContent::Mapping(_) => node.tag() != tags::MAP,
        NodeContent::Sequence(_) => node.tag() != tags::SEQ,
        NodeContent::Scalar(value) => {
            if node.tag() == tags::STR {
                return false;
            }
            match node.style() {
                Style::Default | Style::Flow => node.tag() != resolve_scalar_tag(value),
                _ => true,
            }
        }
    }
}

/// Renders a node on a single line, collections in flow form.
fn inline(node: &Node, in_flow: bool) -> String {
    let mut out = properties(node);
    if !out.is_empty() {
        out.push(' ');
    }
    match node.content() {
        NodeContent::Alias { name, .. } => {
            out.push('*');
            out.push_str(name);
        }
        NodeContent::Scalar(value) => out.push_str(&scalar_text(node, value, in_flow)),
        NodeContent::Mapping(entries) => {
            let parts: Vec<String> = entries
                .iter()
                .map(|(key, value)| {
                    let separator = if key.is_alias() { " : " } else { ": " };
                    format!("{}{}{}", inline(key, true), separator, inline(value, true))
                })
                .collect();
            out.push('{');
            out.push_str(&parts.join(", "));
            out.push('}');
        }
        NodeContent::Sequence(items) => {
            let parts: Vec<String> = items.iter().map(|item| inline(item, true)).collect();
            out.push('[');
            out.push_str(&parts.join(", "));
            out.push(']');
        }
    }
    out
}

fn scalar_text(node: &Node, value: &str, in_flow: bool) -> String {
    match node.style() {
        Style::SingleQuoted if !value.contains('\n') => single_quote(value),
        Style::SingleQuoted | Style::DoubleQuoted | Style::Literal | Style::Folded => {
            double_quote(value)
        }
        Style::Default | Style::Flow => {
            if node.tag() == tags::STR && needs_quotes(value, in_flow) {
                double_quote(value)
            } else {
                value.to_string()
            }
        }
    }
}

/// Whether a string would read back as something else if left plain.
fn needs_quotes(value: &str, in_flow: bool) -> bool {
    if value.is_empty() || resolve_scalar_tag(value) != tags::STR {
        return true;
    }
    if value.starts_with(|c: char| "#&*!|>'\"%@`,[]{}".contains(c) || c.is_whitespace()) {
        return true;
    }
    let indicator_start = ["-", "?", ":"]
        .iter()
        .any(|ind| value == *ind || value.starts_with(&format!("{} ", ind)));
    indicator_start
        || value.ends_with(|c: char| c == ':' || c.is_whitespace())
        || value.contains(": ")
        || value.contains(" #")
        || value.chars().any(char::is_control)
        || (in_flow && value.contains(&[',', '[', ']', '{', '}'][..]))
}

fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn push_line_comment(node: &Node, out: &mut String) {
    if let Some(line) = &node.comments().line {
        out.push(' ');
        out.push_str(line);
    }
}

fn write_comment_lines(comment: &str, indent: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    for line in comment.lines() {
        out.push_str(&pad);
        out.push_str(line);
        out.push('\n');
    }
}
