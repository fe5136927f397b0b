//! YAML node representation with presentation metadata.
//!
//! This module provides the core data structure for documents queried by
//! quillq. Each value is a `Node` that carries its semantic tag, an optional
//! anchor name, presentation hints (style and comments) and its content:
//! a scalar payload, ordered mapping entries, sequence items, or an alias
//! naming the anchor it stands for.
//!
//! # Example
//!
//! ```
//! use quillq::document::node::{Node, NodeKind, Style};
//!
//! let node = Node::mapping(vec![
//!     (Node::string("name"), Node::string("quillq")),
//!     (Node::string("version"), Node::int(1)),
//! ])
//! .with_style(Style::Flow)
//! .with_anchor("meta");
//!
//! assert_eq!(node.kind(), NodeKind::Mapping);
//! assert_eq!(node.tag(), "!!map");
//! assert_eq!(node.anchor(), Some("meta"));
//! assert_eq!(node.get("version").and_then(|v| v.scalar_value()), Some("1"));
//! ```

use std::fmt;

/// Tag names for the core YAML types.
pub mod tags {
    pub const MAP: &str = "!!map";
    pub const SEQ: &str = "!!seq";
    pub const STR: &str = "!!str";
    pub const INT: &str = "!!int";
    pub const FLOAT: &str = "!!float";
    pub const BOOL: &str = "!!bool";
    pub const NULL: &str = "!!null";
}

/// The reserved mapping key that folds anchored mappings into its parent.
pub const MERGE_KEY: &str = "<<";

/// The structural kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Mapping,
    Sequence,
    Alias,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Scalar => "scalar",
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
            NodeKind::Alias => "alias",
        };
        write!(f, "{}", name)
    }
}

/// Formatting hint carried from the source document to the writer.
///
/// Collections use `Default` (block) or `Flow`; scalars use `Default`
/// (plain) or one of the quoted/block scalar styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Default,
    Flow,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// Comments attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comments {
    /// Comment lines preceding the node
    pub head: Option<String>,
    /// Comment on the same line as the node
    pub line: Option<String>,
    /// Comment lines following the node
    pub foot: Option<String>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.line.is_none() && self.foot.is_none()
    }
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    /// A scalar with its textual value
    Scalar(String),
    /// Ordered key/value pairs
    Mapping(Vec<(Node, Node)>),
    /// Ordered items
    Sequence(Vec<Node>),
    /// A reference to an anchor. `definition` counts earlier definitions
    /// of the same name in document order, so a redefined anchor still
    /// resolves to the one in effect where the alias was written.
    Alias { name: String, definition: usize },
}

/// Logical identity of a mapping key.
///
/// Two key nodes denote the same key when their tag and rendered value are
/// equal, regardless of style, anchors or comments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyIdentity {
    tag: String,
    value: String,
}

/// A document node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) content: NodeContent,
    pub(crate) tag: String,
    pub(crate) anchor: Option<String>,
    pub(crate) style: Style,
    pub(crate) comments: Comments,
}

impl Node {
    fn with_content(content: NodeContent, tag: &str) -> Self {
        Self {
            content,
            tag: tag.to_string(),
            anchor: None,
            style: Style::Default,
            comments: Comments::default(),
        }
    }

    /// Creates a scalar with an explicit tag.
    pub fn scalar(tag: &str, value: impl Into<String>) -> Self {
        Self::with_content(NodeContent::Scalar(value.into()), tag)
    }

    /// Creates a scalar whose tag is resolved from its plain text.
    ///
    /// ```
    /// use quillq::document::node::Node;
    ///
    /// assert_eq!(Node::plain("42").tag(), "!!int");
    /// assert_eq!(Node::plain("4.2").tag(), "!!float");
    /// assert_eq!(Node::plain("~").tag(), "!!null");
    /// assert_eq!(Node::plain("cat").tag(), "!!str");
    /// ```
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        let tag = resolve_scalar_tag(&value);
        Self::scalar(tag, value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::scalar(tags::STR, value)
    }

    pub fn int(value: i64) -> Self {
        Self::scalar(tags::INT, value.to_string())
    }

    pub fn boolean(value: bool) -> Self {
        Self::scalar(tags::BOOL, value.to_string())
    }

    pub fn null() -> Self {
        Self::scalar(tags::NULL, "null")
    }

    pub fn mapping(entries: Vec<(Node, Node)>) -> Self {
        Self::with_content(NodeContent::Mapping(entries), tags::MAP)
    }

    pub fn sequence(items: Vec<Node>) -> Self {
        Self::with_content(NodeContent::Sequence(items), tags::SEQ)
    }

    /// Creates an alias standing in for the node anchored as `target`.
    ///
    /// The alias is bound to the right definition of `target` when its
    /// document is built.
    pub fn alias(target: impl Into<String>) -> Self {
        Self::with_content(
            NodeContent::Alias {
                name: target.into(),
                definition: 0,
            },
            "",
        )
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self.content {
            NodeContent::Scalar(_) => NodeKind::Scalar,
            NodeContent::Mapping(_) => NodeKind::Mapping,
            NodeContent::Sequence(_) => NodeKind::Sequence,
            NodeContent::Alias { .. } => NodeKind::Alias,
        }
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Returns the anchor name if this node has one.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn set_anchor(&mut self, anchor: Option<String>) {
        self.anchor = anchor;
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn comments(&self) -> &Comments {
        &self.comments
    }

    /// Returns the scalar payload, or `None` for other kinds.
    pub fn scalar_value(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the anchor name an alias points to.
    pub fn alias_target(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Alias { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns which definition of its anchor name an alias is bound to.
    pub fn alias_definition(&self) -> Option<usize> {
        match &self.content {
            NodeContent::Alias { definition, .. } => Some(*definition),
            _ => None,
        }
    }

    pub fn entries(&self) -> Option<&[(Node, Node)]> {
        match &self.content {
            NodeContent::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[Node]> {
        match &self.content {
            NodeContent::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.content, NodeContent::Alias { .. })
    }

    pub fn is_null(&self) -> bool {
        self.tag == tags::NULL
    }

    /// Returns true for mappings and sequences without children.
    pub fn is_empty_collection(&self) -> bool {
        match &self.content {
            NodeContent::Mapping(entries) => entries.is_empty(),
            NodeContent::Sequence(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Looks up a mapping value by the scalar text of its key.
    ///
    /// Merge keys are not followed; the first entry with a matching key wins.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries()?
            .iter()
            .find(|(k, _)| k.scalar_value() == Some(key))
            .map(|(_, v)| v)
    }

    /// Returns the identity used to compare this node as a mapping key.
    pub fn key_identity(&self) -> KeyIdentity {
        let mut value = String::new();
        self.write_canonical(&mut value);
        let tag = match &self.content {
            NodeContent::Alias { .. } => "*".to_string(),
            _ => self.tag.clone(),
        };
        KeyIdentity { tag, value }
    }

    /// Renders the key text used in paths and diagnostics.
    pub fn key_text(&self) -> String {
        match &self.content {
            NodeContent::Scalar(value) => value.clone(),
            _ => {
                let mut text = String::new();
                self.write_canonical(&mut text);
                text
            }
        }
    }

    fn write_canonical(&self, out: &mut String) {
        match &self.content {
            NodeContent::Scalar(value) => out.push_str(value),
            NodeContent::Alias { name, .. } => {
                out.push('*');
                out.push_str(name);
            }
            NodeContent::Mapping(entries) => {
                out.push('{');
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    k.write_canonical(out);
                    out.push_str(": ");
                    v.write_canonical(out);
                }
                out.push('}');
            }
            NodeContent::Sequence(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_canonical(out);
                }
                out.push(']');
            }
        }
    }

    /// Structural equality: tags, values, keys and alias targets.
    ///
    /// Style, comments and anchor names are ignored.
    pub fn content_eq(&self, other: &Node) -> bool {
        if self.tag != other.tag {
            return false;
        }
        match (&self.content, &other.content) {
            (NodeContent::Scalar(a), NodeContent::Scalar(b)) => a == b,
            (
                NodeContent::Alias {
                    name: a,
                    definition: da,
                },
                NodeContent::Alias {
                    name: b,
                    definition: db,
                },
            ) => a == b && da == db,
            (NodeContent::Mapping(a), NodeContent::Mapping(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ak, av), (bk, bv))| ak.content_eq(bk) && av.content_eq(bv))
            }
            (NodeContent::Sequence(a), NodeContent::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.content_eq(y))
            }
            _ => false,
        }
    }
}

/// Resolves the tag of an untagged plain scalar.
///
/// Follows the YAML 1.2 core schema: null, booleans, decimal/hex/octal
/// integers and floats (including `.inf` and `.nan`); everything else is a
/// string.
pub fn resolve_scalar_tag(value: &str) -> &'static str {
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return tags::NULL,
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => return tags::BOOL,
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" | "-.inf" | "-.Inf" | "-.INF"
        | ".nan" | ".NaN" | ".NAN" => return tags::FLOAT,
        _ => {}
    }
    if is_int(value) {
        tags::INT
    } else if is_float(value) {
        tags::FLOAT
    } else {
        tags::STR
    }
}

fn is_int(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(oct) = value.strip_prefix("0o") {
        return !oct.is_empty() && oct.chars().all(|c| ('0'..='7').contains(&c));
    }
    let digits = value.strip_prefix(&['-', '+'][..]).unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_float(value: &str) -> bool {
    let body = value.strip_prefix(&['-', '+'][..]).unwrap_or(value);
    let (mantissa, exponent) = match body.find(&['e', 'E'][..]) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let mantissa_ok = match frac_part {
        Some(frac) => {
            digits(int_part) && digits(frac) && !(int_part.is_empty() && frac.is_empty())
        }
        None => !int_part.is_empty() && digits(int_part),
    };
    let exponent_ok = match exponent {
        Some(exp) => {
            let exp = exp.strip_prefix(&['-', '+'][..]).unwrap_or(exp);
            !exp.is_empty() && digits(exp)
        }
        None => frac_part.is_some(),
    };
    mantissa_ok && exponent_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_scalar_tags() {
        assert_eq!(resolve_scalar_tag("12"), tags::INT);
        assert_eq!(resolve_scalar_tag("-7"), tags::INT);
        assert_eq!(resolve_scalar_tag("0x1F"), tags::INT);
        assert_eq!(resolve_scalar_tag("1.5"), tags::FLOAT);
        assert_eq!(resolve_scalar_tag("1e3"), tags::FLOAT);
        assert_eq!(resolve_scalar_tag(".5"), tags::FLOAT);
        assert_eq!(resolve_scalar_tag("-.inf"), tags::FLOAT);
        assert_eq!(resolve_scalar_tag("true"), tags::BOOL);
        assert_eq!(resolve_scalar_tag(""), tags::NULL);
        assert_eq!(resolve_scalar_tag("1.2.3"), tags::STR);
        assert_eq!(resolve_scalar_tag("inf"), tags::STR);
        assert_eq!(resolve_scalar_tag("."), tags::STR);
        assert_eq!(resolve_scalar_tag("frog"), tags::STR);
    }

    #[test]
    fn test_key_identity_ignores_style() {
        let plain = Node::string("cat");
        let quoted = Node::string("cat").with_style(Style::DoubleQuoted);
        assert_eq!(plain.key_identity(), quoted.key_identity());
    }

    #[test]
    fn test_key_identity_distinguishes_tags() {
        let number = Node::plain("1");
        let text = Node::string("1");
        assert_ne!(number.key_identity(), text.key_identity());
    }

    #[test]
    fn test_content_eq_ignores_presentation() {
        let a = Node::mapping(vec![(Node::string("a"), Node::int(1))]).with_style(Style::Flow);
        let b = Node::mapping(vec![(Node::string("a"), Node::int(1))]).with_anchor("x");
        assert!(a.content_eq(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_content_eq_detects_order() {
        let a = Node::sequence(vec![Node::int(1), Node::int(2)]);
        let b = Node::sequence(vec![Node::int(2), Node::int(1)]);
        assert!(!a.content_eq(&b));
    }

    #[test]
    fn test_alias_accessors() {
        let alias = Node::alias("config");
        assert_eq!(alias.kind(), NodeKind::Alias);
        assert_eq!(alias.alias_target(), Some("config"));
        assert_eq!(alias.alias_definition(), Some(0));
        assert!(alias.scalar_value().is_none());
        assert_eq!(alias.key_text(), "*config");
    }

    #[test]
    fn test_empty_collection() {
        assert!(Node::mapping(vec![]).is_empty_collection());
        assert!(Node::sequence(vec![]).is_empty_collection());
        assert!(!Node::null().is_empty_collection());
    }
}
