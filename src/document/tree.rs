//! Documents and the document store.
//!
//! A `Document` owns one root `Node` together with its index in the input
//! stream and an `AnchorRegistry`: a non-owning "points-to" table from anchor
//! names to the paths of the nodes that carry them. Aliases are resolved by
//! walking that path from the root, so alias edges never own or copy their
//! targets.
//!
//! An anchor name may be defined more than once. Building a document binds
//! every alias to the definition in effect at its position, so `*x` keeps
//! pointing at the earlier `&x` even when a later node reuses the name.
//!
//! # Example
//!
//! ```
//! use quillq::document::node::Node;
//! use quillq::document::tree::DocumentStore;
//!
//! let root = Node::mapping(vec![
//!     (Node::string("base"), Node::string("frog").with_anchor("cat")),
//!     (Node::string("copy"), Node::alias("cat")),
//! ]);
//! let store = DocumentStore::from_roots(vec![root]);
//!
//! let doc = store.get(0).unwrap();
//! assert_eq!(doc.resolve_alias("cat").and_then(|n| n.scalar_value()), Some("frog"));
//! ```

use super::node::{Node, NodeContent};
use super::parser::{parse_documents, DocumentError};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// One step of a path from a document root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// A mapping key, by its scalar text
    Key(String),
    /// A sequence position
    Index(usize),
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Key(key) => write!(f, "{}", key),
            PathElement::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Renders a path for diagnostics, e.g. `a.b[0]`.
pub fn format_path(path: &[PathElement]) -> String {
    let mut out = String::new();
    for element in path {
        match element {
            PathElement::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathElement::Index(index) => {
                out.push_str(&format!("[{}]", index));
            }
        }
    }
    out
}

/// Something that can look up the node an alias stands for.
pub trait AliasResolver {
    /// Returns the target of `alias`, or `None` when `alias` is not an
    /// alias or its anchor is unknown.
    fn resolve(&self, alias: &Node) -> Option<&Node>;
}

/// Resolver for nodes that belong to no loaded document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnchors;

impl AliasResolver for NoAnchors {
    fn resolve(&self, _alias: &Node) -> Option<&Node> {
        None
    }
}

/// Tracks anchors and the aliases pointing at them within one document.
///
/// Every definition of an anchor name is kept, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorRegistry {
    anchors: HashMap<String, Vec<Vec<PathElement>>>,
    aliases: HashMap<String, Vec<Vec<PathElement>>>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry by walking `root` in document order.
    pub fn build(root: &Node) -> Self {
        let mut registry = Self::new();
        let mut path = Vec::new();
        registry.walk(root, &mut path);
        registry
    }

    fn walk(&mut self, node: &Node, path: &mut Vec<PathElement>) {
        if let Some(anchor) = node.anchor() {
            self.register_anchor(anchor.to_string(), path.clone());
        }
        match node.content() {
            NodeContent::Alias { name, .. } => self.register_alias(path.clone(), name.clone()),
            NodeContent::Mapping(entries) => {
                for (key, value) in entries {
                    path.push(PathElement::Key(key.key_text()));
                    self.walk(value, path);
                    path.pop();
                }
            }
            NodeContent::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(PathElement::Index(index));
                    self.walk(item, path);
                    path.pop();
                }
            }
            NodeContent::Scalar(_) => {}
        }
    }

    pub fn register_anchor(&mut self, name: String, path: Vec<PathElement>) {
        self.anchors.entry(name).or_default().push(path);
    }

    pub fn register_alias(&mut self, path: Vec<PathElement>, target: String) {
        self.aliases.entry(target).or_default().push(path);
    }

    /// Path of the last definition of `name`.
    pub fn get_anchor_path(&self, name: &str) -> Option<&Vec<PathElement>> {
        self.anchors.get(name)?.last()
    }

    /// Path of the `definition`-th definition of `name`, counting from 0.
    pub fn get_definition_path(&self, name: &str, definition: usize) -> Option<&Vec<PathElement>> {
        self.anchors.get(name)?.get(definition)
    }

    pub fn get_aliases_for(&self, name: &str) -> Vec<&Vec<PathElement>> {
        self.aliases
            .get(name)
            .map(|paths| paths.iter().collect())
            .unwrap_or_default()
    }
}

/// A single parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    index: usize,
    root: Rc<Node>,
    anchors: AnchorRegistry,
}

/// Binds each alias under `node` to the latest definition of its anchor
/// name seen so far in document order.
fn bind_aliases(node: &mut Node, defined: &mut HashMap<String, usize>) {
    if let Some(anchor) = &node.anchor {
        *defined.entry(anchor.clone()).or_insert(0) += 1;
    }
    match &mut node.content {
        NodeContent::Alias { name, definition } => {
            if let Some(count) = defined.get(name.as_str()) {
                *definition = count - 1;
            }
        }
        NodeContent::Mapping(entries) => {
            for (_, value) in entries.iter_mut() {
                bind_aliases(value, defined);
            }
        }
        NodeContent::Sequence(items) => {
            for item in items.iter_mut() {
                bind_aliases(item, defined);
            }
        }
        NodeContent::Scalar(_) => {}
    }
}

impl Document {
    pub fn new(index: usize, mut root: Node) -> Self {
        bind_aliases(&mut root, &mut HashMap::new());
        let anchors = AnchorRegistry::build(&root);
        Self {
            index,
            root: Rc::new(root),
            anchors,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn root(&self) -> &Rc<Node> {
        &self.root
    }

    pub fn anchor_registry(&self) -> &AnchorRegistry {
        &self.anchors
    }

    /// Gets the node at `path`, following mapping keys and sequence positions.
    pub fn get_node(&self, path: &[PathElement]) -> Option<&Node> {
        let mut current: &Node = &self.root;
        for element in path {
            current = match (element, current.content()) {
                (PathElement::Key(key), NodeContent::Mapping(entries)) => entries
                    .iter()
                    .find(|(k, _)| k.key_text() == *key)
                    .map(|(_, v)| v)?,
                (PathElement::Index(index), NodeContent::Sequence(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Resolves the last definition of an anchor name.
    pub fn resolve_alias(&self, name: &str) -> Option<&Node> {
        let path = self.anchors.get_anchor_path(name)?;
        self.get_node(path)
    }
}

impl AliasResolver for Document {
    fn resolve(&self, alias: &Node) -> Option<&Node> {
        let name = alias.alias_target()?;
        let definition = alias.alias_definition()?;
        let path = self.anchors.get_definition_path(name, definition)?;
        self.get_node(path)
    }
}

/// Ordered collection of documents, indexed from 0 in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_roots(roots: Vec<Node>) -> Self {
        let mut store = Self::new();
        for root in roots {
            store.push(root);
        }
        store
    }

    /// Parses every document in a YAML stream.
    pub fn from_yaml(source: &str) -> Result<Self, DocumentError> {
        let mut store = Self::new();
        store.append_yaml(source)?;
        Ok(store)
    }

    /// A store holding one `null` document, for evaluating without input.
    pub fn null_input() -> Self {
        Self::from_roots(vec![Node::null()])
    }

    /// Appends a root node and returns its document index.
    pub fn push(&mut self, root: Node) -> usize {
        let index = self.documents.len();
        self.documents.push(Document::new(index, root));
        index
    }

    /// Parses a YAML stream and appends its documents, returning how many
    /// were added.
    pub fn append_yaml(&mut self, source: &str) -> Result<usize, DocumentError> {
        let roots = parse_documents(source)?;
        let count = roots.len();
        for root in roots {
            self.push(root);
        }
        Ok(count)
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Returns the alias resolver for a document index.
    ///
    /// Indices with no loaded document resolve nothing.
    pub fn resolver(&self, index: usize) -> &dyn AliasResolver {
        match self.documents.get(index) {
            Some(document) => document as &dyn AliasResolver,
            None => &NoAnchors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::mapping(vec![
            (
                Node::string("foo"),
                Node::mapping(vec![(Node::string("a"), Node::string("foo_a"))]).with_anchor("foo"),
            ),
            (
                Node::string("list"),
                Node::sequence(vec![Node::alias("foo"), Node::alias("foo")]),
            ),
        ])
    }

    #[test]
    fn test_registry_records_anchor_paths() {
        let registry = AnchorRegistry::build(&sample());
        assert_eq!(
            registry.get_anchor_path("foo"),
            Some(&vec![PathElement::Key("foo".to_string())])
        );
        assert!(registry.get_anchor_path("missing").is_none());
    }

    #[test]
    fn test_registry_records_aliases() {
        let registry = AnchorRegistry::build(&sample());
        let aliases = registry.get_aliases_for("foo");
        assert_eq!(aliases.len(), 2);
        assert!(aliases.contains(&&vec![
            PathElement::Key("list".to_string()),
            PathElement::Index(1)
        ]));
    }

    #[test]
    fn test_redefined_anchor_uses_last_definition() {
        let root = Node::sequence(vec![
            Node::string("first").with_anchor("x"),
            Node::string("second").with_anchor("x"),
        ]);
        let doc = Document::new(0, root);
        assert_eq!(
            doc.resolve_alias("x").and_then(|n| n.scalar_value()),
            Some("second")
        );
    }

    #[test]
    fn test_alias_binds_to_preceding_definition() {
        let root = Node::sequence(vec![
            Node::string("first").with_anchor("x"),
            Node::alias("x"),
            Node::string("second").with_anchor("x"),
            Node::alias("x"),
        ]);
        let doc = Document::new(0, root);
        let items = doc.root().items().unwrap();

        assert_eq!(items[1].alias_definition(), Some(0));
        assert_eq!(items[3].alias_definition(), Some(1));
        assert_eq!(
            doc.resolve(&items[1]).and_then(|n| n.scalar_value()),
            Some("first")
        );
        assert_eq!(
            doc.resolve(&items[3]).and_then(|n| n.scalar_value()),
            Some("second")
        );
        assert_eq!(
            doc.anchor_registry().get_definition_path("x", 1),
            Some(&vec![PathElement::Index(2)])
        );
    }

    #[test]
    fn test_store_assigns_indices_in_order() {
        let mut store = DocumentStore::new();
        assert_eq!(store.push(Node::int(1)), 0);
        assert_eq!(store.push(Node::int(2)), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).map(|d| d.index()), Some(1));
    }

    #[test]
    fn test_resolver_for_unknown_document() {
        let store = DocumentStore::from_roots(vec![sample()]);
        let alias = Node::alias("foo");
        assert!(store.resolver(0).resolve(&alias).is_some());
        assert!(store.resolver(5).resolve(&alias).is_none());
    }

    #[test]
    fn test_format_path() {
        let path = vec![
            PathElement::Key("a".to_string()),
            PathElement::Index(0),
            PathElement::Key("b".to_string()),
        ];
        assert_eq!(format_path(&path), "a[0].b");
        assert_eq!(format_path(&[]), "");
    }
}
