//! Matched values and the contexts that carry them between operators.

use crate::document::node::Node;
use crate::document::tree::{format_path, DocumentStore, PathElement};
use std::rc::Rc;

/// One evaluation result: a node, the document it came from and its path
/// from that document's root.
///
/// Document roots and literals are shared through `Rc`. Traversal copies
/// the child it steps into, and nodes built by operators are owned by their
/// match alone.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedValue {
    node: Rc<Node>,
    document_index: usize,
    path: Vec<PathElement>,
}

impl MatchedValue {
    pub fn new(node: Rc<Node>, document_index: usize, path: Vec<PathElement>) -> Self {
        Self {
            node,
            document_index,
            path,
        }
    }

    /// Wraps a freshly built node.
    pub fn from_node(node: Node, document_index: usize, path: Vec<PathElement>) -> Self {
        Self::new(Rc::new(node), document_index, path)
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn document_index(&self) -> usize {
        self.document_index
    }

    pub fn path(&self) -> &[PathElement] {
        &self.path
    }

    /// Path rendered for diagnostics, e.g. `a.b[0]`.
    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }

    /// A child of this match, one path element deeper.
    pub fn child(&self, node: Rc<Node>, element: PathElement) -> Self {
        let mut path = self.path.clone();
        path.push(element);
        Self::new(node, self.document_index, path)
    }
}

/// Ordered sequence of matches. Empty means "no match"; duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    matches: Vec<MatchedValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(value: MatchedValue) -> Self {
        Self {
            matches: vec![value],
        }
    }

    /// One match per document root, in document order, with empty paths.
    pub fn from_store(store: &DocumentStore) -> Self {
        store
            .iter()
            .map(|doc| MatchedValue::new(Rc::clone(doc.root()), doc.index(), Vec::new()))
            .collect()
    }

    pub fn push(&mut self, value: MatchedValue) {
        self.matches.push(value);
    }

    pub fn extend(&mut self, other: Context) {
        self.matches.extend(other.matches);
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchedValue> {
        self.matches.iter()
    }

    pub fn matches(&self) -> &[MatchedValue] {
        &self.matches
    }
}

impl FromIterator<MatchedValue> for Context {
    fn from_iter<I: IntoIterator<Item = MatchedValue>>(iter: I) -> Self {
        Self {
            matches: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Context {
    type Item = MatchedValue;
    type IntoIter = std::vec::IntoIter<MatchedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = &'a MatchedValue;
    type IntoIter = std::slice::Iter<'a, MatchedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_store_uses_document_order() {
        let store = DocumentStore::from_roots(vec![Node::int(1), Node::int(2)]);
        let context = Context::from_store(&store);
        assert_eq!(context.len(), 2);
        let indices: Vec<usize> = context.iter().map(|m| m.document_index()).collect();
        assert_eq!(indices, vec![0, 1]);
        assert!(context.iter().all(|m| m.path().is_empty()));
    }

    #[test]
    fn test_child_extends_path() {
        let root = MatchedValue::from_node(Node::null(), 3, vec![]);
        let child = root.child(Rc::new(Node::int(1)), PathElement::Key("a".to_string()));
        let grandchild = child.child(Rc::new(Node::int(2)), PathElement::Index(0));
        assert_eq!(grandchild.document_index(), 3);
        assert_eq!(grandchild.path_string(), "a[0]");
    }

    #[test]
    fn test_context_keeps_duplicates() {
        let value = MatchedValue::from_node(Node::int(1), 0, vec![]);
        let mut context = Context::single(value.clone());
        context.push(value);
        assert_eq!(context.len(), 2);
        assert!(!context.is_empty());
        assert!(Context::new().is_empty());
    }
}
