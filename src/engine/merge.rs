//! The merge (multiply) operator.
//!
//! `lhs * rhs` recursively combines two node trees:
//!
//! - mappings merge key by key, left keys first in their original order,
//!   then right-only keys in theirs;
//! - sequences are replaced by the right side, or concatenated with `*+`;
//! - anything else (a scalar on either side, or differing kinds) is
//!   replaced by a copy of the right side.
//!
//! `*?` restricts the key set to the keys already present on the left.
//! The result keeps the left side's style, tag and anchor, and alias
//! references are re-emitted as `*name` when merging left their target's
//! content unchanged.
//!
//! Merging never mutates either input; changed containers are rebuilt.
//!
//! # Example
//!
//! ```
//! use quillq::document::node::Node;
//! use quillq::engine::merge::{merge_nodes, MergeFlags};
//!
//! let lhs = Node::mapping(vec![
//!     (Node::string("thing"), Node::string("one")),
//!     (Node::string("cat"), Node::string("frog")),
//! ]);
//! let rhs = Node::mapping(vec![
//!     (Node::string("missing"), Node::string("two")),
//!     (Node::string("thing"), Node::string("two")),
//! ]);
//!
//! let merged = merge_nodes(&lhs, Some(&rhs), MergeFlags::EXISTING).unwrap();
//! assert_eq!(merged.get("thing").and_then(|n| n.scalar_value()), Some("two"));
//! assert_eq!(merged.get("cat").and_then(|n| n.scalar_value()), Some("frog"));
//! assert!(merged.get("missing").is_none());
//! ```

use super::context::{Context, MatchedValue};
use super::error::EvalError;
use super::evaluator::Engine;
use crate::document::node::{KeyIdentity, Node, NodeContent};
use crate::document::tree::{format_path, AliasResolver, NoAnchors, PathElement};
use crate::query::ast::ExpressionNode;
use indexmap::IndexMap;

/// Mode flags of the merge family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MergeFlags {
    /// Concatenate sequences instead of replacing them.
    pub append_arrays: bool,
    /// Only update keys the left side already has.
    pub only_existing_keys: bool,
}

impl MergeFlags {
    /// `*`
    pub const PLAIN: MergeFlags = MergeFlags {
        append_arrays: false,
        only_existing_keys: false,
    };
    /// `*+`
    pub const APPEND: MergeFlags = MergeFlags {
        append_arrays: true,
        only_existing_keys: false,
    };
    /// `*?`
    pub const EXISTING: MergeFlags = MergeFlags {
        append_arrays: false,
        only_existing_keys: true,
    };
    /// `*?+`
    pub const EXISTING_APPEND: MergeFlags = MergeFlags {
        append_arrays: true,
        only_existing_keys: true,
    };

    /// The operator spelling for this flag set.
    pub fn symbol(&self) -> &'static str {
        match (self.only_existing_keys, self.append_arrays) {
            (false, false) => "*",
            (false, true) => "*+",
            (true, false) => "*?",
            (true, true) => "*?+",
        }
    }

    /// Checks that the flags may be combined. Every current combination is
    /// valid.
    pub fn validate(&self) -> Result<(), EvalError> {
        Ok(())
    }
}

/// Merges two standalone nodes.
///
/// Aliases cannot be resolved without a document, so merging through one
/// fails with `UnresolvedAlias`. A missing right side returns `lhs`.
pub fn merge_nodes(lhs: &Node, rhs: Option<&Node>, flags: MergeFlags) -> Result<Node, EvalError> {
    let merger = Merger::new(flags, &NoAnchors, 0, &NoAnchors, 0);
    merger.merge(lhs, rhs, &[])
}

/// Recursive merge of one left/right node pair.
///
/// Each side resolves aliases against the document it was matched in.
pub struct Merger<'a> {
    flags: MergeFlags,
    lhs_resolver: &'a dyn AliasResolver,
    lhs_document: usize,
    rhs_resolver: &'a dyn AliasResolver,
    rhs_document: usize,
}

impl<'a> Merger<'a> {
    pub fn new(
        flags: MergeFlags,
        lhs_resolver: &'a dyn AliasResolver,
        lhs_document: usize,
        rhs_resolver: &'a dyn AliasResolver,
        rhs_document: usize,
    ) -> Self {
        Self {
            flags,
            lhs_resolver,
            lhs_document,
            rhs_resolver,
            rhs_document,
        }
    }

    /// Merges `rhs` into `lhs`, where `lhs` sits at `path` in its document.
    pub fn merge(
        &self,
        lhs: &Node,
        rhs: Option<&Node>,
        path: &[PathElement],
    ) -> Result<Node, EvalError> {
        match rhs {
            None => Ok(lhs.clone()),
            Some(rhs) => {
                let mut path = path.to_vec();
                self.merge_at(lhs, rhs, &mut path, 0)
            }
        }
    }

    fn merge_at(
        &self,
        lhs: &Node,
        rhs: &Node,
        path: &mut Vec<PathElement>,
        depth: usize,
    ) -> Result<Node, EvalError> {
        let lhs_target = resolve(lhs, self.lhs_resolver, self.lhs_document, path)?;
        let rhs_target = resolve(rhs, self.rhs_resolver, self.rhs_document, path)?;

        let merged = match (lhs_target.content(), rhs_target.content()) {
            (NodeContent::Mapping(left), NodeContent::Mapping(right)) => {
                let entries = self.merge_entries(left, right, path, depth)?;
                adopt_identity(Node::mapping(entries), lhs, lhs_target)
            }
            (NodeContent::Sequence(left), NodeContent::Sequence(right)) => {
                if self.flags.append_arrays {
                    let mut items = left.to_vec();
                    for item in right {
                        items.push(self.import(item, path)?);
                    }
                    adopt_identity(Node::sequence(items), lhs, lhs_target)
                } else {
                    let mut items = self.import(rhs_target, path)?;
                    items.set_style(lhs_target.style());
                    items.set_anchor(lhs.anchor().map(str::to_string));
                    items
                }
            }
            _ => self.replace(lhs, lhs_target, rhs, rhs_target, path, depth)?,
        };

        Ok(self.reuse_alias(lhs, lhs_target, rhs, rhs_target, merged))
    }

    fn merge_entries(
        &self,
        left: &[(Node, Node)],
        right: &[(Node, Node)],
        path: &mut Vec<PathElement>,
        depth: usize,
    ) -> Result<Vec<(Node, Node)>, EvalError> {
        let mut entries: IndexMap<KeyIdentity, (Node, Node)> = IndexMap::new();
        for (key, value) in left {
            entries.insert(key.key_identity(), (key.clone(), value.clone()));
        }

        for (key, value) in right {
            let identity = key.key_identity();
            path.push(PathElement::Key(key.key_text()));
            let result = match entries.get_mut(&identity) {
                Some((_, slot)) => self.merge_at(slot, value, path, depth + 1).map(|merged| {
                    *slot = merged;
                }),
                None if self.flags.only_existing_keys => Ok(()),
                None => self.import(value, path).map(|value| {
                    entries.insert(identity, (key.clone(), value));
                }),
            };
            path.pop();
            result?;
        }

        Ok(entries.into_values().collect())
    }

    /// True when both sides come from the same document, so right-side
    /// aliases stay valid in the result.
    fn same_document(&self) -> bool {
        self.lhs_document == self.rhs_document
    }

    /// Copies a right-side node into the result. Aliases from another
    /// document are replaced by copies of their targets.
    fn import(&self, node: &Node, path: &[PathElement]) -> Result<Node, EvalError> {
        if self.same_document() {
            return Ok(node.clone());
        }
        materialize(
            node,
            self.rhs_resolver,
            self.rhs_document,
            path,
            &mut Vec::new(),
        )
    }

    /// The right side wins outright.
    fn replace(
        &self,
        lhs: &Node,
        lhs_target: &Node,
        rhs: &Node,
        rhs_target: &Node,
        path: &[PathElement],
        depth: usize,
    ) -> Result<Node, EvalError> {
        let Some(anchor) = lhs.anchor() else {
            let mut node = self.import(rhs, path)?;
            if depth == 0 && !node.is_alias() && lhs_target.kind() == node.kind() {
                node.set_style(lhs_target.style());
            }
            return Ok(node);
        };

        // Aliases elsewhere may point at the left node, so it keeps its anchor.
        let mut node = self.import(rhs_target, path)?;
        if depth == 0 && lhs_target.kind() == node.kind() {
            node.set_style(lhs_target.style());
        }
        node.set_anchor(Some(anchor.to_string()));
        Ok(node)
    }

    /// Re-emits an alias when the merge left its target's content unchanged.
    ///
    /// A right-side alias is only reused when both sides share a document.
    fn reuse_alias(
        &self,
        lhs: &Node,
        lhs_target: &Node,
        rhs: &Node,
        rhs_target: &Node,
        merged: Node,
    ) -> Node {
        if lhs.is_alias() && merged.content_eq(lhs_target) {
            return lhs.clone();
        }
        if self.same_document()
            && rhs.is_alias()
            && lhs.anchor().is_none()
            && merged.content_eq(rhs_target)
        {
            return rhs.clone();
        }
        merged
    }
}

/// Follows an alias one hop; other nodes resolve to themselves.
fn resolve<'n>(
    node: &'n Node,
    resolver: &'n dyn AliasResolver,
    document_index: usize,
    path: &[PathElement],
) -> Result<&'n Node, EvalError> {
    match node.alias_target() {
        None => Ok(node),
        Some(name) => resolver
            .resolve(node)
            .ok_or_else(|| EvalError::UnresolvedAlias {
                alias: name.to_string(),
                document_index,
                path: format_path(path),
            }),
    }
}

/// Deep copy of `node` with every alias replaced by a copy of its target.
///
/// Copied targets drop their anchor. An alias nested inside its own target
/// is left as is.
fn materialize(
    node: &Node,
    resolver: &dyn AliasResolver,
    document_index: usize,
    path: &[PathElement],
    expanding: &mut Vec<String>,
) -> Result<Node, EvalError> {
    if let Some(name) = node.alias_target() {
        if expanding.iter().any(|open| open == name) {
            return Ok(node.clone());
        }
        let target = resolve(node, resolver, document_index, path)?;
        expanding.push(name.to_string());
        let copy = materialize(target, resolver, document_index, path, expanding);
        expanding.pop();
        let mut copy = copy?;
        copy.set_anchor(None);
        return Ok(copy);
    }

    let content = match node.content() {
        NodeContent::Mapping(entries) => NodeContent::Mapping(
            entries
                .iter()
                .map(|(key, value)| {
                    Ok((
                        materialize(key, resolver, document_index, path, expanding)?,
                        materialize(value, resolver, document_index, path, expanding)?,
                    ))
                })
                .collect::<Result<_, EvalError>>()?,
        ),
        NodeContent::Sequence(items) => NodeContent::Sequence(
            items
                .iter()
                .map(|item| materialize(item, resolver, document_index, path, expanding))
                .collect::<Result<_, EvalError>>()?,
        ),
        NodeContent::Scalar(_) | NodeContent::Alias { .. } => return Ok(node.clone()),
    };
    Ok(Node {
        content,
        tag: node.tag.clone(),
        anchor: node.anchor.clone(),
        style: node.style,
        comments: node.comments.clone(),
    })
}

/// Gives a rebuilt container the left side's tag, style, comments and
/// anchor. A materialized alias takes its target's presentation but no
/// anchor, since the target still owns it.
fn adopt_identity(mut node: Node, lhs: &Node, lhs_target: &Node) -> Node {
    node.set_tag(lhs_target.tag());
    node.set_style(lhs_target.style());
    node.set_anchor(lhs.anchor().map(str::to_string));
    node.comments = lhs_target.comments().clone();
    node
}

/// Handler for `*`, `*+`, `*?` and `*?+`.
///
/// Each result takes the document index and path of its left match.
pub(crate) fn multiply(
    engine: &Engine<'_>,
    context: &Context,
    expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    let flags = expr
        .operator()
        .merge_flags()
        .ok_or_else(|| EvalError::UnsupportedOperand {
            operator: "merge".to_string(),
            kind: expr.operator().name().to_string(),
        })?;
    flags.validate()?;

    let store = engine.store();
    engine.cross_function(context, expr, |lhs, rhs| {
        tracing::trace!(
            operator = flags.symbol(),
            lhs_document = lhs.document_index(),
            lhs_path = %lhs.path_string(),
            rhs_document = rhs.document_index(),
            rhs_path = %rhs.path_string(),
            "merging pair"
        );
        let merger = Merger::new(
            flags,
            store.resolver(lhs.document_index()),
            lhs.document_index(),
            store.resolver(rhs.document_index()),
            rhs.document_index(),
        );
        let node = merger.merge(lhs.node(), Some(rhs.node()), lhs.path())?;
        Ok(Some(MatchedValue::from_node(
            node,
            lhs.document_index(),
            lhs.path().to_vec(),
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::{tags, NodeKind, Style};
    use crate::document::tree::Document;

    const ALL_FLAGS: [MergeFlags; 4] = [
        MergeFlags::PLAIN,
        MergeFlags::APPEND,
        MergeFlags::EXISTING,
        MergeFlags::EXISTING_APPEND,
    ];

    fn map(entries: &[(&str, Node)]) -> Node {
        Node::mapping(
            entries
                .iter()
                .map(|(k, v)| (Node::string(*k), v.clone()))
                .collect(),
        )
    }

    fn s(value: &str) -> Node {
        Node::string(value)
    }

    fn keys(node: &Node) -> Vec<String> {
        node.entries()
            .unwrap_or_default()
            .iter()
            .map(|(k, _)| k.key_text())
            .collect()
    }

    #[test]
    fn test_missing_rhs_returns_lhs() {
        let lhs = map(&[("a", s("b"))]).with_anchor("x");
        assert_eq!(merge_nodes(&lhs, None, MergeFlags::PLAIN).unwrap(), lhs);
    }

    #[test]
    fn test_merge_with_empty_rhs_is_identity() {
        let lhs = map(&[
            ("a", Node::int(1)),
            ("b", Node::sequence(vec![Node::int(2)])),
            ("c", map(&[("d", s("e"))])),
        ])
        .with_style(Style::Flow)
        .with_anchor("root");
        for flags in ALL_FLAGS {
            let merged = merge_nodes(&lhs, Some(&Node::mapping(vec![])), flags).unwrap();
            assert_eq!(merged, lhs, "{}", flags.symbol());
        }
    }

    #[test]
    fn test_empty_lhs_absorbs_rhs() {
        let lhs = Node::mapping(vec![]).with_style(Style::Flow);
        let rhs = map(&[("cat", s("dog")), ("x", Node::int(1))]);
        let merged = merge_nodes(&lhs, Some(&rhs), MergeFlags::PLAIN).unwrap();
        assert!(merged.content_eq(&rhs));
        assert_eq!(merged.style(), Style::Flow);
    }

    #[test]
    fn test_existing_only_keeps_left_key_set() {
        let lhs = map(&[("thing", s("one")), ("cat", s("frog"))]);
        let rhs = map(&[("missing", s("two")), ("thing", s("two"))]);
        for flags in [MergeFlags::EXISTING, MergeFlags::EXISTING_APPEND] {
            let merged = merge_nodes(&lhs, Some(&rhs), flags).unwrap();
            assert_eq!(keys(&merged), vec!["thing", "cat"]);
            assert_eq!(merged.get("thing"), Some(&s("two")));
            assert_eq!(merged.get("cat"), Some(&s("frog")));
        }
    }

    #[test]
    fn test_existing_only_still_recurses() {
        let lhs = map(&[("a", map(&[("b", s("1")), ("c", s("2"))]))]);
        let rhs = map(&[("a", map(&[("b", s("9")), ("z", s("0"))]))]);
        let merged = merge_nodes(&lhs, Some(&rhs), MergeFlags::EXISTING).unwrap();
        let a = merged.get("a").unwrap();
        assert_eq!(keys(a), vec!["b", "c"]);
        assert_eq!(a.get("b"), Some(&s("9")));
    }

    #[test]
    fn test_key_order_left_then_right_only() {
        let lhs = map(&[("b", s("1")), ("a", s("2"))]);
        let rhs = map(&[("c", s("3")), ("a", s("4")), ("d", s("5"))]);
        let merged = merge_nodes(&lhs, Some(&rhs), MergeFlags::PLAIN).unwrap();
        assert_eq!(keys(&merged), vec!["b", "a", "c", "d"]);
        assert_eq!(merged.get("a"), Some(&s("4")));
    }

    #[test]
    fn test_duplicate_right_keys_collapse() {
        let lhs = map(&[("also", Node::sequence(vec![Node::int(1)]))]);
        let rhs = map(&[("also", s("me")), ("also", s("me"))]);
        let merged = merge_nodes(&lhs, Some(&rhs), MergeFlags::PLAIN).unwrap();
        assert_eq!(keys(&merged), vec!["also"]);
        assert_eq!(merged.get("also"), Some(&s("me")));
    }

    #[test]
    fn test_sequences_replace_by_default() {
        let lhs = Node::sequence(vec![Node::int(1), Node::int(2), Node::int(3)]).with_style(Style::Flow);
        let rhs = Node::sequence(vec![Node::int(9)]);
        for flags in [MergeFlags::PLAIN, MergeFlags::EXISTING] {
            let merged = merge_nodes(&lhs, Some(&rhs), flags).unwrap();
            assert!(merged.content_eq(&rhs));
            assert_eq!(merged.style(), Style::Flow);
        }
    }

    #[test]
    fn test_sequences_append() {
        let lhs = Node::sequence(vec![Node::int(1), map(&[("animal", s("dog"))])]);
        let rhs = Node::sequence(vec![Node::int(3), Node::int(4)]);
        let merged = merge_nodes(&lhs, Some(&rhs), MergeFlags::APPEND).unwrap();
        let items = merged.items().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(&items[..2], lhs.items().unwrap());
        assert_eq!(&items[2..], rhs.items().unwrap());
    }

    #[test]
    fn test_type_mismatch_right_wins() {
        let lhs = map(&[("a", s("cat"))]);
        let rhs = map(&[("a", map(&[("c", s("cat"))]))]);
        let merged = merge_nodes(&lhs, Some(&rhs), MergeFlags::EXISTING_APPEND).unwrap();
        assert_eq!(merged.get("a").map(|n| n.kind()), Some(NodeKind::Mapping));

        let back = merge_nodes(&rhs, Some(&lhs), MergeFlags::PLAIN).unwrap();
        assert_eq!(back.get("a"), Some(&s("cat")));
    }

    #[test]
    fn test_top_level_anchor_survives() {
        let lhs = map(&[("a", s("b"))]).with_anchor("X");
        let rhs_values = [
            map(&[("c", s("d"))]).with_anchor("Y"),
            Node::sequence(vec![Node::int(1)]),
            Node::int(7),
            Node::null(),
        ];
        for rhs in rhs_values {
            for flags in ALL_FLAGS {
                let merged = merge_nodes(&lhs, Some(&rhs), flags).unwrap();
                assert_eq!(merged.anchor(), Some("X"));
            }
        }
    }

    #[test]
    fn test_nested_style_comes_from_left() {
        let lhs = map(&[("a", map(&[("things", s("great"))]).with_style(Style::Flow))]);
        let rhs = map(&[("a", map(&[("also", s("me").with_style(Style::DoubleQuoted))]))]);
        let merged = merge_nodes(&lhs, Some(&rhs), MergeFlags::PLAIN).unwrap();
        let a = merged.get("a").unwrap();
        assert_eq!(a.style(), Style::Flow);
        assert_eq!(a.get("also").map(|n| n.style()), Some(Style::DoubleQuoted));
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let lhs = map(&[("a", Node::sequence(vec![Node::int(1)]))]);
        let rhs = map(&[("a", Node::sequence(vec![Node::int(2)])), ("b", s("x"))]);
        let (lhs_before, rhs_before) = (lhs.clone(), rhs.clone());
        let first = merge_nodes(&lhs, Some(&rhs), MergeFlags::APPEND).unwrap();
        let second = merge_nodes(&lhs, Some(&rhs), MergeFlags::APPEND).unwrap();
        assert_eq!(lhs, lhs_before);
        assert_eq!(rhs, rhs_before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unresolved_alias_reports_location() {
        let lhs = map(&[("a", map(&[("b", Node::alias("nowhere"))]))]);
        let rhs = map(&[("a", map(&[("b", s("x"))]))]);
        let err = merge_nodes(&lhs, Some(&rhs), MergeFlags::PLAIN).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnresolvedAlias {
                alias: "nowhere".to_string(),
                document_index: 0,
                path: "a.b".to_string(),
            }
        );
    }

    #[test]
    fn test_alias_copied_from_right_is_kept() {
        let doc = Document::new(
            0,
            map(&[
                ("a", map(&[("c", s("frog"))]).with_anchor("cat")),
                ("b", map(&[("f", Node::alias("cat"))])),
                ("c", map(&[("g", s("thongs"))])),
            ]),
        );
        let merger = Merger::new(MergeFlags::PLAIN, &doc, 0, &doc, 0);
        let lhs = doc.root().get("c").unwrap();
        let rhs = doc.root().get("b").unwrap();
        let merged = merger.merge(lhs, Some(rhs), &[]).unwrap();
        assert_eq!(merged.get("f"), Some(&Node::alias("cat")));
    }

    #[test]
    fn test_unchanged_alias_is_reemitted() {
        let doc = Document::new(
            0,
            map(&[
                ("base", map(&[("x", s("1"))]).with_anchor("b")),
                ("lhs", map(&[("ref", Node::alias("b"))])),
                ("rhs", map(&[("ref", map(&[("x", s("1"))]))])),
            ]),
        );
        let merger = Merger::new(MergeFlags::PLAIN, &doc, 0, &doc, 0);
        let merged = merger
            .merge(doc.root().get("lhs").unwrap(), doc.root().get("rhs"), &[])
            .unwrap();
        assert_eq!(merged.get("ref"), Some(&Node::alias("b")));
    }

    #[test]
    fn test_changed_alias_is_materialized() {
        let doc = Document::new(
            0,
            map(&[
                ("base", map(&[("x", s("1"))]).with_anchor("b")),
                ("lhs", map(&[("ref", Node::alias("b"))])),
                ("rhs", map(&[("ref", map(&[("y", s("2"))]))])),
            ]),
        );
        let merger = Merger::new(MergeFlags::PLAIN, &doc, 0, &doc, 0);
        let merged = merger
            .merge(doc.root().get("lhs").unwrap(), doc.root().get("rhs"), &[])
            .unwrap();
        let reference = merged.get("ref").unwrap();
        assert_eq!(reference.kind(), NodeKind::Mapping);
        assert_eq!(reference.anchor(), None);
        assert_eq!(keys(reference), vec!["x", "y"]);
    }

    #[test]
    fn test_right_alias_reemitted_on_replace() {
        let doc = Document::new(
            0,
            map(&[
                ("list", Node::sequence(vec![Node::int(1)]).with_anchor("l")),
                ("lhs", map(&[("items", Node::sequence(vec![Node::int(5)]))])),
                ("rhs", map(&[("items", Node::alias("l"))])),
            ]),
        );
        let merger = Merger::new(MergeFlags::PLAIN, &doc, 0, &doc, 0);
        let merged = merger
            .merge(doc.root().get("lhs").unwrap(), doc.root().get("rhs"), &[])
            .unwrap();
        assert_eq!(merged.get("items"), Some(&Node::alias("l")));
    }

    #[test]
    fn test_merge_key_is_replaced_as_a_literal_entry() {
        let lhs = map(&[
            ("c", s("foobar_c")),
            ("<<", Node::alias("foo")),
            ("thing", s("foobar_thing")),
        ]);
        let rhs = map(&[
            ("b", s("foobarList_b")),
            (
                "<<",
                Node::sequence(vec![Node::alias("foo"), Node::alias("bar")]).with_style(Style::Flow),
            ),
            ("c", s("foobarList_c")),
        ]);
        let doc = Document::new(
            0,
            map(&[
                ("foo", map(&[("a", s("foo_a"))]).with_anchor("foo")),
                ("bar", map(&[("b", s("bar_b"))]).with_anchor("bar")),
            ]),
        );
        let merger = Merger::new(MergeFlags::PLAIN, &doc, 0, &doc, 0);
        let merged = merger.merge(&lhs, Some(&rhs), &[]).unwrap();
        assert_eq!(keys(&merged), vec!["c", "<<", "thing", "b"]);
        let merge_sources = merged.get("<<").unwrap();
        assert_eq!(merge_sources.tag(), tags::SEQ);
        assert_eq!(
            merge_sources.items().map(|items| items.len()),
            Some(2)
        );
    }

    #[test]
    fn test_alias_from_other_document_is_materialized() {
        let left = Document::new(
            0,
            map(&[
                ("a", map(&[("g", s("thongs"))])),
                ("cat", map(&[("c", s("toad"))]).with_anchor("cat")),
            ]),
        );
        let right = Document::new(
            1,
            map(&[
                ("base", map(&[("c", s("frog"))]).with_anchor("cat")),
                ("b", map(&[("f", Node::alias("cat"))])),
            ]),
        );
        let merger = Merger::new(MergeFlags::PLAIN, &left, 0, &right, 1);
        let merged = merger
            .merge(left.root().get("a").unwrap(), right.root().get("b"), &[])
            .unwrap();
        let copied = merged.get("f").unwrap();
        assert!(!copied.is_alias());
        assert_eq!(copied.anchor(), None);
        assert_eq!(copied.get("c"), Some(&s("frog")));
    }

    #[test]
    fn test_appended_items_from_other_document_are_materialized() {
        let left = Document::new(0, map(&[("list", Node::sequence(vec![s("a")]))]));
        let right = Document::new(
            1,
            map(&[
                ("item", s("b").with_anchor("i")),
                ("list", Node::sequence(vec![Node::alias("i")])),
            ]),
        );
        let merger = Merger::new(MergeFlags::APPEND, &left, 0, &right, 1);
        let merged = merger
            .merge(left.root().get("list").unwrap(), right.root().get("list"), &[])
            .unwrap();
        assert_eq!(merged.items(), Some(&[s("a"), s("b")][..]));
    }

    #[test]
    fn test_non_merge_operator_is_rejected() {
        let store = crate::document::tree::DocumentStore::null_input();
        let engine = Engine::new(&store);
        let expr = ExpressionNode::pipe(ExpressionNode::path(&[]), ExpressionNode::path(&[]));
        let err = multiply(&engine, &Context::from_store(&store), &expr).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnsupportedOperand {
                operator: "merge".to_string(),
                kind: "pipe".to_string(),
            }
        );
    }

    #[test]
    fn test_flag_symbols() {
        let symbols: Vec<&str> = ALL_FLAGS.iter().map(|f| f.symbol()).collect();
        assert_eq!(symbols, vec!["*", "*+", "*?", "*?+"]);
        assert!(ALL_FLAGS.iter().all(|f| f.validate().is_ok()));
        assert_eq!(MergeFlags::default(), MergeFlags::PLAIN);
    }
}
