//! Operator tree consumed by the evaluation engine.

use crate::document::node::Node;
use crate::engine::merge::MergeFlags;
use std::fmt;

/// The operator at one node of an expression tree.
///
/// The merge family is spelled out as four kinds, one per mode-flag
/// combination.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorKind {
    /// `.`
    SelfReference,
    /// `.key`
    TraverseKey(String),
    /// `.[n]`, negative positions count from the end
    TraverseIndex(i64),
    /// `.[]`
    Splat,
    /// A constant node
    Literal(Node),
    /// `key: value` inside an object constructor
    CreateMap,
    /// `{ ... }`
    CollectObject,
    /// `a | b`
    Pipe,
    /// `a, b`
    Union,
    /// `a * b`
    Merge,
    /// `a *+ b`
    MergeAppend,
    /// `a *? b`
    MergeExisting,
    /// `a *?+ b`
    MergeExistingAppend,
}

impl OperatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperatorKind::SelfReference => "self",
            OperatorKind::TraverseKey(_) => "traverse",
            OperatorKind::TraverseIndex(_) => "index",
            OperatorKind::Splat => "splat",
            OperatorKind::Literal(_) => "literal",
            OperatorKind::CreateMap => "create-map",
            OperatorKind::CollectObject => "collect-object",
            OperatorKind::Pipe => "pipe",
            OperatorKind::Union => "union",
            OperatorKind::Merge => "merge",
            OperatorKind::MergeAppend => "merge-append",
            OperatorKind::MergeExisting => "merge-existing",
            OperatorKind::MergeExistingAppend => "merge-existing-append",
        }
    }

    /// Mode flags for the merge family, `None` for every other operator.
    pub fn merge_flags(&self) -> Option<MergeFlags> {
        match self {
            OperatorKind::Merge => Some(MergeFlags::PLAIN),
            OperatorKind::MergeAppend => Some(MergeFlags::APPEND),
            OperatorKind::MergeExisting => Some(MergeFlags::EXISTING),
            OperatorKind::MergeExistingAppend => Some(MergeFlags::EXISTING_APPEND),
            _ => None,
        }
    }

    /// Returns the merge operator for a flag combination.
    pub fn for_merge_flags(flags: MergeFlags) -> Self {
        match (flags.only_existing_keys, flags.append_arrays) {
            (false, false) => OperatorKind::Merge,
            (false, true) => OperatorKind::MergeAppend,
            (true, false) => OperatorKind::MergeExisting,
            (true, true) => OperatorKind::MergeExistingAppend,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::TraverseKey(key) => write!(f, ".{}", key),
            OperatorKind::TraverseIndex(index) => write!(f, ".[{}]", index),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// One node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    operator: OperatorKind,
    lhs: Option<Box<ExpressionNode>>,
    rhs: Option<Box<ExpressionNode>>,
}

impl ExpressionNode {
    pub fn leaf(operator: OperatorKind) -> Self {
        Self {
            operator,
            lhs: None,
            rhs: None,
        }
    }

    pub fn unary(operator: OperatorKind, operand: ExpressionNode) -> Self {
        Self {
            operator,
            lhs: Some(Box::new(operand)),
            rhs: None,
        }
    }

    pub fn binary(operator: OperatorKind, lhs: ExpressionNode, rhs: ExpressionNode) -> Self {
        Self {
            operator,
            lhs: Some(Box::new(lhs)),
            rhs: Some(Box::new(rhs)),
        }
    }

    pub fn pipe(lhs: ExpressionNode, rhs: ExpressionNode) -> Self {
        Self::binary(OperatorKind::Pipe, lhs, rhs)
    }

    pub fn union(lhs: ExpressionNode, rhs: ExpressionNode) -> Self {
        Self::binary(OperatorKind::Union, lhs, rhs)
    }

    pub fn merge(flags: MergeFlags, lhs: ExpressionNode, rhs: ExpressionNode) -> Self {
        Self::binary(OperatorKind::for_merge_flags(flags), lhs, rhs)
    }

    pub fn literal(node: Node) -> Self {
        Self::leaf(OperatorKind::Literal(node))
    }

    /// Builds `.a.b.c` as a pipe of key traversals.
    pub fn path(keys: &[&str]) -> Self {
        let mut nodes = keys
            .iter()
            .map(|key| Self::leaf(OperatorKind::TraverseKey(key.to_string())));
        match nodes.next() {
            Some(first) => nodes.fold(first, Self::pipe),
            None => Self::leaf(OperatorKind::SelfReference),
        }
    }

    pub fn operator(&self) -> &OperatorKind {
        &self.operator
    }

    pub fn lhs(&self) -> Option<&ExpressionNode> {
        self.lhs.as_deref()
    }

    pub fn rhs(&self) -> Option<&ExpressionNode> {
        self.rhs.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_kinds_round_trip_flags() {
        for flags in [
            MergeFlags::PLAIN,
            MergeFlags::APPEND,
            MergeFlags::EXISTING,
            MergeFlags::EXISTING_APPEND,
        ] {
            assert_eq!(OperatorKind::for_merge_flags(flags).merge_flags(), Some(flags));
        }
        assert_eq!(OperatorKind::Pipe.merge_flags(), None);
    }

    #[test]
    fn test_path_builds_pipe_chain() {
        let expr = ExpressionNode::path(&["a", "b"]);
        assert_eq!(expr.operator(), &OperatorKind::Pipe);
        assert_eq!(
            expr.lhs().map(|n| n.operator()),
            Some(&OperatorKind::TraverseKey("a".to_string()))
        );
        assert_eq!(
            expr.rhs().map(|n| n.operator()),
            Some(&OperatorKind::TraverseKey("b".to_string()))
        );
    }

    #[test]
    fn test_empty_path_is_self() {
        assert_eq!(
            ExpressionNode::path(&[]).operator(),
            &OperatorKind::SelfReference
        );
    }
}
