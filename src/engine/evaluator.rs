//! Operator evaluation.
//!
//! `Engine::evaluate` threads a `Context` through an operator tree. Every
//! `OperatorKind` maps to exactly one handler in a fixed dispatch table.
//!
//! Binary combining operators evaluate both operands against the same
//! incoming context and then pair the two result contexts by document:
//!
//! - matches from the same document pair positionally, and unequal counts
//!   are a `CardinalityMismatch`;
//! - left matches from a document the right side never produced pair with
//!   every right match from a document the left side never produced.
//!
//! Pairs are emitted in document order, then left order, then right order.

use super::context::{Context, MatchedValue};
use super::error::EvalError;
use super::{merge, operators};
use crate::document::tree::DocumentStore;
use crate::query::ast::{ExpressionNode, OperatorKind};
use std::collections::BTreeMap;

/// Signature shared by every operator handler.
pub type OperatorHandler =
    fn(&Engine<'_>, &Context, &ExpressionNode) -> Result<Context, EvalError>;

/// Returns the handler registered for an operator kind.
pub fn handler_for(kind: &OperatorKind) -> OperatorHandler {
    match kind {
        OperatorKind::SelfReference => operators::self_reference,
        OperatorKind::TraverseKey(_) => operators::traverse_key,
        OperatorKind::TraverseIndex(_) => operators::traverse_index,
        OperatorKind::Splat => operators::splat,
        OperatorKind::Literal(_) => operators::literal,
        OperatorKind::CreateMap => operators::create_map,
        OperatorKind::CollectObject => operators::collect_object,
        OperatorKind::Pipe => operators::pipe,
        OperatorKind::Union => operators::union,
        OperatorKind::Merge
        | OperatorKind::MergeAppend
        | OperatorKind::MergeExisting
        | OperatorKind::MergeExistingAppend => merge::multiply,
    }
}

/// Evaluates operator trees against a document store.
pub struct Engine<'a> {
    store: &'a DocumentStore,
}

impl<'a> Engine<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a DocumentStore {
        self.store
    }

    /// Evaluates `expr` against `context`.
    pub fn evaluate(&self, context: &Context, expr: &ExpressionNode) -> Result<Context, EvalError> {
        tracing::debug!(
            operator = %expr.operator(),
            matches = context.len(),
            "evaluating operator"
        );
        let handler = handler_for(expr.operator());
        handler(self, context, expr)
    }

    /// Evaluates `expr` with one match per document root as input.
    pub fn evaluate_documents(&self, expr: &ExpressionNode) -> Result<Context, EvalError> {
        self.evaluate(&Context::from_store(self.store), expr)
    }

    /// Evaluates both operands of a binary operator against `context` and
    /// calls `combine` once per pair. `None` results are dropped.
    pub fn cross_function<F>(
        &self,
        context: &Context,
        expr: &ExpressionNode,
        mut combine: F,
    ) -> Result<Context, EvalError>
    where
        F: FnMut(&MatchedValue, &MatchedValue) -> Result<Option<MatchedValue>, EvalError>,
    {
        let left = self.evaluate(context, required_lhs(expr)?)?;
        let right = self.evaluate(context, required_rhs(expr)?)?;

        let mut output = Context::new();
        for (lhs, rhs) in pair_matches(&left, &right)? {
            if let Some(value) = combine(lhs, rhs)? {
                output.push(value);
            }
        }
        Ok(output)
    }
}

pub(crate) fn required_lhs(expr: &ExpressionNode) -> Result<&ExpressionNode, EvalError> {
    expr.lhs().ok_or_else(|| EvalError::MissingOperand {
        operator: expr.operator().name().to_string(),
    })
}

pub(crate) fn required_rhs(expr: &ExpressionNode) -> Result<&ExpressionNode, EvalError> {
    expr.rhs().ok_or_else(|| EvalError::MissingOperand {
        operator: expr.operator().name().to_string(),
    })
}

fn group_by_document(context: &Context) -> BTreeMap<usize, Vec<&MatchedValue>> {
    let mut groups: BTreeMap<usize, Vec<&MatchedValue>> = BTreeMap::new();
    for value in context {
        groups.entry(value.document_index()).or_default().push(value);
    }
    groups
}

/// Pairs left and right matches by document index.
///
/// ```
/// use quillq::document::node::Node;
/// use quillq::engine::context::{Context, MatchedValue};
/// use quillq::engine::evaluator::pair_matches;
///
/// let left: Context = [0, 1]
///     .into_iter()
///     .map(|doc| MatchedValue::from_node(Node::int(doc as i64), doc, vec![]))
///     .collect();
/// let right = Context::single(MatchedValue::from_node(Node::int(9), 2, vec![]));
///
/// let pairs = pair_matches(&left, &right).unwrap();
/// assert_eq!(pairs.len(), 2);
/// assert!(pairs.iter().all(|(_, r)| r.document_index() == 2));
/// ```
pub fn pair_matches<'c>(
    left: &'c Context,
    right: &'c Context,
) -> Result<Vec<(&'c MatchedValue, &'c MatchedValue)>, EvalError> {
    let left_groups = group_by_document(left);
    let right_groups = group_by_document(right);
    let orphans: Vec<&MatchedValue> = right_groups
        .iter()
        .filter(|(document, _)| !left_groups.contains_key(*document))
        .flat_map(|(_, values)| values.iter().copied())
        .collect();

    let mut pairs = Vec::new();
    for (document, lhs_values) in &left_groups {
        match right_groups.get(document) {
            Some(rhs_values) if rhs_values.len() == lhs_values.len() => {
                pairs.extend(lhs_values.iter().copied().zip(rhs_values.iter().copied()));
            }
            Some(rhs_values) => {
                return Err(EvalError::CardinalityMismatch {
                    document_index: *document,
                    left: lhs_values.len(),
                    right: rhs_values.len(),
                });
            }
            None => {
                for lhs in lhs_values {
                    pairs.extend(orphans.iter().map(|rhs| (*lhs, *rhs)));
                }
            }
        }
    }
    Ok(pairs)
}
