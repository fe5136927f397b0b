//! Handlers for the path, construction and sequencing operators.

use super::context::{Context, MatchedValue};
use super::error::EvalError;
use super::evaluator::{required_lhs, required_rhs, Engine};
use crate::document::node::{KeyIdentity, Node, NodeContent, MERGE_KEY};
use crate::document::tree::{format_path, AliasResolver, PathElement};
use crate::query::ast::{ExpressionNode, OperatorKind};
use indexmap::IndexMap;
use std::rc::Rc;

fn wrong_operator(expr: &ExpressionNode, expected: &str) -> EvalError {
    EvalError::UnsupportedOperand {
        operator: expected.to_string(),
        kind: expr.operator().name().to_string(),
    }
}

/// Follows an alias one hop so traversal can look inside it.
fn dereference<'n>(
    engine: &Engine<'n>,
    value: &'n MatchedValue,
) -> Result<&'n Node, EvalError> {
    let node = value.node();
    match node.alias_target() {
        None => Ok(node),
        Some(name) => engine
            .store()
            .resolver(value.document_index())
            .resolve(node)
            .ok_or_else(|| EvalError::UnresolvedAlias {
                alias: name.to_string(),
                document_index: value.document_index(),
                path: value.path_string(),
            }),
    }
}

pub(crate) fn self_reference(
    _engine: &Engine<'_>,
    context: &Context,
    _expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    Ok(context.clone())
}

pub(crate) fn traverse_key(
    engine: &Engine<'_>,
    context: &Context,
    expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    let OperatorKind::TraverseKey(key) = expr.operator() else {
        return Err(wrong_operator(expr, "traverse"));
    };

    let mut output = Context::new();
    for value in context {
        let node = dereference(engine, value)?;
        let resolver = engine.store().resolver(value.document_index());
        if let Some(child) = lookup_key(node, key, resolver) {
            output.push(value.child(Rc::new(child.clone()), PathElement::Key(key.clone())));
        }
    }
    Ok(output)
}

/// Finds `key` in a mapping, directly or through its `<<` merge sources.
///
/// Direct entries win over merged ones, and earlier merge sources win over
/// later ones. Merge sources are followed one alias hop deep.
fn lookup_key<'n>(node: &'n Node, key: &str, resolver: &'n dyn AliasResolver) -> Option<&'n Node> {
    if let Some(found) = node.get(key) {
        return Some(found);
    }

    let sources = node.get(MERGE_KEY)?;
    let source_list: Vec<&Node> = match sources.content() {
        NodeContent::Sequence(items) => items.iter().collect(),
        _ => vec![sources],
    };
    source_list.into_iter().find_map(|source| {
        let target = if source.is_alias() {
            resolver.resolve(source)?
        } else {
            source
        };
        target.get(key)
    })
}

pub(crate) fn traverse_index(
    engine: &Engine<'_>,
    context: &Context,
    expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    let OperatorKind::TraverseIndex(index) = expr.operator() else {
        return Err(wrong_operator(expr, "index"));
    };

    let mut output = Context::new();
    for value in context {
        let Some(items) = dereference(engine, value)?.items() else {
            continue;
        };
        let position = if *index < 0 {
            items.len().checked_sub(index.unsigned_abs() as usize)
        } else {
            Some(*index as usize)
        };
        if let Some((position, item)) = position.and_then(|p| items.get(p).map(|item| (p, item))) {
            output.push(value.child(Rc::new(item.clone()), PathElement::Index(position)));
        }
    }
    Ok(output)
}

pub(crate) fn splat(
    engine: &Engine<'_>,
    context: &Context,
    _expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    let mut output = Context::new();
    for value in context {
        match dereference(engine, value)?.content() {
            NodeContent::Mapping(entries) => {
                for (key, child) in entries {
                    output.push(value.child(
                        Rc::new(child.clone()),
                        PathElement::Key(key.key_text()),
                    ));
                }
            }
            NodeContent::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    output.push(value.child(Rc::new(item.clone()), PathElement::Index(index)));
                }
            }
            NodeContent::Scalar(_) | NodeContent::Alias { .. } => {}
        }
    }
    Ok(output)
}

/// One copy of the literal per input match.
pub(crate) fn literal(
    _engine: &Engine<'_>,
    context: &Context,
    expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    let OperatorKind::Literal(node) = expr.operator() else {
        return Err(wrong_operator(expr, "literal"));
    };
    let shared = Rc::new(node.clone());
    Ok(context
        .iter()
        .map(|value| MatchedValue::new(Rc::clone(&shared), value.document_index(), Vec::new()))
        .collect())
}

/// `key: value`, producing single-entry mappings.
pub(crate) fn create_map(
    engine: &Engine<'_>,
    context: &Context,
    expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    engine.cross_function(context, expr, |key, value| {
        if key.node().scalar_value().is_none() {
            return Err(EvalError::UnsupportedOperand {
                operator: expr.operator().name().to_string(),
                kind: key.node().kind().to_string(),
            });
        }
        let entry = Node::mapping(vec![(key.node().clone(), value.node().clone())]);
        Ok(Some(MatchedValue::from_node(
            entry,
            key.document_index(),
            Vec::new(),
        )))
    })
}

/// `{ ... }`: folds the entries built for each input match into one mapping.
pub(crate) fn collect_object(
    engine: &Engine<'_>,
    context: &Context,
    expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    let mut output = Context::new();
    for value in context {
        let mut entries: IndexMap<KeyIdentity, (Node, Node)> = IndexMap::new();
        if let Some(body) = expr.lhs() {
            let built = engine.evaluate(&Context::single(value.clone()), body)?;
            for piece in &built {
                let Some(pairs) = piece.node().entries() else {
                    return Err(EvalError::UnsupportedOperand {
                        operator: expr.operator().name().to_string(),
                        kind: piece.node().kind().to_string(),
                    });
                };
                for (key, child) in pairs {
                    entries.insert(key.key_identity(), (key.clone(), child.clone()));
                }
            }
        }
        tracing::trace!(
            document = value.document_index(),
            path = %format_path(value.path()),
            keys = entries.len(),
            "collected object"
        );
        let object = Node::mapping(entries.into_values().collect());
        output.push(MatchedValue::from_node(object, value.document_index(), Vec::new()));
    }
    Ok(output)
}

pub(crate) fn pipe(
    engine: &Engine<'_>,
    context: &Context,
    expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    let intermediate = engine.evaluate(context, required_lhs(expr)?)?;
    engine.evaluate(&intermediate, required_rhs(expr)?)
}

pub(crate) fn union(
    engine: &Engine<'_>,
    context: &Context,
    expr: &ExpressionNode,
) -> Result<Context, EvalError> {
    let mut output = engine.evaluate(context, required_lhs(expr)?)?;
    output.extend(engine.evaluate(context, required_rhs(expr)?)?);
    Ok(output)
}
