//! Expression evaluation engine.
//!
//! The engine walks an operator tree produced by [`crate::query`], passing
//! a [`Context`] of matched values from operator to operator. The merge
//! family lives in [`merge`]; everything else needed to build merge
//! operands lives in [`operators`].
//!
//! # Example
//!
//! ```
//! use quillq::document::tree::DocumentStore;
//! use quillq::engine::run;
//!
//! let store = DocumentStore::from_yaml("{a: {thing: one, cat: frog}, b: {missing: two, thing: two}}").unwrap();
//! let result = run(".a *? .b", &store).unwrap();
//!
//! let merged = result.matches()[0].node();
//! assert_eq!(merged.get("thing").and_then(|n| n.scalar_value()), Some("two"));
//! assert!(merged.get("missing").is_none());
//! ```

pub mod context;
pub mod error;
pub mod evaluator;
pub mod merge;
pub mod operators;

pub use context::{Context, MatchedValue};
pub use error::EvalError;
pub use evaluator::{Engine, OperatorHandler};
pub use merge::{merge_nodes, MergeFlags, Merger};

use crate::document::tree::DocumentStore;
use crate::query::{ParseError, Parser};
use thiserror::Error;

/// Failure to parse or evaluate an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Parses `expression` and evaluates it against every document in `store`.
pub fn run(expression: &str, store: &DocumentStore) -> Result<Context, QueryError> {
    let expr = Parser::parse(expression)?;
    tracing::debug!(expression, documents = store.len(), "running expression");
    Ok(Engine::new(store).evaluate_documents(&expr)?)
}
