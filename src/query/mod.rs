//! Expression language front end.
//!
//! Turns an expression string such as `.a * {"b": .c}` into the
//! [`ExpressionNode`] tree consumed by the engine.

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{ExpressionNode, OperatorKind};
pub use error::ParseError;
pub use parser::Parser;
