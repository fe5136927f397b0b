//! Error types for expression evaluation.

use thiserror::Error;

/// Errors that abort an evaluation.
///
/// A type mismatch between merge operands is not an error: the right-hand
/// side simply wins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Left and right operands produced different numbers of matches for the
    /// same document.
    #[error(
        "document {document_index}: cannot pair {left} left match(es) with {right} right match(es)"
    )]
    CardinalityMismatch {
        document_index: usize,
        left: usize,
        right: usize,
    },
    /// An alias names an anchor that does not exist in its document.
    #[error("document {document_index}, path '{path}': alias '*{alias}' has no matching anchor")]
    UnresolvedAlias {
        alias: String,
        document_index: usize,
        path: String,
    },
    /// Reserved for merge flags that cannot be combined.
    #[error("invalid merge mode combination: {0}")]
    InvalidModeCombination(String),
    /// A binary or unary operator is missing an operand in the tree.
    #[error("operator '{operator}' is missing an operand")]
    MissingOperand { operator: String },
    /// An operand of the wrong shape, such as a mapping used as a map key.
    #[error("operator '{operator}' cannot use a {kind} operand")]
    UnsupportedOperand { operator: String, kind: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_location() {
        let err = EvalError::UnresolvedAlias {
            alias: "cat".to_string(),
            document_index: 1,
            path: "a.b[0]".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("document 1"));
        assert!(message.contains("a.b[0]"));
        assert!(message.contains("*cat"));
    }

    #[test]
    fn test_cardinality_message() {
        let err = EvalError::CardinalityMismatch {
            document_index: 0,
            left: 2,
            right: 3,
        };
        assert_eq!(
            err.to_string(),
            "document 0: cannot pair 2 left match(es) with 3 right match(es)"
        );
    }
}
