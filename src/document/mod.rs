//! Document model: nodes, documents and the YAML reader.

pub mod node;
pub mod parser;
pub mod tree;

pub use node::{Comments, KeyIdentity, Node, NodeContent, NodeKind, Style};
pub use parser::{parse_documents, DocumentError};
pub use tree::{AliasResolver, AnchorRegistry, Document, DocumentStore, PathElement};
