//! quillq - a structural YAML query engine with anchor-aware document merging.
//!
//! Expressions such as `.a * .b` or `. * {"a": .b}` are parsed into an
//! operator tree ([`query`]) and evaluated ([`engine`]) against a
//! [`document::tree::DocumentStore`] built from one or more YAML streams.
//! Results keep their source document index and path, and are rendered by
//! [`file::printer::Printer`].

pub mod config;
pub mod document;
pub mod engine;
pub mod file;
pub mod query;
