//! File I/O for YAML documents.
//!
//! This module loads YAML streams from disk or stdin and renders query
//! results back to YAML text.

pub mod loader;
pub mod printer;
