//! XML Schema compilation.
//!
//! Turns a corpus of XSD files into a [`RawGraph`]: one arena node per named
//! type/element/group and one per inline structural child, with typed edges
//! (`none`, `type`, `ref`, `substitution_group`, `base`). Containment edges
//! crossing a `sequence` are flagged `is_list`.
//!
//! Namespace prefixes on schema tags are ignored; `type`/`ref`/`base`
//! attribute values are kept verbatim and matched by name.

mod compiler;
mod graph;

pub use compiler::{compile, SchemaCompiler};
pub use graph::{EdgeKind, NodeId, NodeKind, RawEdge, RawGraph, RawNode};

use thiserror::Error;

/// Schema compilation error types
#[derive(Error, Debug)]
pub enum XsdError {
    #[error("Failed to read schema file '{path}': {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to parse schema file '{path}': {message}")]
    ParseFailed { path: String, message: String },

    #[error("Failed to scan schema directory '{path}': {message}")]
    WalkFailed { path: String, message: String },
}
