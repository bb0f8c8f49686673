//! Schema graph simplification.
//!
//! Reduces the raw XSD graph to the elements and attributes that actually
//! appear in instance documents, with unique child names per node.

mod simplify;

pub use simplify::{simplify, SimplifiedGraph, SimplifiedNode};

use thiserror::Error;

use crate::xsd::NodeId;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Root node {id} is not defined in the schema graph")]
    UnknownRoot { id: NodeId },

    #[error("Root node {id} is a {kind}, expected a named element")]
    InvalidRoot { id: NodeId, kind: String },
}
