//! Relational schema derived from the simplified schema graph.
//!
//! # Overview
//!
//! 1. **Core Types** (`definition.rs`):
//!    - `ColumnKind` - Storage shape (scalar, object, array_scalar, array_object, geometry)
//!    - `Column` - snake_case name, source tag, kind
//!    - `TableSchema` - One table per entity, with bookkeeping columns
//!
//! 2. **Derivation** (`derive.rs`):
//!    - `derive` - Walks the simplified graph and produces one `TableSchema` per entity
//!
//! 3. **Compilers** (`compilers/`):
//!    - `PostgresCompiler` - DDL and INSERT statements
//!
//! # Type Mapping
//!
//! | Column kind | PostgreSQL type |
//! |-------------|-----------------|
//! | scalar | TEXT |
//! | object | JSONB |
//! | array_scalar | TEXT[] |
//! | array_object | JSONB[] |
//! | geometry | geometry(Geometry, 4326) |

pub mod compilers;
mod definition;
mod derive;

pub use compilers::PostgresCompiler;
pub use definition::{
    Column, ColumnKind, TableSchema, ATTRIBUTES_COLUMN, GEOM_COLUMN, ID_COLUMN, PARENT_ID_COLUMN,
    STANDARD_COLUMNS,
};
pub use derive::{column_kind, derive};

use thiserror::Error;

use crate::xsd::NodeId;

/// Schema derivation error types
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Root node {id} is not part of the simplified graph")]
    UnknownRoot { id: NodeId },
}
