//! Relational sink: table schemas, SQL encoding and database backends.
//!
//! This module provides the load side of the pipeline:
//! - Table derivation and DDL compilation (`schema`)
//! - Literal escaping and batched `INSERT` encoding
//! - Backends behind [`DatabaseBackend`] (PostgreSQL, in-memory recorder)
//! - Backend selection from config file, environment or URL
//!
//! # Type Decisions
//!
//! **Why SQL text instead of bind parameters?**
//! Rows in one table have varying column sets and nested values (JSONB,
//! arrays, PostGIS geometry constructors). Encoding each batch as a single
//! multi-row `INSERT` keeps one round trip per batch and lets the in-memory
//! backend record exactly what would have run.

mod backend;
mod config;
mod escape;
mod insert;
mod memory;
mod postgres;
pub mod schema;

pub use backend::DatabaseBackend;
pub use config::{DatabaseConfig, PostgresConfig};
pub use escape::{escape_literal, quote_identifier, quote_literal};
pub use insert::{encode_batches, encode_value, InsertBatch, LoadOptions};
pub use memory::MemoryBackend;
pub use self::postgres::PostgresBackend;

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to connect to database: {message}")]
    ConnectFailed { message: String },

    #[error("Query failed: {message}")]
    QueryFailed { message: String },

    #[error("Failed to encode value: {message}")]
    EncodeFailed { message: String },

    #[error("Batch {batch} for table '{table}' failed: {message}")]
    BatchFailed {
        table: String,
        batch: usize,
        message: String,
    },
}
