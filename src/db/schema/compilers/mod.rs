//! Database schema compilers.
//!
//! Generates backend-specific statements from derived table schemas.

pub mod postgres;

pub use postgres::PostgresCompiler;
