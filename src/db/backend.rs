//! Database backend trait for abstracting different sink implementations.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::insert::{encode_batches, InsertBatch, LoadOptions};
use super::schema::{PostgresCompiler, TableSchema};
use super::DbError;
use crate::flatten::Row;

/// Trait for backends that tables are created in and rows are loaded into.
///
/// Only `execute` and `backend_name` are backend specific; table creation and
/// batched inserts are expressed as SQL and share one implementation.
pub trait DatabaseBackend: Send + Sync {
    /// Get the backend name for logging/debugging.
    fn backend_name(&self) -> &'static str;

    /// Execute one or more SQL statements.
    fn execute(&self, sql: &str) -> Result<(), DbError>;

    /// Perform backend-specific setup before tables are created.
    ///
    /// # Default Implementation
    /// Enables PostGIS.
    fn setup_backend(&self) -> Result<(), DbError> {
        self.execute(PostgresCompiler::POSTGIS_EXTENSION)
    }

    /// Create every table, dropping existing ones first when `reset` is set.
    ///
    /// Returns the number of tables created.
    fn create_tables(
        &self,
        tables: &BTreeMap<String, TableSchema>,
        reset: bool,
    ) -> Result<usize, DbError> {
        for table in tables.values() {
            if reset {
                self.execute(&PostgresCompiler::compile_drop(table))?;
            }
            self.execute(&PostgresCompiler::compile_table(table))?;
        }
        Ok(tables.len())
    }

    /// Insert rows into a table in batches.
    ///
    /// Each batch is retried up to `options.max_retries` times. Zero rows is a
    /// no-op. Returns the number of rows inserted.
    fn insert_rows(
        &self,
        table: &TableSchema,
        rows: &[Row],
        options: &LoadOptions,
    ) -> Result<usize, DbError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let batches = encode_batches(table, rows, options.batch_size)?;
        for batch in &batches {
            execute_batch(self, batch, options.max_retries)?;
        }

        debug!(
            table = %table.table_name,
            rows = rows.len(),
            batches = batches.len(),
            backend = self.backend_name(),
            "Inserted rows"
        );
        Ok(rows.len())
    }
}

fn execute_batch<B: DatabaseBackend + ?Sized>(
    backend: &B,
    batch: &InsertBatch,
    max_retries: u32,
) -> Result<(), DbError> {
    let sql = batch.to_sql();
    let mut attempt = 0;
    loop {
        match backend.execute(&sql) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < max_retries => {
                attempt += 1;
                warn!(
                    table = %batch.table_name,
                    batch = batch.index,
                    attempt,
                    error = %e,
                    "Batch insert failed, retrying"
                );
            }
            Err(e) => {
                return Err(DbError::BatchFailed {
                    table: batch.table_name.clone(),
                    batch: batch.index,
                    message: e.to_string(),
                });
            }
        }
    }
}
