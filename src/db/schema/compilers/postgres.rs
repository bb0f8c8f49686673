//! PostgreSQL / PostGIS DDL compiler.
//!
//! Generates `CREATE TABLE` / `DROP TABLE` / `INSERT` statements from derived
//! table schemas. Every identifier is double-quoted; the output is
//! deterministic for a given schema.

use crate::db::escape::quote_identifier;
use crate::db::schema::definition::TableSchema;

/// Compiler for generating PostgreSQL statements from table schemas.
pub struct PostgresCompiler;

impl PostgresCompiler {
    /// Statement enabling the geometry column type.
    pub const POSTGIS_EXTENSION: &'static str = "CREATE EXTENSION IF NOT EXISTS postgis";

    /// Generate DDL for a single table.
    ///
    /// Produces output in the format:
    /// ```sql
    /// CREATE TABLE IF NOT EXISTS "stop_place" (
    ///     "name" TEXT,
    ///     "geom" geometry(Geometry, 4326)
    /// )
    /// ```
    pub fn compile_table(table: &TableSchema) -> String {
        let columns = table
            .columns
            .iter()
            .map(|c| format!("    {} {}", quote_identifier(&c.name), c.kind.postgres_type()))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            quote_identifier(&table.table_name),
            columns
        )
    }

    /// Generate DDL for all tables, in the given order.
    pub fn compile_all<'a>(tables: impl IntoIterator<Item = &'a TableSchema>) -> Vec<String> {
        tables.into_iter().map(Self::compile_table).collect()
    }

    pub fn compile_drop(table: &TableSchema) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_identifier(&table.table_name))
    }

    /// Generate a multi-row `INSERT`.
    ///
    /// # Arguments
    /// * `table_name` - Target table (unquoted)
    /// * `columns` - Column names, in the order used by every row literal
    /// * `row_literals` - Pre-encoded rows like `('a', NULL, '{}')`
    ///
    /// # Example
    /// ```ignore
    /// let sql = PostgresCompiler::compile_insert("quay", &["id".into()], &["('Q:1')".into()]);
    /// // INSERT INTO "quay" ("id") VALUES
    /// // ('Q:1')
    /// ```
    pub fn compile_insert(table_name: &str, columns: &[String], row_literals: &[String]) -> String {
        let column_list = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES\n{}",
            quote_identifier(table_name),
            column_list,
            row_literals.join(",\n")
        )
    }
}
