//! Bulk-load encoding of flattened rows into multi-row `INSERT` statements.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::db::escape::quote_literal;
use crate::db::schema::{ColumnKind, PostgresCompiler, TableSchema};
use crate::flatten::{Row, Value};

use super::DbError;

const NULL: &str = "NULL";

fn default_batch_size() -> usize {
    1000
}

fn default_max_retries() -> u32 {
    2
}

/// Batching and retry settings for the load step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Extra attempts per batch after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
        }
    }
}

/// One `INSERT` worth of rows, all sharing the same column list.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertBatch {
    pub table_name: String,
    /// Position of this batch within the table's rows
    pub index: usize,
    pub columns: Vec<String>,
    /// Encoded tuples like `('Q:1', NULL)`
    pub rows: Vec<String>,
}

impl InsertBatch {
    pub fn to_sql(&self) -> String {
        PostgresCompiler::compile_insert(&self.table_name, &self.columns, &self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Split `rows` into batches of at most `batch_size`.
///
/// Each batch's column list is the sorted union of its rows' keys; a row
/// missing a column gets `NULL` there.
pub fn encode_batches(
    table: &TableSchema,
    rows: &[Row],
    batch_size: usize,
) -> Result<Vec<InsertBatch>, DbError> {
    rows.chunks(batch_size.max(1))
        .enumerate()
        .map(|(index, chunk)| encode_batch(table, chunk, index))
        .collect()
}

fn encode_batch(table: &TableSchema, chunk: &[Row], index: usize) -> Result<InsertBatch, DbError> {
    let columns: BTreeSet<&str> = chunk.iter().flat_map(Row::columns).collect();
    let kinds: Vec<ColumnKind> = columns
        .iter()
        .map(|c| table.column(c).map_or(ColumnKind::Scalar, |col| col.kind))
        .collect();

    let mut encoded_rows = Vec::with_capacity(chunk.len());
    for row in chunk {
        let mut values = Vec::with_capacity(columns.len());
        for (column, kind) in columns.iter().zip(&kinds) {
            match row.get(column) {
                Some(value) => values.push(encode_value(value, *kind)?),
                None => values.push(NULL.to_string()),
            }
        }
        encoded_rows.push(format!("({})", values.join(", ")));
    }

    Ok(InsertBatch {
        table_name: table.table_name.clone(),
        index,
        columns: columns.into_iter().map(str::to_string).collect(),
        rows: encoded_rows,
    })
}

/// Encode a value as a SQL literal for a column of the given kind.
///
/// Text headed for a JSONB column is stored as a JSON string, so a list of
/// refs in an object-array column still loads. A single text or object bound
/// for a JSONB[] column becomes a one-element array.
pub fn encode_value(value: &Value, kind: ColumnKind) -> Result<String, DbError> {
    let sql = match (value, kind) {
        (Value::Null, _) => NULL.to_string(),
        (Value::Geometry(g), _) if !g.is_finite() => NULL.to_string(),
        (Value::Geometry(g), _) => {
            format!("ST_SetSRID(ST_GeomFromText({}), 4326)", quote_literal(&g.to_wkt()))
        }
        (Value::List(items), _) if items.is_empty() => "'{}'".to_string(),
        (Value::List(items), _) => {
            let item_kind = match kind {
                ColumnKind::Object | ColumnKind::ArrayObject => ColumnKind::Object,
                _ => ColumnKind::Scalar,
            };
            let encoded = items
                .iter()
                .map(|item| encode_value(item, item_kind))
                .collect::<Result<Vec<_>, _>>()?;
            format!("ARRAY[{}]", encoded.join(", "))
        }
        (Value::Text(s), ColumnKind::Scalar | ColumnKind::ArrayScalar | ColumnKind::Geometry) => {
            quote_literal(s)
        }
        (Value::Text(_) | Value::Object(_), ColumnKind::ArrayObject) => {
            format!("ARRAY[{}]", jsonb(value)?)
        }
        (Value::Text(_) | Value::Object(_), _) => jsonb(value)?,
    };
    Ok(sql)
}

fn jsonb(value: &Value) -> Result<String, DbError> {
    let json = serde_json::to_string(value).map_err(|e| DbError::EncodeFailed {
        message: e.to_string(),
    })?;
    Ok(format!("{}::jsonb", quote_literal(&json)))
}
