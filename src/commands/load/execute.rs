use std::error::Error;

use serde::Serialize;
use tracing::info;

use super::LoadCmd;
use crate::commands::{Context, Execute};
use crate::db::{DatabaseBackend, DbError, LoadOptions, MemoryBackend};
use crate::flatten::FlattenResult;
use crate::pipeline::CompiledSchema;

/// Rows loaded into one table
#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table_name: String,
    pub rows: usize,
}

/// Result of the load command execution
#[derive(Debug, Serialize)]
pub struct LoadResult {
    pub backend: String,
    pub documents: usize,
    pub dry_run: bool,
    pub tables: Vec<TableCount>,
    pub total_rows: usize,
    pub diagnostics: usize,
    /// Statements recorded in dry-run mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<usize>,
}

/// Insert every table's rows. Tables without rows are skipped.
pub fn insert_all(
    compiled: &CompiledSchema,
    result: &FlattenResult,
    backend: &dyn DatabaseBackend,
    options: &LoadOptions,
) -> Result<Vec<TableCount>, DbError> {
    let mut counts = Vec::new();
    for (entity, table) in &compiled.tables {
        let rows = result.rows_for(entity);
        if rows.is_empty() {
            continue;
        }
        let inserted = backend.insert_rows(table, rows, options)?;
        counts.push(TableCount {
            table_name: table.table_name.clone(),
            rows: inserted,
        });
    }
    Ok(counts)
}

impl Execute for LoadCmd {
    type Output = LoadResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let compiled = ctx.compile_schema()?;
        let result = compiled.flatten_files(&self.files)?;

        let mut options = ctx.config.load;
        if let Some(batch_size) = self.batch_size {
            options.batch_size = batch_size as usize;
        }

        let (backend_name, tables, statements) = if self.dry_run {
            let backend = MemoryBackend::new();
            let tables = insert_all(&compiled, &result, &backend, &options)?;
            (backend.backend_name(), tables, Some(backend.statements().len()))
        } else {
            let backend = ctx.connect()?;
            let tables = insert_all(&compiled, &result, backend.as_ref(), &options)?;
            (backend.backend_name(), tables, None)
        };

        let total_rows = tables.iter().map(|t| t.rows).sum();
        info!(
            documents = self.files.len(),
            rows = total_rows,
            backend = backend_name,
            "Load finished"
        );

        Ok(LoadResult {
            backend: backend_name.to_string(),
            documents: self.files.len(),
            dry_run: self.dry_run,
            tables,
            total_rows,
            diagnostics: result.diagnostics.len(),
            statements,
        })
    }
}
