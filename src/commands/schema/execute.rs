use std::error::Error;

use serde::Serialize;

use super::SchemaCmd;
use crate::commands::{Context, Execute};
use crate::db::schema::{PostgresCompiler, TableSchema};

/// One column of a derived table
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: String,
}

/// One derived table
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub entity: String,
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub columns: Vec<ColumnSummary>,
}

impl From<&TableSchema> for TableSummary {
    fn from(table: &TableSchema) -> Self {
        Self {
            entity: table.entity.clone(),
            table_name: table.table_name.clone(),
            parent: table.parent.clone(),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnSummary {
                    name: c.name.clone(),
                    kind: c.kind.as_str().to_string(),
                })
                .collect(),
        }
    }
}

/// Result of the schema command execution
#[derive(Debug, Serialize)]
pub struct SchemaResult {
    pub root_element: String,
    pub tables: Vec<TableSummary>,
    /// DDL statements, present with `--ddl`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddl: Option<Vec<String>>,
}

impl Execute for SchemaCmd {
    type Output = SchemaResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let compiled = ctx.compile_schema()?;

        let selected: Vec<&TableSchema> = compiled
            .tables
            .values()
            .filter(|t| match &self.table {
                Some(name) => &t.table_name == name || &t.entity == name,
                None => true,
            })
            .collect();

        if let Some(name) = &self.table {
            if selected.is_empty() {
                return Err(format!("No table named '{}'", name).into());
            }
        }

        let ddl = self
            .ddl
            .then(|| PostgresCompiler::compile_all(selected.iter().copied()));

        Ok(SchemaResult {
            root_element: compiled.graph.root_name().to_string(),
            tables: selected.into_iter().map(TableSummary::from).collect(),
            ddl,
        })
    }
}
