//! Output formatting for load command results.

use super::execute::LoadResult;
use crate::output::Outputable;

impl Outputable for LoadResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        let mode = if self.dry_run { ", dry-run" } else { "" };
        lines.push(format!("Load ({}{})", self.backend, mode));
        lines.push(String::new());
        lines.push(format!("Documents: {}", self.documents));

        if self.tables.is_empty() {
            lines.push("No rows loaded.".to_string());
        } else {
            lines.push(format!("Tables ({}):", self.tables.len()));
            let width = self.tables.iter().map(|t| t.table_name.len()).max().unwrap_or(0);
            for table in &self.tables {
                lines.push(format!("  {:<width$}  {}", table.table_name, table.rows, width = width));
            }
        }

        lines.push(String::new());
        lines.push(format!("Rows: {}", self.total_rows));
        lines.push(format!("Diagnostics: {}", self.diagnostics));
        if let Some(statements) = self.statements {
            lines.push(format!("Statements recorded: {}", statements));
        }

        lines.join("\n")
    }
}
