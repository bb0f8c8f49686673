//! Output formatting for schema command results.

use super::execute::SchemaResult;
use crate::output::Outputable;

impl Outputable for SchemaResult {
    fn to_table(&self) -> String {
        if let Some(ddl) = &self.ddl {
            return ddl
                .iter()
                .map(|statement| format!("{};", statement))
                .collect::<Vec<_>>()
                .join("\n\n");
        }

        let mut lines = Vec::new();
        lines.push(format!("Schema: {}", self.root_element));
        lines.push(String::new());

        if self.tables.is_empty() {
            lines.push("No tables derived.".to_string());
            return lines.join("\n");
        }

        lines.push(format!("Tables ({}):", self.tables.len()));
        for table in &self.tables {
            lines.push(String::new());
            match &table.parent {
                Some(parent) => lines.push(format!(
                    "{} ({}, parent: {})",
                    table.table_name, table.entity, parent
                )),
                None => lines.push(format!("{} ({})", table.table_name, table.entity)),
            }
            let width = table.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
            for column in &table.columns {
                lines.push(format!("  {:<width$}  {}", column.name, column.kind, width = width));
            }
        }

        lines.join("\n")
    }
}
