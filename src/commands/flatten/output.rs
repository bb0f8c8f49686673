//! Output formatting for flatten command results.

use super::execute::FlattenOutput;
use crate::db::schema::ID_COLUMN;
use crate::flatten::Value;
use crate::output::Outputable;

fn format_value(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Geometry(g) => g.to_wkt(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

impl Outputable for FlattenOutput {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Document: {}", self.file));

        if self.entities.is_empty() {
            lines.push(String::new());
            lines.push("No rows.".to_string());
        }

        for entity in &self.entities {
            lines.push(String::new());
            lines.push(format!("{} ({}):", entity.entity, entity.rows.len()));
            for row in &entity.rows {
                lines.push(format!("  {}", row.id().unwrap_or("-")));
                for (column, value) in row.iter() {
                    if column == ID_COLUMN || value.is_null() {
                        continue;
                    }
                    lines.push(format!("    {}: {}", column, format_value(value)));
                }
            }
        }

        if !self.diagnostics.is_empty() {
            lines.push(String::new());
            lines.push(format!("Diagnostics ({}):", self.diagnostics.len()));
            for diagnostic in &self.diagnostics {
                lines.push(format!("  [{}] {}", diagnostic.kind(), diagnostic));
            }
        }

        lines.join("\n")
    }
}
