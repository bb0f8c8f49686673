use std::error::Error;

use serde::Serialize;

use super::FlattenCmd;
use crate::commands::{Context, Execute};
use crate::flatten::{Diagnostic, Row};

/// Rows produced for one entity
#[derive(Debug, Clone, Serialize)]
pub struct EntityRows {
    pub entity: String,
    pub rows: Vec<Row>,
}

/// Result of the flatten command execution
#[derive(Debug, Serialize)]
pub struct FlattenOutput {
    pub file: String,
    pub entities: Vec<EntityRows>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Execute for FlattenCmd {
    type Output = FlattenOutput;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let compiled = ctx.compile_schema()?;

        if let Some(entity) = &self.entity {
            if !compiled.tables.contains_key(entity) {
                return Err(format!("'{}' is not an entity of the schema", entity).into());
            }
        }

        let result = compiled.flatten_file(&self.file)?;
        let entities = result
            .rows
            .into_iter()
            .filter(|(entity, rows)| {
                !rows.is_empty() && self.entity.as_ref().is_none_or(|wanted| wanted == entity)
            })
            .map(|(entity, rows)| EntityRows { entity, rows })
            .collect();

        Ok(FlattenOutput {
            file: self.file.display().to_string(),
            entities,
            diagnostics: result.diagnostics,
        })
    }
}
