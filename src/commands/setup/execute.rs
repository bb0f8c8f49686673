use std::error::Error;

use serde::Serialize;
use tracing::info;

use super::SetupCmd;
use crate::commands::{Context, Execute};
use crate::db::DatabaseBackend;
use crate::pipeline::CompiledSchema;

/// Result of the setup command execution
#[derive(Debug, Serialize)]
pub struct SetupResult {
    pub backend: String,
    pub tables: Vec<String>,
    pub reset: bool,
}

impl SetupCmd {
    /// Run setup against an already connected backend.
    pub fn setup(
        &self,
        compiled: &CompiledSchema,
        backend: &dyn DatabaseBackend,
    ) -> Result<SetupResult, Box<dyn Error>> {
        backend.setup_backend()?;
        let created = backend.create_tables(&compiled.tables, self.reset)?;
        info!(tables = created, reset = self.reset, backend = backend.backend_name(), "Created tables");

        Ok(SetupResult {
            backend: backend.backend_name().to_string(),
            tables: compiled.tables.values().map(|t| t.table_name.clone()).collect(),
            reset: self.reset,
        })
    }
}

impl Execute for SetupCmd {
    type Output = SetupResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let compiled = ctx.compile_schema()?;
        let backend = ctx.connect()?;
        self.setup(&compiled, backend.as_ref())
    }
}
