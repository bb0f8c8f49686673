//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing (`mod.rs`)
//! - The `Execute` implementation and result types (`execute.rs`)
//! - The `Outputable` implementation (`output.rs`)

mod flatten;
mod load;
mod schema;
mod setup;

pub use flatten::FlattenCmd;
pub use load::LoadCmd;
pub use schema::SchemaCmd;
pub use setup::SetupCmd;

use clap::Subcommand;
use std::error::Error;

use crate::config::ConfigFile;
use crate::db::{DatabaseBackend, DatabaseConfig};
use crate::output::{OutputFormat, Outputable};
use crate::pipeline::CompiledSchema;

/// Everything a command needs from its environment.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ConfigFile,
    pub database: DatabaseConfig,
}

impl Context {
    pub fn new(config: ConfigFile, database: DatabaseConfig) -> Self {
        Self { config, database }
    }

    /// Compile the configured XSD corpus.
    pub fn compile_schema(&self) -> Result<CompiledSchema, Box<dyn Error>> {
        Ok(CompiledSchema::build(&self.config.schema)?)
    }

    pub fn connect(&self) -> Result<Box<dyn DatabaseBackend>, Box<dyn Error>> {
        self.database.connect()
    }
}

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>>;
}

/// Trait for running a command and formatting its result.
pub trait CommandRunner {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>>;
}

impl<C: Execute> CommandRunner for C {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the tables derived from the XSD corpus
    Schema(SchemaCmd),

    /// Create the PostGIS extension and all tables
    Setup(SetupCmd),

    /// Flatten one document and show its rows and diagnostics
    Flatten(FlattenCmd),

    /// Flatten documents and load their rows into the database
    Load(LoadCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Schema(cmd) => cmd.run(ctx, format),
            Command::Setup(cmd) => cmd.run(ctx, format),
            Command::Flatten(cmd) => cmd.run(ctx, format),
            Command::Load(cmd) => cmd.run(ctx, format),
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().unwrap_or(&String::new())).into())
            }
        }
    }
}
