mod execute;
mod output;
mod output_tests;

use std::path::PathBuf;

use clap::Args;

/// Flatten NeTEx documents and load their rows into the database
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  netex_loader load data/*.xml                      # Load into the configured database
  netex_loader load stops.xml --dry-run             # Encode batches without a database
  netex_loader load stops.xml --batch-size 500      # Smaller INSERT batches

Run `netex_loader setup` first to create the tables.")]
pub struct LoadCmd {
    /// NeTEx XML documents
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Record the INSERT statements in memory instead of running them
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Rows per INSERT statement (overrides the config file)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    pub batch_size: Option<u32>,
}
