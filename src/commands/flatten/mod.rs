mod execute;
mod output;

use std::path::PathBuf;

use clap::Args;

/// Flatten one NeTEx document and show the rows it produces
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  netex_loader flatten stops.xml                    # Rows for every entity
  netex_loader flatten stops.xml --entity Quay      # Only Quay rows
  netex_loader flatten stops.xml --format json      # Rows as JSON")]
pub struct FlattenCmd {
    /// NeTEx XML document
    pub file: PathBuf,

    /// Only show rows of this entity
    #[arg(short, long)]
    pub entity: Option<String>,
}
