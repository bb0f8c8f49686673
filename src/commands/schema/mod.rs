mod execute;
mod output;
mod output_tests;

use clap::Args;

/// Show the tables derived from the XSD corpus
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  netex_loader schema                       # Table summary
  netex_loader schema --ddl                 # CREATE TABLE statements
  netex_loader --xsd ./xsd_netex schema     # Use another corpus directory
  netex_loader schema --table stop_place    # Only one table")]
pub struct SchemaCmd {
    /// Print CREATE TABLE statements instead of the summary
    #[arg(long, default_value_t = false)]
    pub ddl: bool,

    /// Only show the table with this name (snake_case) or entity
    #[arg(short, long)]
    pub table: Option<String>,
}
