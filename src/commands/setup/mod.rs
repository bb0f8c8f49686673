mod execute;
mod output;

use clap::Args;

/// Create the PostGIS extension and one table per entity
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  netex_loader setup                        # Create missing tables
  netex_loader setup --reset                # Drop and recreate all tables
  DATABASE_URL=postgres://localhost/netex netex_loader setup")]
pub struct SetupCmd {
    /// Drop existing tables before creating them
    #[arg(long, default_value_t = false)]
    pub reset: bool,
}
