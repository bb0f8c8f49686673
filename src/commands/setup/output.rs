//! Output formatting for setup command results.

use super::execute::SetupResult;
use crate::output::Outputable;

impl Outputable for SetupResult {
    fn to_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Database Setup ({})\n\n", self.backend));
        if self.reset {
            output.push_str("Tables (dropped and recreated):\n");
        } else {
            output.push_str("Tables:\n");
        }

        for table in &self.tables {
            output.push_str(&format!("  ✓ {}\n", table));
        }

        output.push_str(&format!("\n{} tables ready.", self.tables.len()));
        output
    }
}
