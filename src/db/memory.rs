//! In-memory backend that records statements instead of running them.
//!
//! Used for `--dry-run` loads and tests.

use std::sync::Mutex;

use super::backend::DatabaseBackend;
use super::DbError;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    statements: Mutex<Vec<String>>,
    pending_failures: Mutex<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `execute` fail.
    pub fn fail_next(&self, count: usize) {
        if let Ok(mut pending) = self.pending_failures.lock() {
            *pending = count;
        }
    }

    /// Statements executed successfully, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statements
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl DatabaseBackend for MemoryBackend {
    fn backend_name(&self) -> &'static str {
        "Memory"
    }

    fn execute(&self, sql: &str) -> Result<(), DbError> {
        let mut pending = self.pending_failures.lock().map_err(|e| DbError::QueryFailed {
            message: format!("Failed to acquire lock: {}", e),
        })?;
        if *pending > 0 {
            *pending -= 1;
            return Err(DbError::QueryFailed {
                message: "simulated failure".to_string(),
            });
        }
        drop(pending);

        self.statements
            .lock()
            .map_err(|e| DbError::QueryFailed {
                message: format!("Failed to acquire lock: {}", e),
            })?
            .push(sql.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_records_statements_in_order() {
        let backend = MemoryBackend::new();
        backend.execute("SELECT 1").unwrap();
        backend.execute("SELECT 2").unwrap();
        assert_eq!(backend.statements(), vec!["SELECT 1", "SELECT 2"]);
        assert_eq!(backend.backend_name(), "Memory");
    }

    #[rstest]
    fn test_simulated_failures_are_not_recorded() {
        let backend = MemoryBackend::new();
        backend.fail_next(1);
        assert!(backend.execute("SELECT 1").is_err());
        backend.execute("SELECT 2").unwrap();
        assert_eq!(backend.statements(), vec!["SELECT 2"]);
    }
}
