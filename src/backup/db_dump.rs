// dbbackup/src/backup/db_dump.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Command;
use which::which;

use crate::config::DatabaseConnection;

/// Result of one dump attempt. There is no partial success: either a complete
/// file was written to the destination or the run must not trust it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpOutcome {
    Success,
    Failure(String),
}

/// Capability that produces a consistent logical dump of a database.
///
/// An engine-reported failure comes back as `DumpOutcome::Failure` with the
/// engine's error text verbatim; `Err` is reserved for infrastructure problems
/// (dump tool missing, process could not be spawned).
#[async_trait]
pub trait DumpExecutor: Send + Sync {
    async fn dump(&self, database: &DatabaseConnection, destination: &Path) -> Result<DumpOutcome>;
}

// Helper function to find pg_dump executable
fn find_pg_dump_executable() -> Result<PathBuf> {
    which("pg_dump")
        .context("pg_dump executable not found in PATH. Please ensure PostgreSQL client tools are installed and in your PATH.")
}

/// Dumps a single database by shelling out to pg_dump.
pub struct PgDumpExecutor;

#[async_trait]
impl DumpExecutor for PgDumpExecutor {
    async fn dump(&self, database: &DatabaseConnection, destination: &Path) -> Result<DumpOutcome> {
        let pg_dump_path = find_pg_dump_executable()?;

        println!(
            "🔍 Dumping database {} to {} using pg_dump...",
            database.name,
            destination.display()
        );

        let output = Command::new(&pg_dump_path)
            .arg("-f")
            .arg(destination)
            .arg(&database.url) // pg_dump accepts the full URL
            .output()
            .with_context(|| {
                format!("Failed to execute pg_dump for database: {}", database.name)
            })?;

        if output.status.success() {
            return Ok(DumpOutcome::Success);
        }

        // pg_dump may have created a partial file before failing. It must not
        // be mistaken for a completed dump.
        let _ = std::fs::remove_file(destination);

        Ok(DumpOutcome::Failure(format!(
            "pg_dump for database {} failed with status: {}\nStderr: {}",
            database.name,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}
