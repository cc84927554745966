// dbbackup/src/backup/logic.rs
use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;

use crate::backup::compress::Compressor;
use crate::backup::db_dump::{DumpExecutor, DumpOutcome};
use crate::backup::naming::BackupArtifact;
use crate::backup::notify::NotificationSink;
use crate::backup::s3_upload::{RemoteUploader, UploadOutcome};
use crate::config::DatabaseConnection;

/// What should happen to the dump after it is produced locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// No remote upload; the dump stays on local disk.
    None,
    /// Upload to object storage, keep the local copy.
    KeepLocal,
    /// Upload to object storage, then delete the local copy.
    DeleteLocal,
}

/// Immutable input to one backup run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Connection name to back up. The configured default when absent.
    pub database: Option<String>,
    /// Bare file name or full path for the dump. Generated when absent.
    pub filename: Option<String>,
    /// Compression comes from configuration, not from a CLI flag.
    pub compress: bool,
    pub upload: UploadMode,
    pub dump_dir: PathBuf,
    /// Originating request URI when the backup was triggered server-side.
    /// Prefixed to the notification subject to correlate runs.
    pub request_context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    DumpFailed,
    CompressionFailed,
    UploadFailed,
}

/// Terminal report of one run. The artifact state is included even on partial
/// failure so callers know exactly what exists where.
#[derive(Debug)]
pub struct RunResult {
    pub status: RunStatus,
    pub message: String,
    pub artifact: BackupArtifact,
    /// Non-fatal problems, currently only a failed local cleanup after a
    /// successful upload.
    pub warning: Option<String>,
}

impl RunResult {
    fn terminal(status: RunStatus, message: String, artifact: BackupArtifact) -> Self {
        RunResult {
            status,
            message,
            artifact,
            warning: None,
        }
    }
}

/// Sequences dump, compression, upload and local cleanup for one run.
///
/// The orchestrator is the only place that decides whether a component
/// failure is terminal; components report typed outcomes and never abort the
/// process themselves. Uploader and notifier are optional capabilities: runs
/// that do not upload never need them.
pub struct BackupOrchestrator<'a> {
    pub dumper: &'a dyn DumpExecutor,
    pub compressor: &'a dyn Compressor,
    pub uploader: Option<&'a dyn RemoteUploader>,
    pub notifier: Option<&'a dyn NotificationSink>,
}

impl BackupOrchestrator<'_> {
    pub async fn run(
        &self,
        config: &RunConfig,
        database: &DatabaseConnection,
    ) -> Result<RunResult> {
        let mut artifact = BackupArtifact::resolve(
            config.filename.as_deref(),
            &database.name,
            &config.dump_dir,
            Local::now(),
        );

        if let Some(parent) = artifact.file_path().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create dump directory: {}", parent.display())
            })?;
        }

        match self.dumper.dump(database, artifact.file_path()).await? {
            DumpOutcome::Success => {
                println!(
                    "✅ Database {} dumped to {}",
                    database.name,
                    artifact.file_path().display()
                );
            }
            DumpOutcome::Failure(detail) => {
                return Ok(RunResult::terminal(
                    RunStatus::DumpFailed,
                    format!("Database dump failed: {}", detail),
                    artifact,
                ));
            }
        }

        if config.compress {
            match self.compressor.compress(artifact.file_path()) {
                Ok(()) => {
                    // Name and path flip to .gz together, only now that the
                    // compressed file is known to exist.
                    artifact.mark_compressed();
                    println!("✅ Dump compressed to {}", artifact.file_path().display());
                }
                Err(e) => {
                    // The uncompressed dump is the only known-good artifact;
                    // it stays on disk.
                    return Ok(RunResult::terminal(
                        RunStatus::CompressionFailed,
                        format!(
                            "Compression failed: {:#}. Uncompressed dump kept at {}",
                            e,
                            artifact.file_path().display()
                        ),
                        artifact,
                    ));
                }
            }
        }

        let mut warning = None;

        if config.upload != UploadMode::None {
            let uploader = self
                .uploader
                .context("Upload requested but no remote uploader is configured")?;

            match uploader.upload(artifact.file_path(), artifact.file_name()).await {
                UploadOutcome::Success => {
                    artifact.mark_uploaded();
                    println!("✅ Dump {} uploaded to object storage", artifact.file_name());
                }
                UploadOutcome::Failure(detail) => {
                    self.notify_upload_failure(config, &detail);
                    // The local file is the only copy; it is preserved even
                    // when delete-local was requested.
                    return Ok(RunResult::terminal(
                        RunStatus::UploadFailed,
                        format!(
                            "Upload failed: {}. Local dump kept at {}",
                            detail,
                            artifact.file_path().display()
                        ),
                        artifact,
                    ));
                }
            }

            if config.upload == UploadMode::DeleteLocal {
                match fs::remove_file(artifact.file_path()) {
                    Ok(()) => println!(
                        "🧹 Local dump removed: {}",
                        artifact.file_path().display()
                    ),
                    Err(e) => {
                        // The backup is safely in remote storage; a cleanup
                        // failure does not downgrade the run.
                        warning = Some(format!(
                            "Failed to remove local dump {}: {}",
                            artifact.file_path().display(),
                            e
                        ));
                    }
                }
            }
        }

        let message = if artifact.uploaded && config.upload == UploadMode::DeleteLocal {
            format!(
                "Backup completed: stored remotely as {} (local copy removed)",
                artifact.file_name()
            )
        } else if artifact.uploaded {
            format!(
                "Backup completed: {} (also stored remotely as {})",
                artifact.file_path().display(),
                artifact.file_name()
            )
        } else {
            format!("Backup completed: {}", artifact.file_path().display())
        };

        Ok(RunResult {
            status: RunStatus::Succeeded,
            message,
            artifact,
            warning,
        })
    }

    fn notify_upload_failure(&self, config: &RunConfig, detail: &str) {
        let subject = match &config.request_context {
            Some(ctx) => format!("{} - db:backup error!", ctx),
            None => "db:backup error!".to_string(),
        };
        match self.notifier {
            Some(notifier) => notifier.notify(&subject, detail),
            None => eprintln!("⚠️ Mail is not configured; skipping failure notification"),
        }
    }
}
