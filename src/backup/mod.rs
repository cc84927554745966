pub(crate) mod compress;
pub(crate) mod db_dump;
mod logic;
pub(crate) mod naming;
pub(crate) mod notify;
pub(crate) mod s3_upload;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use compress::GzipCompressor;
use db_dump::PgDumpExecutor;
use notify::{NotificationSink, SmtpNotifier};
use s3_upload::S3Uploader;

pub use logic::{BackupOrchestrator, RunConfig, RunResult, RunStatus, UploadMode};

/// Public entry point for the backup process.
///
/// Wires the production capabilities (pg_dump, gzip, S3, SMTP) into the
/// orchestrator and runs one backup of the selected connection.
pub async fn run_backup_flow(app_config: &AppConfig, run_config: &RunConfig) -> Result<RunResult> {
    let connection = app_config.connection(run_config.database.as_deref())?;

    let dumper = PgDumpExecutor;
    let compressor = GzipCompressor;

    let uploader = match run_config.upload {
        UploadMode::None => None,
        _ => {
            let s3 = app_config.s3.clone().context(
                "Upload requested but s3_storage is not fully configured in config.json",
            )?;
            Some(S3Uploader::new(s3))
        }
    };
    let notifier = app_config.mail.clone().map(SmtpNotifier::new);

    let orchestrator = BackupOrchestrator {
        dumper: &dumper,
        compressor: &compressor,
        uploader: uploader.as_ref().map(|u| u as &dyn s3_upload::RemoteUploader),
        notifier: notifier.as_ref().map(|n| n as &dyn NotificationSink),
    };

    orchestrator.run(run_config, &connection).await
}
