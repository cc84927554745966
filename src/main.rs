//! Database Backup Tool
//!
//! Dumps a configured database to the local dump directory, optionally
//! compresses it, and optionally uploads it to S3-compatible object storage.

// dbbackup/src/main.rs
mod backup;
mod config;

use anyhow::{Context, Result};
use backup::{RunConfig, RunResult, RunStatus, UploadMode};
use config::AppConfig;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// Main entry point for the backup tool
#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(result) => report(&result),
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn report(result: &RunResult) -> ExitCode {
    if let Some(warning) = &result.warning {
        eprintln!("⚠️ {}", warning);
    }
    match result.status {
        RunStatus::Succeeded => {
            println!("✅ {}", result.message);
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("❌ {}", result.message);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<RunResult> {
    // Expects config.json in the working directory, next to the executable or
    // the project root when running with `cargo run`.
    let config_path = PathBuf::from("config.json");
    let mut app_config = AppConfig::load_from_json(&config_path).context(format!(
        "Failed to load application configuration from {}",
        config_path.display()
    ))?;

    let cli = parse_cli_args(env::args().skip(1))?;

    if let Some(bucket) = cli.bucket_override {
        match app_config.s3.as_mut() {
            Some(s3) => s3.bucket_name = bucket,
            None => anyhow::bail!(
                "--upload-s3={} given but s3_storage is not configured in config.json",
                bucket
            ),
        }
    }

    let upload = if cli.upload_s3 {
        if cli.keep_only_s3 {
            UploadMode::DeleteLocal
        } else {
            UploadMode::KeepLocal
        }
    } else {
        UploadMode::None
    };

    let run_config = RunConfig {
        database: cli.database,
        filename: cli.filename,
        compress: app_config.compress,
        upload,
        dump_dir: app_config.dump_dir.clone(),
        request_context: env::var("REQUEST_URI").ok().filter(|s| !s.is_empty()),
    };

    println!("🚀 Starting backup process...");
    backup::run_backup_flow(&app_config, &run_config).await
}

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    filename: Option<String>,
    database: Option<String>,
    upload_s3: bool,
    keep_only_s3: bool,
    bucket_override: Option<String>,
}

fn parse_cli_args(args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut cli = CliArgs::default();

    for arg in args {
        if let Some(value) = arg.strip_prefix("--database=") {
            cli.database = Some(value.to_string());
        } else if arg == "--upload-s3" {
            cli.upload_s3 = true;
        } else if let Some(bucket) = arg.strip_prefix("--upload-s3=") {
            cli.upload_s3 = true;
            cli.bucket_override = Some(bucket.to_string());
        } else if arg == "--keep-only-s3" {
            cli.keep_only_s3 = true;
        } else if arg.starts_with("--") {
            anyhow::bail!(
                "Unknown option: {}. Supported: [filename] --database=<name> --upload-s3[=<bucket>] --keep-only-s3",
                arg
            );
        } else if cli.filename.is_none() {
            cli.filename = Some(arg);
        } else {
            anyhow::bail!("Unexpected extra argument: {}", arg);
        }
    }

    Ok(cli)
}
