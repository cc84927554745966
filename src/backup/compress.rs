// dbbackup/src/backup/compress.rs
use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Capability that compresses a dump file in place.
pub trait Compressor: Send + Sync {
    /// Replaces the file at `file_path` with `<file_path>.gz`. The
    /// uncompressed original must not remain after success.
    fn compress(&self, file_path: &Path) -> Result<()>;
}

/// Gzip compression at maximum level (the equivalent of `gzip -9`).
pub struct GzipCompressor;

fn gz_path(file_path: &Path) -> PathBuf {
    let mut gz = file_path.to_path_buf().into_os_string();
    gz.push(".gz");
    gz.into()
}

impl Compressor for GzipCompressor {
    fn compress(&self, file_path: &Path) -> Result<()> {
        let gz_dest = gz_path(file_path);

        println!(
            "🗜 Compressing {} to {}",
            file_path.display(),
            gz_dest.display()
        );

        let mut input = File::open(file_path)
            .with_context(|| format!("Failed to open dump file: {}", file_path.display()))?;
        let output = File::create(&gz_dest).with_context(|| {
            format!("Failed to create compressed file: {}", gz_dest.display())
        })?;

        let mut encoder = GzEncoder::new(output, Compression::best());
        io::copy(&mut input, &mut encoder).with_context(|| {
            format!("Failed to compress dump file: {}", file_path.display())
        })?;
        encoder.finish().with_context(|| {
            format!("Failed to finish Gzip encoding for: {}", gz_dest.display())
        })?;

        std::fs::remove_file(file_path).with_context(|| {
            format!(
                "Failed to remove uncompressed dump after compression: {}",
                file_path.display()
            )
        })?;

        Ok(())
    }
}
