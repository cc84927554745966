// dbbackup/src/backup/naming.rs
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// The file produced by one backup run, threaded through the pipeline.
///
/// `file_name` never contains a directory component, and `file_name` is always
/// the final component of `file_path`. Both gain their `.gz` suffix in one
/// step when compression succeeds, so they can never disagree.
#[derive(Debug, Clone)]
pub struct BackupArtifact {
    file_name: String,
    file_path: PathBuf,
    pub compressed: bool,
    pub uploaded: bool,
}

impl BackupArtifact {
    /// Derives the dump file name and path for a run.
    ///
    /// * No requested name: `<database>-<timestamp>.sql` under `dump_dir`. The
    ///   timestamp format is lexically sortable.
    /// * Requested name with a path separator: taken verbatim as the full path.
    /// * Bare requested name: joined with `dump_dir`.
    ///
    /// Pure derivation: the filesystem is not touched.
    pub fn resolve(
        requested: Option<&str>,
        database_name: &str,
        dump_dir: &Path,
        at: DateTime<Local>,
    ) -> Self {
        let requested = requested.filter(|s| !s.is_empty());

        let (file_name, file_path) = match requested {
            None => {
                let name = format!("{}-{}.sql", database_name, at.format("%Y%m%d-%H%M%S"));
                let path = dump_dir.join(&name);
                (name, path)
            }
            Some(req) if req.contains(std::path::MAIN_SEPARATOR) || req.contains('/') => {
                let path = PathBuf::from(req);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (name, path)
            }
            Some(req) => (req.to_string(), dump_dir.join(req)),
        };

        BackupArtifact {
            file_name,
            file_path,
            compressed: false,
            uploaded: false,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Appends `.gz` to both the name and the path in one step.
    /// Only called once the compressor has confirmed success.
    pub fn mark_compressed(&mut self) {
        self.file_name.push_str(".gz");
        let mut path = self.file_path.clone().into_os_string();
        path.push(".gz");
        self.file_path = path.into();
        self.compressed = true;
    }

    pub fn mark_uploaded(&mut self) {
        self.uploaded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 23, 15, 42).unwrap()
    }

    #[test]
    fn test_generated_name_combines_database_and_timestamp() {
        let artifact = BackupArtifact::resolve(
            None,
            "default",
            Path::new("/var/dumps"),
            fixed_instant(),
        );

        assert_eq!(artifact.file_name(), "default-20240307-231542.sql");
        assert_eq!(
            artifact.file_path(),
            Path::new("/var/dumps/default-20240307-231542.sql")
        );
        assert!(!artifact.compressed);
        assert!(!artifact.uploaded);
    }

    #[test]
    fn test_empty_requested_name_treated_as_absent() {
        let artifact =
            BackupArtifact::resolve(Some(""), "main", Path::new("/var/dumps"), fixed_instant());
        assert_eq!(artifact.file_name(), "main-20240307-231542.sql");
    }

    #[test]
    fn test_bare_name_joined_with_dump_dir() {
        let artifact = BackupArtifact::resolve(
            Some("nightly.sql"),
            "main",
            Path::new("/var/dumps"),
            fixed_instant(),
        );

        assert_eq!(artifact.file_name(), "nightly.sql");
        assert_eq!(artifact.file_path(), Path::new("/var/dumps/nightly.sql"));
        assert_eq!(artifact.file_path().parent(), Some(Path::new("/var/dumps")));
    }

    #[test]
    fn test_path_input_taken_verbatim() {
        let artifact = BackupArtifact::resolve(
            Some("/mnt/elsewhere/manual.sql"),
            "main",
            Path::new("/var/dumps"),
            fixed_instant(),
        );

        assert_eq!(artifact.file_path(), Path::new("/mnt/elsewhere/manual.sql"));
        assert_eq!(artifact.file_name(), "manual.sql");
    }

    #[test]
    fn test_resolution_is_deterministic_for_same_instant() {
        let a = BackupArtifact::resolve(None, "main", Path::new("/var/dumps"), fixed_instant());
        let b = BackupArtifact::resolve(None, "main", Path::new("/var/dumps"), fixed_instant());

        assert_eq!(a.file_name(), b.file_name());
        assert_eq!(a.file_path(), b.file_path());
    }

    #[test]
    fn test_mark_compressed_updates_name_and_path_together() {
        let mut artifact = BackupArtifact::resolve(
            Some("nightly.sql"),
            "main",
            Path::new("/var/dumps"),
            fixed_instant(),
        );

        artifact.mark_compressed();

        assert!(artifact.compressed);
        assert_eq!(artifact.file_name(), "nightly.sql.gz");
        assert_eq!(artifact.file_path(), Path::new("/var/dumps/nightly.sql.gz"));
        assert_eq!(
            artifact.file_path().file_name().unwrap().to_str().unwrap(),
            artifact.file_name()
        );
    }
}
