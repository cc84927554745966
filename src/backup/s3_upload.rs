// dbbackup/src/backup/s3_upload.rs
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::config::Region;
use s3::error::DisplayErrorContext;
use s3::primitives::ByteStream;
use std::path::Path;

use crate::config::S3Config;

/// Result of one upload attempt. The failure detail is surfaced to the
/// orchestrator so it can be included in the failure notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success,
    Failure(String),
}

/// Capability that pushes the dump file to remote object storage under
/// `remote_name`. Re-uploading the same name overwrites the remote object.
#[async_trait]
pub trait RemoteUploader: Send + Sync {
    async fn upload(&self, local_file: &Path, remote_name: &str) -> UploadOutcome;
}

/// Uploads to an S3-compatible object storage service.
pub struct S3Uploader {
    config: S3Config,
}

impl S3Uploader {
    pub fn new(config: S3Config) -> Self {
        Self { config }
    }

    fn object_key(&self, remote_name: &str) -> String {
        let prefix = self.config.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            remote_name.to_string()
        } else {
            format!("{}/{}", prefix, remote_name)
        }
    }

    async fn client(&self) -> s3::Client {
        let mut loader = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(s3::config::Credentials::new(
                &self.config.access_key_id,
                &self.config.secret_access_key,
                None,     // session_token
                None,     // expiry
                "Static", // provider_name
            ));
        if let Some(endpoint) = &self.config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;
        s3::Client::new(&sdk_config)
    }
}

#[async_trait]
impl RemoteUploader for S3Uploader {
    async fn upload(&self, local_file: &Path, remote_name: &str) -> UploadOutcome {
        let key = self.object_key(remote_name);
        println!(
            "Attempting to upload {} to S3 bucket {} with key {}",
            local_file.display(),
            self.config.bucket_name,
            key
        );

        let body = match ByteStream::from_path(local_file).await {
            Ok(body) => body,
            Err(e) => {
                return UploadOutcome::Failure(format!(
                    "Failed to read dump file {}: {}",
                    local_file.display(),
                    e
                ));
            }
        };

        let result = self
            .client()
            .await
            .put_object()
            .bucket(&self.config.bucket_name)
            .key(&key)
            .body(body)
            .send()
            .await;

        match result {
            Ok(_) => {
                println!(
                    "✅ Successfully uploaded {} to S3 bucket {} with key {}",
                    local_file.display(),
                    self.config.bucket_name,
                    key
                );
                UploadOutcome::Success
            }
            Err(e) => UploadOutcome::Failure(format!(
                "Failed to upload {} to S3 bucket {} with key {}: {}",
                local_file.display(),
                self.config.bucket_name,
                key,
                DisplayErrorContext(&e)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploader(prefix: &str) -> S3Uploader {
        S3Uploader::new(S3Config {
            region: "us-east-1".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "backups".to_string(),
            endpoint_url: None,
            key_prefix: prefix.to_string(),
        })
    }

    #[test]
    fn test_object_key_joins_prefix() {
        assert_eq!(uploader("dumps").object_key("nightly.sql.gz"), "dumps/nightly.sql.gz");
    }

    #[test]
    fn test_object_key_trims_prefix_slashes() {
        assert_eq!(uploader("/dumps/").object_key("nightly.sql"), "dumps/nightly.sql");
    }

    #[test]
    fn test_object_key_without_prefix() {
        assert_eq!(uploader("").object_key("nightly.sql"), "nightly.sql");
    }
}
