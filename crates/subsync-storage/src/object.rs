//! S3-compatible object store backend.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};
use uuid::Uuid;

use subsync_models::ArtifactRef;

use crate::error::{StorageError, StorageResult};

/// Configuration for the object store backend.
#[derive(Debug, Clone)]
pub struct ObjectConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for R2-style providers)
    pub region: String,
}

impl ObjectConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("OBJECT_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("OBJECT_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("OBJECT_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("OBJECT_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("OBJECT_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("OBJECT_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("OBJECT_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("OBJECT_BUCKET_NAME not set"))?,
            region: std::env::var("OBJECT_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Media store backend writing to an S3-compatible bucket.
///
/// Keys are store-assigned (`media/<uuid>.<ext>`); the caller-facing name is
/// not preserved beyond its extension.
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    /// Create a new object store client from configuration.
    pub async fn new(config: ObjectConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "subsync",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        })
    }

    /// Upload a payload under a freshly minted content key.
    pub async fn store(&self, extension: &str, data: &[u8]) -> StorageResult<ArtifactRef> {
        let key = format!("media/{}.{}", Uuid::new_v4(), extension);
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type_for(extension))
            .send()
            .await
            .map_err(|e| StorageError::write_failed(e.to_string()))?;

        info!("Stored {} ({} bytes)", key, data.len());
        Ok(ArtifactRef::new(key))
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Sdk(format!("Bucket check failed: {}", e)))?;
        Ok(())
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}
