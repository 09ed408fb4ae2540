//! Media store facade: upload policy plus backend dispatch.

use tracing::info;

use subsync_models::ArtifactRef;

use crate::error::{StorageError, StorageResult};
use crate::local::LocalStore;
use crate::object::{ObjectConfig, ObjectStore};

/// Default upload size cap: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Default extension allow-list.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// Media store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend selector: "local" or "object"
    pub backend: String,
    /// Directory for the filesystem backend
    pub media_root: String,
    /// Upload size cap in bytes
    pub max_upload_bytes: usize,
    /// Allowed file extensions (lowercase, no dot)
    pub allowed_extensions: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            media_root: "uploads".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: std::env::var("STORAGE_BACKEND").unwrap_or(defaults.backend),
            media_root: std::env::var("MEDIA_ROOT").unwrap_or(defaults.media_root),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            allowed_extensions: std::env::var("ALLOWED_EXTENSIONS")
                .map(|s| {
                    s.split(',')
                        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                        .filter(|e| !e.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_extensions),
        }
    }
}

/// Upload validation: extension allow-list and size cap.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
    max_upload_bytes: usize,
}

impl UploadPolicy {
    pub fn new(allowed_extensions: Vec<String>, max_upload_bytes: usize) -> Self {
        Self {
            allowed_extensions,
            max_upload_bytes,
        }
    }

    /// Validate a named payload. Returns the lowercase extension on success.
    ///
    /// Extension check runs before the size check so a disallowed type is
    /// reported as such even when the payload is also oversized.
    pub fn validate(&self, name: &str, size: usize) -> StorageResult<String> {
        let ext = name
            .rsplit_once('.')
            .map(|(stem, ext)| (stem, ext.to_lowercase()))
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| ext)
            .ok_or_else(|| StorageError::unsupported_type(name))?;

        if !self.allowed_extensions.iter().any(|a| *a == ext) {
            return Err(StorageError::unsupported_type(name));
        }

        if size > self.max_upload_bytes {
            return Err(StorageError::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        Ok(ext)
    }
}

enum Backend {
    Local(LocalStore),
    Object(ObjectStore),
}

/// Media artifact store.
///
/// Validates uploads against the policy, then delegates persistence to the
/// configured backend. The returned reference is opaque: a filename for the
/// local backend, an object key for the object backend.
pub struct MediaStore {
    backend: Backend,
    policy: UploadPolicy,
}

impl MediaStore {
    /// Create a store backed by the local filesystem.
    pub fn local(root: impl Into<std::path::PathBuf>, policy: UploadPolicy) -> Self {
        Self {
            backend: Backend::Local(LocalStore::new(root)),
            policy,
        }
    }

    /// Create a store backed by an S3-compatible object store.
    pub fn object(store: ObjectStore, policy: UploadPolicy) -> Self {
        Self {
            backend: Backend::Object(store),
            policy,
        }
    }

    /// Create from environment variables, selecting the backend via
    /// `STORAGE_BACKEND`.
    pub async fn from_env() -> StorageResult<Self> {
        let config = StoreConfig::from_env();
        let policy = UploadPolicy::new(
            config.allowed_extensions.clone(),
            config.max_upload_bytes,
        );

        match config.backend.as_str() {
            "local" => {
                info!("Using local media store at {}", config.media_root);
                Ok(Self::local(config.media_root, policy))
            }
            "object" => {
                let store = ObjectStore::new(ObjectConfig::from_env()?).await?;
                info!("Using object media store");
                Ok(Self::object(store, policy))
            }
            other => Err(StorageError::config_error(format!(
                "Unknown STORAGE_BACKEND: {}",
                other
            ))),
        }
    }

    /// Store a named payload, returning an opaque artifact reference.
    ///
    /// The payload is fully written before the call returns; readers never
    /// observe a partial object.
    pub async fn store(&self, name: &str, data: &[u8]) -> StorageResult<ArtifactRef> {
        let ext = self.policy.validate(name, data.len())?;

        match &self.backend {
            Backend::Local(local) => local.store(name, data).await,
            Backend::Object(object) => object.store(&ext, data).await,
        }
    }

    /// Check that the backing store is reachable.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        match &self.backend {
            Backend::Local(local) => local.check_connectivity().await,
            Backend::Object(object) => object.check_connectivity().await,
        }
    }
}
