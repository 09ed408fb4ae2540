//! Filesystem-backed media store.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, info};
use uuid::Uuid;

use subsync_models::ArtifactRef;

use crate::error::{StorageError, StorageResult};

/// Media store backend writing into a directory on the local filesystem.
///
/// Payloads are staged under a hidden temp name and linked into place, so a
/// crashed write leaves at most a stale staging file that no reader ever
/// resolves.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store a payload under the given (pre-sanitized) filename.
    ///
    /// Returns the final filename as the artifact reference. Name
    /// reservation uses `hard_link`, which refuses to clobber an existing
    /// entry, so an existing object is never overwritten even by concurrent
    /// stores of the same name; a taken name gets a short random suffix
    /// before the extension.
    pub async fn store(&self, name: &str, data: &[u8]) -> StorageResult<ArtifactRef> {
        tokio::fs::create_dir_all(&self.root).await?;

        let staging = self
            .root
            .join(format!(".{}.part", Uuid::new_v4().simple()));
        tokio::fs::write(&staging, data).await?;

        debug!("Staged {} bytes at {}", data.len(), staging.display());

        let mut final_name = name.to_string();
        loop {
            match tokio::fs::hard_link(&staging, self.root.join(&final_name)).await {
                Ok(()) => break,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    final_name = suffixed_name(name);
                }
                Err(e) => {
                    tokio::fs::remove_file(&staging).await.ok();
                    return Err(StorageError::write_failed(format!(
                        "Failed to finalize {}: {}",
                        final_name, e
                    )));
                }
            }
        }
        tokio::fs::remove_file(&staging).await.ok();

        info!("Stored {} ({} bytes)", final_name, data.len());
        Ok(ArtifactRef::new(final_name))
    }

    /// Confirm the media root is usable.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

fn suffixed_name(name: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    let suffix = &token[..8];
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, suffix, ext),
        None => format!("{}_{}", name, suffix),
    }
}
