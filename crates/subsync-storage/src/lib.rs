//! Media artifact store.
//!
//! This crate provides:
//! - Upload validation (extension allow-list, size cap)
//! - A filesystem backend storing under a media root
//! - An S3-compatible object backend with store-assigned keys
//!
//! Both backends satisfy the same contract: a named byte payload goes in,
//! an opaque [`ArtifactRef`](subsync_models::ArtifactRef) comes out, and the
//! object is either fully visible or absent.

pub mod error;
pub mod local;
pub mod object;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use local::LocalStore;
pub use object::{ObjectConfig, ObjectStore};
pub use store::{MediaStore, StoreConfig, UploadPolicy};
