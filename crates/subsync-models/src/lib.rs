//! Shared data models for the SubSync submission API.
//!
//! This crate provides Serde-serializable types for:
//! - Job identifiers
//! - Artifact references returned by the media store
//! - The job-notification wire envelope

pub mod event;
pub mod job;

// Re-export common types
pub use event::JobEvent;
pub use job::{ArtifactRef, JobId};
