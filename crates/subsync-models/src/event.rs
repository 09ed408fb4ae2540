//! Job-notification wire envelope.

use serde::{Deserialize, Serialize};

use crate::JobId;

/// Message published on the job-notification stream when a job is submitted.
///
/// Canonical wire format: the JSON object `{"status":200,"job_id":"<uuid>"}`
/// serialized to bytes. Consumers must not rely on any other payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    /// Submission status code, always 200 for an announced job.
    pub status: u16,
    /// The freshly minted job id.
    pub job_id: JobId,
}

impl JobEvent {
    /// Build the announcement for a submitted job.
    pub fn submitted(job_id: JobId) -> Self {
        Self {
            status: 200,
            job_id,
        }
    }

    /// Serialize to the canonical byte payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
