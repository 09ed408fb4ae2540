//! Job creation and submission handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use subsync_models::{JobEvent, JobId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response for job creation (no request body).
#[derive(Serialize)]
pub struct CreateJobResponse {
    pub status: u16,
    pub job_id: JobId,
}

/// Response for job submission (request body present).
#[derive(Serialize)]
pub struct SubmitJobResponse {
    pub status: u16,
    pub job: JobId,
    pub message: String,
}

/// `POST /job`.
///
/// Without a request body this mints and returns a fresh job id, touching
/// nothing else. With a body it runs the submit flow: reject empty payloads,
/// mint a new id (never reconciled with any id the caller already holds),
/// and announce it on the bus before responding.
pub async fn submit_job(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    if body.is_empty() {
        let job_id = JobId::new();
        info!("Created job {}", job_id);
        return Ok(Json(CreateJobResponse {
            status: 200,
            job_id,
        })
        .into_response());
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("No job data provided"))?;

    if is_empty_payload(&payload) {
        return Err(ApiError::bad_request("No job data provided"));
    }

    let job_id = JobId::new();
    let event = JobEvent::submitted(job_id.clone());

    state
        .bus
        .publish_event(&event)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to publish job: {}", e)))?;

    info!("Published job {}", job_id);

    Ok(Json(SubmitJobResponse {
        status: 200,
        job: job_id,
        message: "Job submitted successfully!".to_string(),
    })
    .into_response())
}

/// A payload that carries no job data: null, false, zero, or an empty
/// string/array/object.
fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
