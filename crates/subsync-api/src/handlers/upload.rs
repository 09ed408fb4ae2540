//! Media upload handler.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use subsync_models::ArtifactRef;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response for a stored upload.
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub job_id: String,
    pub video_id: ArtifactRef,
}

/// `POST /job/{job_id}/upload`.
///
/// Accepts a multipart `file` field, sanitizes its filename, and hands the
/// bytes to the media store. The job id is taken as-is from the path; no
/// check that it was ever issued by this service (callers own the
/// association between id and artifact).
pub async fn upload_video(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(sanitize_filename)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::bad_request("No file provided"))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;

        file = Some((filename, data));
        break;
    }

    let (filename, data) = file.ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let video_id = state.store.store(&filename, &data).await?;

    info!("Uploaded {} for job {}", video_id, job_id);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Video uploaded successfully".to_string(),
            job_id,
            video_id,
        }),
    ))
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Path components are dropped and anything outside `[A-Za-z0-9._-]` is
/// replaced, so the result can be used directly as a storage name.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim_matches('.').to_string()
}
