//! Handlers for `/api/video-jobs`.
//!
//! The non-blocking alternative to `/api/generate-video`: submit, poll the
//! job, then download its content.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use silhouette_core::error::CoreError;
use silhouette_core::prompt::validate_prompt;
use silhouette_genai::messages::VideoRequest;

use crate::background::JobStatus;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::media::VideoPromptRequest;
use crate::response::{attachment, DataResponse};
use crate::state::AppState;

fn job_not_found() -> AppError {
    AppError::Core(CoreError::Missing("video job"))
}

/// POST /api/video-jobs
///
/// Responds 202 with the pending job.
pub async fn submit_job(
    State(state): State<AppState>,
    AppJson(input): AppJson<VideoPromptRequest>,
) -> AppResult<impl IntoResponse> {
    let media = state.media()?;
    validate_prompt(&input.prompt)?;

    let request = VideoRequest {
        model: input
            .model
            .unwrap_or_else(|| state.config.gemini.models.video.clone()),
        prompt: input.prompt,
        aspect_ratio: input.aspect_ratio,
    };
    let job = state
        .video_jobs
        .submit(media, request, state.config.video_poll)
        .await;

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: job })))
}

/// GET /api/video-jobs
pub async fn list_jobs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let jobs = state.video_jobs.list().await;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/video-jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = state.video_jobs.get(&id).await.ok_or_else(job_not_found)?;
    Ok(Json(DataResponse { data: job }))
}

/// GET /api/video-jobs/{id}/content
///
/// The finished video as `video/mp4`; 400 while the job has none.
pub async fn job_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let (job, video) = state
        .video_jobs
        .content(&id)
        .await
        .ok_or_else(job_not_found)?;

    match video {
        Some(bytes) if job.status == JobStatus::Succeeded => {
            attachment(bytes, "video/mp4", "video")
        }
        _ => Err(AppError::BadRequest(format!(
            "Video job {id} has no content (status: {})",
            job.status.as_str()
        ))),
    }
}

/// DELETE /api/video-jobs/{id}
///
/// Cancels a running job; a finished job is discarded.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = state.video_jobs.cancel(&id).await.ok_or_else(job_not_found)?;
    Ok(Json(DataResponse { data: job }))
}
