//! Handlers for `/api/capture`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use silhouette_core::analysis::StyleAnalysis;
use silhouette_core::data_url;
use silhouette_core::error::CoreError;
use silhouette_core::prompt::validate_prompt;
use silhouette_disk::CaptureRecord;
use silhouette_pipeline::sniff_image_mime;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCaptureRequest {
    /// Data URL or bare base64.
    pub snapshot: Option<String>,
    #[serde(alias = "overshootData")]
    pub style_analysis: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePhotoRequest {
    pub prompt: Option<String>,
}

/// A stored capture with its snapshot re-encoded for transport.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureView {
    #[serde(flatten)]
    pub record: CaptureRecord,
    /// `data:` URL of the snapshot image, when the file is still on disk.
    pub snapshot: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/capture
pub async fn save_capture(
    State(state): State<AppState>,
    AppJson(input): AppJson<SaveCaptureRequest>,
) -> AppResult<impl IntoResponse> {
    let snapshot = input
        .snapshot
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CoreError::Validation("snapshot is required".into()))?;
    let analysis = input
        .style_analysis
        .ok_or_else(|| CoreError::Validation("styleAnalysis is required".into()))?;

    let decoded = data_url::decode(&snapshot)?;
    let analysis = StyleAnalysis::from_value(analysis)?;
    let record = state.captures.save(&decoded.bytes, analysis).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/capture/latest
pub async fn latest_capture(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let capture = state
        .captures
        .latest()
        .await?
        .ok_or(AppError::Core(CoreError::Missing("capture data")))?;

    let snapshot = capture
        .snapshot
        .as_deref()
        .map(|bytes| data_url::encode(sniff_image_mime(bytes), bytes));
    if snapshot.is_none() {
        tracing::warn!(
            path = %capture.record.snapshot_path,
            "Capture snapshot file is missing",
        );
    }

    Ok(Json(DataResponse {
        data: CaptureView {
            record: capture.record,
            snapshot,
        },
    }))
}

/// POST /api/capture/generate-photo
///
/// Applies a free-form instruction to the latest capture.
pub async fn generate_photo(
    State(state): State<AppState>,
    AppJson(input): AppJson<GeneratePhotoRequest>,
) -> AppResult<impl IntoResponse> {
    let prompt = input.prompt.unwrap_or_default();
    validate_prompt(&prompt)?;
    state.require_capture().await?;
    let photo = state.recommender()?.render_capture(&prompt).await?;
    Ok(Json(DataResponse { data: photo }))
}
