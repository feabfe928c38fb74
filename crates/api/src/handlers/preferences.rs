//! Handlers for `/api/preferences`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use silhouette_core::error::CoreError;
use silhouette_core::preference::Annotation;
use silhouette_core::style::StyleVibe;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SavePreferencesRequest {
    /// Checked by hand so a non-array gets a specific message.
    #[serde(default)]
    pub preferences: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStyleVibeRequest {
    pub style_vibe: Option<String>,
}

/// Parse the `preferences` array, naming the first bad entry.
fn parse_annotations(value: serde_json::Value) -> Result<Vec<Annotation>, CoreError> {
    let serde_json::Value::Array(entries) = value else {
        return Err(CoreError::Validation("Preferences must be an array".into()));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<Annotation>(entry).map_err(|e| {
                CoreError::Validation(format!("Invalid preference at index {index}: {e}"))
            })
        })
        .collect()
}

/// POST /api/preferences
pub async fn save_preferences(
    State(state): State<AppState>,
    AppJson(input): AppJson<SavePreferencesRequest>,
) -> AppResult<impl IntoResponse> {
    let annotations = parse_annotations(input.preferences)?;
    let set = state.preferences.save(annotations).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: set })))
}

/// GET /api/preferences/latest
pub async fn latest_preferences(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let set = state
        .preferences
        .latest()
        .await?
        .ok_or(AppError::Core(CoreError::Missing("preferences")))?;
    Ok(Json(DataResponse { data: set }))
}

/// POST /api/preferences/style-vibe
pub async fn save_style_vibe(
    State(state): State<AppState>,
    AppJson(input): AppJson<SaveStyleVibeRequest>,
) -> AppResult<impl IntoResponse> {
    let vibe: StyleVibe = input
        .style_vibe
        .ok_or_else(|| CoreError::Validation("styleVibe is required".into()))?
        .parse()?;
    let record = state.preferences.save_style_vibe(vibe).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/preferences/style-vibe/latest
pub async fn latest_style_vibe(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let record = state
        .preferences
        .latest_style_vibe()
        .await?
        .ok_or(AppError::Core(CoreError::Missing("style vibe")))?;
    Ok(Json(DataResponse { data: record }))
}
