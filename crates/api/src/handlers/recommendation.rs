//! Handlers for `/api/recommendation`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub style_vibe: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPhotoRequest {
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub style_vibe: String,
}

/// POST /api/recommendation
///
/// Works without a capture or saved preferences.
pub async fn recommend(
    State(state): State<AppState>,
    AppJson(input): AppJson<RecommendationRequest>,
) -> AppResult<impl IntoResponse> {
    let recommendation = state.recommender()?.recommend(&input.style_vibe).await?;
    Ok(Json(DataResponse {
        data: recommendation,
    }))
}

/// POST /api/recommendation/photo
///
/// Requires a capture (400 `NO_CAPTURE` otherwise).
pub async fn recommendation_photo(
    State(state): State<AppState>,
    AppJson(input): AppJson<RecommendationPhotoRequest>,
) -> AppResult<impl IntoResponse> {
    state.require_capture().await?;
    let photo = state
        .recommender()?
        .visualize(&input.recommendation, &input.style_vibe)
        .await?;
    Ok(Json(DataResponse { data: photo }))
}
