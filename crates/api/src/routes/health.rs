use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// `postgres` or `memory`.
    pub item_store: &'static str,
    /// Whether the store directories are readable.
    pub storage_healthy: bool,
    pub generation_configured: bool,
    pub analysis_configured: bool,
    /// Video jobs that have not finished.
    pub active_video_jobs: usize,
}

/// GET /health -- returns service health and provider configuration.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage_healthy = tokio::fs::metadata(state.captures.dir()).await.is_ok()
        && tokio::fs::metadata(state.preferences.dir()).await.is_ok();

    let status = if storage_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        item_store: state.items.backend(),
        storage_healthy,
        generation_configured: state.media.is_some(),
        analysis_configured: state.analyzer.is_some(),
        active_video_jobs: state.video_jobs.active_count().await,
    })
}

/// Mount health check routes (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
