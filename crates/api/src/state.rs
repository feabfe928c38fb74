use std::sync::Arc;

use silhouette_db::store::ItemStore;
use silhouette_disk::{CaptureStore, PreferencesStore};
use silhouette_genai::MediaGenerator;
use silhouette_pipeline::{PipelineError, Recommender};
use silhouette_vision::StyleAnalyzer;
use tokio_util::sync::CancellationToken;

use crate::background::VideoJobManager;
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Item catalogue (Postgres or in-memory).
    pub items: Arc<dyn ItemStore>,
    pub captures: Arc<CaptureStore>,
    pub preferences: Arc<PreferencesStore>,
    /// `None` when `GEMINI_API_KEY` is unset.
    pub media: Option<Arc<dyn MediaGenerator>>,
    /// `None` when `OVERSHOOT_API_KEY` is unset.
    pub analyzer: Option<Arc<dyn StyleAnalyzer>>,
    pub video_jobs: Arc<VideoJobManager>,
    /// Cancelled when the server begins shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// The generative provider, or `NOT_CONFIGURED`.
    pub fn media(&self) -> AppResult<Arc<dyn MediaGenerator>> {
        self.media
            .clone()
            .ok_or(AppError::NotConfigured("GEMINI_API_KEY"))
    }

    /// The vision provider, or `NOT_CONFIGURED`.
    pub fn analyzer(&self) -> AppResult<Arc<dyn StyleAnalyzer>> {
        self.analyzer
            .clone()
            .ok_or(AppError::NotConfigured("OVERSHOOT_API_KEY"))
    }

    pub fn recommender(&self) -> AppResult<Recommender> {
        Ok(Recommender::new(
            self.media()?,
            Arc::clone(&self.captures),
            Arc::clone(&self.preferences),
            self.config.gemini.models.clone(),
        ))
    }

    /// `NO_CAPTURE` unless a capture with a readable snapshot exists.
    /// Handlers check this before [`Self::recommender`].
    pub async fn require_capture(&self) -> AppResult<()> {
        match self.captures.latest().await? {
            Some(capture) if capture.snapshot.is_some() => Ok(()),
            _ => Err(PipelineError::NoCapture.into()),
        }
    }
}
