//! Handler for `/api/analyze-style`.

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use silhouette_core::analysis::StyleAnalysis;
use silhouette_vision::{StyleVerdict, VideoClip};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_CLIP_MIME: &str = "video/webm";
const DEFAULT_CLIP_NAME: &str = "clip.webm";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAnalysisResponse {
    /// Raw text of the last result.
    pub result: String,
    /// Whether `result` held a recognisable JSON verdict.
    pub parsed: bool,
    /// Normalised `{color, style, itemCategory}` when parsed.
    pub analysis: Option<StyleAnalysis>,
}

impl From<StyleVerdict> for StyleAnalysisResponse {
    fn from(verdict: StyleVerdict) -> Self {
        Self {
            parsed: matches!(verdict, StyleVerdict::Parsed { .. }),
            analysis: verdict.analysis(),
            result: verdict.text().to_string(),
        }
    }
}

/// POST /api/analyze-style
///
/// Multipart upload with a `video` field holding a short clip.
pub async fn analyze_style(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let analyzer = state.analyzer()?;
    let mut clip: Option<VideoClip> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "video" {
            continue;
        }

        let file_name = field
            .file_name()
            .unwrap_or(DEFAULT_CLIP_NAME)
            .to_string();
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_CLIP_MIME)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read video: {e}")))?;

        clip = Some(VideoClip {
            bytes: bytes.to_vec(),
            mime_type,
            file_name,
        });
    }

    let clip = clip
        .filter(|c| !c.bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("No video file uploaded".into()))?;

    tracing::info!(
        bytes = clip.bytes.len(),
        mime_type = %clip.mime_type,
        "Analyzing style",
    );
    let verdict = analyzer.analyze(clip).await?;

    Ok(Json(DataResponse {
        data: StyleAnalysisResponse::from(verdict),
    }))
}
