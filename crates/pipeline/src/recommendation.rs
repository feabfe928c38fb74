//! Capture → preferences → recommendation orchestration.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use silhouette_core::analysis::StyleAnalysis;
use silhouette_core::data_url;
use silhouette_core::error::CoreError;
use silhouette_core::links::extract_links;
use silhouette_core::preference::summarize;
use silhouette_core::prompt::{
    capture_edit_prompt, outfit_photo_prompt, recommendation_prompt, validate_prompt,
    RecommendationContext,
};
use silhouette_core::style::{normalize_style, target_style_for, Style};
use silhouette_core::types::Timestamp;
use silhouette_disk::{Capture, CaptureStore, DiskError, PreferencesStore};
use silhouette_genai::messages::{ImageRequest, SourceImage, TextRequest};
use silhouette_genai::{GenAiError, MediaGenerator, ModelConfig, PHOTO_ASPECT_RATIO, PHOTO_IMAGE_SIZE};

/// Style used when neither the vibe nor the capture names one.
const FALLBACK_STYLE: Style = Style::Streetwear;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An image edit was requested before any capture exists.
    #[error("No capture data found. Please capture an image first.")]
    NoCapture,

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Disk(#[from] DiskError),

    #[error(transparent)]
    Provider(#[from] GenAiError),
}

/// A text outfit recommendation. Not persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub style_vibe: String,
    pub target_style: String,
    pub text: String,
    /// HTTP(S) links in order of first appearance.
    pub extracted_links: Vec<String>,
    pub timestamp: Timestamp,
}

/// An edited photo of the latest capture.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPhoto {
    pub data_url: String,
    pub mime_type: String,
    pub file_name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Text the model returned alongside the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Builds recommendations and outfit photos from the stored capture and
/// preferences.
pub struct Recommender {
    media: Arc<dyn MediaGenerator>,
    captures: Arc<CaptureStore>,
    preferences: Arc<PreferencesStore>,
    models: ModelConfig,
}

impl Recommender {
    pub fn new(
        media: Arc<dyn MediaGenerator>,
        captures: Arc<CaptureStore>,
        preferences: Arc<PreferencesStore>,
        models: ModelConfig,
    ) -> Self {
        Self {
            media,
            captures,
            preferences,
            models,
        }
    }

    /// Recommend one outfit for `style_vibe`.
    ///
    /// A missing or unreadable capture or preference set degrades to "not
    /// available" in the prompt.
    pub async fn recommend(&self, style_vibe: &str) -> Result<Recommendation, PipelineError> {
        let capture = match self.captures.latest().await {
            Ok(capture) => capture,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load capture data");
                None
            }
        };
        let preferences = match self.preferences.latest().await {
            Ok(set) => set.and_then(|s| summarize(&s.preferences)),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load preferences");
                None
            }
        };

        let analysis = capture.as_ref().map(|c| &c.record.style_analysis);
        let target_style = resolve_target(style_vibe, analysis);
        let prompt = recommendation_prompt(&RecommendationContext {
            target_style: &target_style,
            analysis,
            preferences: preferences.as_deref(),
        });

        tracing::info!(
            style_vibe,
            target_style = %target_style,
            has_capture = capture.is_some(),
            has_preferences = preferences.is_some(),
            "Generating recommendation",
        );

        let response = self
            .media
            .generate_text(TextRequest {
                model: self.models.text.clone(),
                prompt,
            })
            .await?;
        let text = response.text().unwrap_or_default();
        let extracted_links = extract_links(&text);

        tracing::info!(links = extracted_links.len(), "Recommendation generated");
        Ok(Recommendation {
            style_vibe: style_vibe.to_string(),
            target_style,
            text,
            extracted_links,
            timestamp: Utc::now(),
        })
    }

    /// Dress the captured person in the recommended outfit.
    pub async fn visualize(
        &self,
        recommendation: &str,
        style_vibe: &str,
    ) -> Result<GeneratedPhoto, PipelineError> {
        if recommendation.trim().is_empty() {
            return Err(CoreError::Validation("Recommendation text is required".into()).into());
        }

        let (capture, snapshot) = self.require_capture().await?;
        let target_style = resolve_target(style_vibe, Some(&capture.record.style_analysis));
        let prompt = outfit_photo_prompt(recommendation, &target_style);

        let mut photo = self.edit_snapshot(snapshot, prompt).await?;
        photo.recommendation = Some(recommendation.to_string());
        Ok(photo)
    }

    /// Apply a free-form instruction to the latest capture.
    pub async fn render_capture(&self, instruction: &str) -> Result<GeneratedPhoto, PipelineError> {
        validate_prompt(instruction)?;
        let (_capture, snapshot) = self.require_capture().await?;
        self.edit_snapshot(snapshot, capture_edit_prompt(instruction))
            .await
    }

    async fn require_capture(&self) -> Result<(Capture, Vec<u8>), PipelineError> {
        let mut capture = self.captures.latest().await?.ok_or(PipelineError::NoCapture)?;
        let snapshot = capture.snapshot.take().ok_or(PipelineError::NoCapture)?;
        Ok((capture, snapshot))
    }

    async fn edit_snapshot(
        &self,
        snapshot: Vec<u8>,
        prompt: String,
    ) -> Result<GeneratedPhoto, PipelineError> {
        let mime_type = sniff_image_mime(&snapshot);
        tracing::info!(
            model = %self.models.photo,
            source_mime = mime_type,
            source_bytes = snapshot.len(),
            "Editing captured photo",
        );

        let response = self
            .media
            .generate_image(ImageRequest {
                model: self.models.photo.clone(),
                prompt,
                source: Some(SourceImage {
                    mime_type: mime_type.to_string(),
                    bytes: snapshot,
                }),
                aspect_ratio: Some(PHOTO_ASPECT_RATIO.to_string()),
                image_size: Some(PHOTO_IMAGE_SIZE.to_string()),
            })
            .await?;

        let blob = response.image().ok_or(GenAiError::NoImage)?;
        let bytes = blob.decode()?;
        let file = self.captures.save_generated(&bytes, &blob.mime_type).await?;

        Ok(GeneratedPhoto {
            data_url: data_url::from_base64(&blob.mime_type, &blob.data),
            mime_type: blob.mime_type.clone(),
            file_name: file.file_name,
            url: file.url,
            recommendation: None,
            text: response.text(),
        })
    }
}

/// Vibe first, then the analysed style, then streetwear.
fn resolve_target(style_vibe: &str, analysis: Option<&StyleAnalysis>) -> String {
    target_style_for(style_vibe)
        .or_else(|| analysis.and_then(|a| a.style()).map(normalize_style))
        .unwrap_or_else(|| FALLBACK_STYLE.to_string())
}

/// MIME type of an encoded image, `image/png` when unrecognised.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("image/png")
}
