//! Direct passthrough handlers for text, image and video generation.
//!
//! Each binary endpoint has an `-info` twin returning JSON instead.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use silhouette_core::data_url;
use silhouette_core::error::CoreError;
use silhouette_core::prompt::validate_prompt;
use silhouette_genai::messages::{
    GenerateContentResponse, ImageRequest, SourceImage, TextRequest, VideoOperation, VideoRequest,
};
use silhouette_genai::{wait_for_video, GenAiError, MediaGenerator};
use silhouette_pipeline::sniff_image_mime;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::{attachment, DataResponse};
use crate::state::AppState;

/// How long the provider keeps generated videos.
const VIDEO_RETENTION: &str = "2 days";
const VIDEO_MIME: &str = "video/mp4";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPromptRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePromptRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditImageRequest {
    #[serde(default)]
    pub prompt: String,
    /// Data URL or bare base64 of the image to edit.
    pub image: Option<String>,
    /// Overrides the data URL header and byte sniffing.
    pub mime_type: Option<String>,
    pub model: Option<String>,
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPromptRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
    pub aspect_ratio: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedText {
    pub text: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Base64 payload.
    pub data: String,
    pub mime_type: String,
    pub data_url: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratedImage {
    pub image: ImagePayload,
    /// Text the model returned alongside the image.
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub uri: Option<String>,
    pub name: Option<String>,
    pub expires_in: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OperationInfo {
    pub name: String,
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct GeneratedVideo {
    pub video: VideoInfo,
    pub operation: OperationInfo,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn image_request(state: &AppState, input: ImagePromptRequest) -> AppResult<ImageRequest> {
    validate_prompt(&input.prompt)?;
    Ok(ImageRequest {
        model: input
            .model
            .unwrap_or_else(|| state.config.gemini.models.image.clone()),
        prompt: input.prompt,
        source: None,
        aspect_ratio: input.aspect_ratio,
        image_size: input.image_size,
    })
}

fn edit_request(state: &AppState, input: EditImageRequest) -> AppResult<ImageRequest> {
    validate_prompt(&input.prompt)?;
    let image = input
        .image
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| CoreError::Validation("image is required".into()))?;
    let decoded = data_url::decode(&image)?;
    if decoded.bytes.is_empty() {
        return Err(CoreError::Validation("image is empty".into()).into());
    }
    let mime_type = input
        .mime_type
        .or(decoded.mime_type)
        .unwrap_or_else(|| sniff_image_mime(&decoded.bytes).to_string());

    Ok(ImageRequest {
        model: input
            .model
            .unwrap_or_else(|| state.config.gemini.models.image.clone()),
        prompt: input.prompt,
        source: Some(SourceImage {
            mime_type,
            bytes: decoded.bytes,
        }),
        aspect_ratio: input.aspect_ratio,
        image_size: input.image_size,
    })
}

async fn run_image(
    media: &dyn MediaGenerator,
    request: ImageRequest,
) -> AppResult<GenerateContentResponse> {
    tracing::info!(
        model = %request.model,
        edit = request.source.is_some(),
        "Generating image",
    );
    Ok(media.generate_image(request).await?)
}

/// The generated image as bytes plus its MIME type.
fn image_bytes(response: &GenerateContentResponse) -> AppResult<(Vec<u8>, String)> {
    let blob = response.image().ok_or(GenAiError::NoImage)?;
    Ok((blob.decode()?, blob.mime_type.clone()))
}

fn image_info(response: &GenerateContentResponse) -> AppResult<GeneratedImage> {
    let blob = response.image().ok_or(GenAiError::NoImage)?;
    Ok(GeneratedImage {
        image: ImagePayload {
            data: blob.data.clone(),
            mime_type: blob.mime_type.clone(),
            data_url: data_url::from_base64(&blob.mime_type, &blob.data),
        },
        text: response.text(),
    })
}

/// Submit a video and poll it inside the request.
///
/// The poll loop stops when the client disconnects (the future is dropped)
/// or the server shuts down.
async fn run_video(
    state: &AppState,
    media: Arc<dyn MediaGenerator>,
    input: VideoPromptRequest,
) -> AppResult<VideoOperation> {
    validate_prompt(&input.prompt)?;
    let request = VideoRequest {
        model: input
            .model
            .unwrap_or_else(|| state.config.gemini.models.video.clone()),
        prompt: input.prompt,
        aspect_ratio: input.aspect_ratio,
    };

    tracing::info!(model = %request.model, "Starting video generation");
    let operation = media.start_video(request).await?;
    let operation_id = operation.name.clone();

    let done = wait_for_video(
        media.as_ref(),
        operation,
        &state.config.video_poll,
        &state.shutdown,
        |attempt| tracing::debug!(operation = %operation_id, attempt, "Video still generating"),
    )
    .await?;
    Ok(done)
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

async fn run_text(state: &AppState, input: TextPromptRequest) -> AppResult<GeneratedText> {
    validate_prompt(&input.prompt)?;
    let model = input
        .model
        .unwrap_or_else(|| state.config.gemini.models.text.clone());

    tracing::info!(model = %model, "Generating text");
    let response = state
        .media()?
        .generate_text(TextRequest {
            model: model.clone(),
            prompt: input.prompt,
        })
        .await?;

    Ok(GeneratedText {
        text: response.text().unwrap_or_default(),
        model,
    })
}

/// POST /api/generate-text
pub async fn generate_text(
    State(state): State<AppState>,
    AppJson(input): AppJson<TextPromptRequest>,
) -> AppResult<impl IntoResponse> {
    let generated = run_text(&state, input).await?;
    Ok(Json(DataResponse { data: generated }))
}

/// POST /api/generate-text-stream
///
/// Returns the complete text as `text/plain` once generation finishes.
pub async fn generate_text_stream(
    State(state): State<AppState>,
    AppJson(input): AppJson<TextPromptRequest>,
) -> AppResult<Response> {
    let generated = run_text(&state, input).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        generated.text,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// POST /api/generate-image
pub async fn generate_image(
    State(state): State<AppState>,
    AppJson(input): AppJson<ImagePromptRequest>,
) -> AppResult<Response> {
    let media = state.media()?;
    let request = image_request(&state, input)?;
    let response = run_image(media.as_ref(), request).await?;
    let (bytes, mime_type) = image_bytes(&response)?;
    attachment(bytes, &mime_type, "image")
}

/// POST /api/generate-image-info
pub async fn generate_image_info(
    State(state): State<AppState>,
    AppJson(input): AppJson<ImagePromptRequest>,
) -> AppResult<impl IntoResponse> {
    let media = state.media()?;
    let request = image_request(&state, input)?;
    let response = run_image(media.as_ref(), request).await?;
    Ok(Json(DataResponse {
        data: image_info(&response)?,
    }))
}

/// POST /api/edit-image
pub async fn edit_image(
    State(state): State<AppState>,
    AppJson(input): AppJson<EditImageRequest>,
) -> AppResult<Response> {
    let media = state.media()?;
    let request = edit_request(&state, input)?;
    let response = run_image(media.as_ref(), request).await?;
    let (bytes, mime_type) = image_bytes(&response)?;
    attachment(bytes, &mime_type, "image")
}

/// POST /api/edit-image-info
pub async fn edit_image_info(
    State(state): State<AppState>,
    AppJson(input): AppJson<EditImageRequest>,
) -> AppResult<impl IntoResponse> {
    let media = state.media()?;
    let request = edit_request(&state, input)?;
    let response = run_image(media.as_ref(), request).await?;
    Ok(Json(DataResponse {
        data: image_info(&response)?,
    }))
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

/// POST /api/generate-video
///
/// Blocks until the video is ready, then returns it as `video/mp4`.
pub async fn generate_video(
    State(state): State<AppState>,
    AppJson(input): AppJson<VideoPromptRequest>,
) -> AppResult<Response> {
    let media = state.media()?;
    let done = run_video(&state, Arc::clone(&media), input).await?;
    let file = done.video()?;
    let bytes = media.download_video(file).await?;

    tracing::info!(operation = %done.name, bytes = bytes.len(), "Video downloaded");
    attachment(bytes, VIDEO_MIME, "video")
}

/// POST /api/generate-video-info
///
/// Blocks until the video is ready, then returns where to fetch it.
pub async fn generate_video_info(
    State(state): State<AppState>,
    AppJson(input): AppJson<VideoPromptRequest>,
) -> AppResult<impl IntoResponse> {
    let media = state.media()?;
    let done = run_video(&state, media, input).await?;
    let file = done.video()?;

    Ok(Json(DataResponse {
        data: GeneratedVideo {
            video: VideoInfo {
                uri: file.display_uri().map(str::to_string),
                name: file.name.clone(),
                expires_in: VIDEO_RETENTION,
            },
            operation: OperationInfo {
                name: done.name.clone(),
                done: done.done,
            },
        },
    }))
}
