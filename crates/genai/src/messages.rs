//! Wire types for the Gemini `generateContent` and long-running video
//! endpoints.
//!
//! Response parts arrive as objects carrying exactly one payload key
//! (`text`, `inlineData`, ...). They are read through [`WirePart`] and
//! exposed as the [`Part`] enum.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::GenAiError;

// ---------------------------------------------------------------------------
// Requests (what callers hand to a MediaGenerator)
// ---------------------------------------------------------------------------

/// Plain text generation.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub model: String,
    pub prompt: String,
}

/// An input image for the edit capability.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Image generation, or image editing when `source` is set.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub source: Option<SourceImage>,
    /// e.g. `"3:4"`.
    pub aspect_ratio: Option<String>,
    /// `"1K"`, `"2K"` or `"4K"`.
    pub image_size: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub model: String,
    pub prompt: String,
    /// `"16:9"` or `"9:16"`.
    pub aspect_ratio: Option<String>,
}

// ---------------------------------------------------------------------------
// generateContent
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentBody {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_modalities: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(default = "default_image_mime")]
    pub mime_type: String,
    pub data: String,
}

fn default_image_mime() -> String {
    "image/png".to_string()
}

impl Blob {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, GenAiError> {
        general_purpose::STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| GenAiError::Decode(format!("invalid base64 payload: {e}")))
    }
}

/// One part of a content turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WirePart", into = "WirePart")]
pub enum Part {
    Text(String),
    InlineData(Blob),
    /// Payload kinds this backend does not consume (function calls,
    /// model thoughts, file references).
    Other,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, alias = "imageData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

impl From<WirePart> for Part {
    fn from(wire: WirePart) -> Self {
        match wire {
            WirePart { thought: true, .. } => Part::Other,
            WirePart {
                inline_data: Some(blob),
                ..
            } => Part::InlineData(blob),
            WirePart { text: Some(t), .. } => Part::Text(t),
            _ => Part::Other,
        }
    }
}

impl From<Part> for WirePart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(t) => WirePart {
                text: Some(t),
                ..Default::default()
            },
            Part::InlineData(blob) => WirePart {
                inline_data: Some(blob),
                ..Default::default()
            },
            Part::Other => WirePart::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate.
    pub fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .map(|c| c.content.parts.as_slice())
            .unwrap_or_default()
    }

    /// All text parts of the first candidate, joined by a space.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts()
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        (!texts.is_empty()).then(|| texts.join(" "))
    }

    /// First inline image of the first candidate.
    pub fn image(&self) -> Option<&Blob> {
        self.parts().iter().find_map(|p| match p {
            Part::InlineData(blob) => Some(blob),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Video operations
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct PredictLongRunningBody {
    pub instances: Vec<VideoInstance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<VideoParameters>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VideoInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoParameters {
    pub aspect_ratio: String,
}

/// A long-running video generation operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<VideoResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: String,
}

/// The REST API nests samples under `generateVideoResponse`; the SDK shape
/// uses `generatedVideos`. Both are read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_video_response: Option<GeneratedSamples>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSamples {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedVideo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedVideo {
    pub video: VideoFile,
}

/// Location of a generated video file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Where to fetch a video from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoLocator {
    /// A `files/<id>` resource name, fetched through the file-download endpoint.
    FileName(String),
    /// A direct download URI.
    Uri(String),
}

impl VideoFile {
    /// Download candidates in preference order.
    pub fn locators(&self) -> Vec<VideoLocator> {
        let mut out = Vec::with_capacity(2);
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            out.push(VideoLocator::FileName(name.to_string()));
        }
        if let Some(uri) = self.uri.as_deref().filter(|u| !u.is_empty()) {
            out.push(VideoLocator::Uri(uri.to_string()));
        }
        out
    }

    /// URI if known, else the resource name.
    pub fn display_uri(&self) -> Option<&str> {
        self.uri.as_deref().or(self.name.as_deref())
    }
}

impl VideoOperation {
    /// The first generated video of a finished operation.
    ///
    /// A provider-reported error becomes [`GenAiError::OperationFailed`];
    /// a finished operation without samples becomes [`GenAiError::NoVideo`].
    pub fn video(&self) -> Result<&VideoFile, GenAiError> {
        if let Some(err) = &self.error {
            return Err(GenAiError::OperationFailed(err.message.clone()));
        }
        let response = self.response.as_ref().ok_or(GenAiError::NoVideo)?;
        response
            .generate_video_response
            .as_ref()
            .and_then(|r| r.generated_samples.first())
            .or_else(|| response.generated_videos.first())
            .map(|v| &v.video)
            .ok_or(GenAiError::NoVideo)
    }
}
