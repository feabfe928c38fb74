//! The media generation seam used by the pipeline and HTTP handlers.

use async_trait::async_trait;

use crate::error::GenAiError;
use crate::messages::{
    GenerateContentResponse, ImageRequest, TextRequest, VideoFile, VideoOperation, VideoRequest,
};

/// Text, image and video generation against a generative provider.
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    async fn generate_text(&self, req: TextRequest)
        -> Result<GenerateContentResponse, GenAiError>;

    /// Generate an image; edits `req.source` when it is set.
    async fn generate_image(
        &self,
        req: ImageRequest,
    ) -> Result<GenerateContentResponse, GenAiError>;

    /// Submit a video generation and return the pending operation.
    async fn start_video(&self, req: VideoRequest) -> Result<VideoOperation, GenAiError>;

    /// Refresh the state of a pending operation.
    async fn video_status(&self, operation: &VideoOperation)
        -> Result<VideoOperation, GenAiError>;

    async fn download_video(&self, file: &VideoFile) -> Result<Vec<u8>, GenAiError>;
}

/// Default model names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub text: String,
    pub image: String,
    /// Model used for identity-preserving outfit photos.
    pub photo: String,
    pub video: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: "gemini-2.5-flash".to_string(),
            image: "gemini-2.5-flash-image".to_string(),
            photo: "gemini-3-pro-image-preview".to_string(),
            video: "veo-3.1-generate-preview".to_string(),
        }
    }
}

/// Aspect ratio of generated outfit photos.
pub const PHOTO_ASPECT_RATIO: &str = "3:4";
/// Resolution of generated outfit photos.
pub const PHOTO_IMAGE_SIZE: &str = "2K";
