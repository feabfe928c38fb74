//! REST client for the Gemini API.
//!
//! Wraps `generateContent`, `predictLongRunning`, operation polling and
//! file downloads using [`reqwest`]. Every request carries the API key in
//! the `x-goog-api-key` header.

use async_trait::async_trait;

use crate::error::GenAiError;
use crate::generator::MediaGenerator;
use crate::messages::{
    Blob, Content, GenerateContentBody, GenerateContentResponse, GenerationConfig, ImageConfig,
    ImageRequest, Part, PredictLongRunningBody, TextRequest, VideoFile, VideoInstance,
    VideoLocator, VideoOperation, VideoParameters, VideoRequest,
};

/// Default REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini REST API.
pub struct GeminiApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiApi {
    /// * `base_url` - e.g. [`DEFAULT_BASE_URL`]; a trailing slash is ignored.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// `POST /models/{model}:generateContent`.
    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentBody,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch raw bytes from `url` with the API key attached.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, GenAiError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Download endpoint for a `files/<id>` resource name.
    fn file_download_url(&self, name: &str) -> String {
        let name = name.trim_start_matches('/');
        let name = if name.starts_with("files/") {
            name.to_string()
        } else {
            format!("files/{name}")
        };
        format!("{}/{name}:download?alt=media", self.base_url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GenAiError::Api`] containing
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GenAiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenAiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GenAiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GenAiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MediaGenerator for GeminiApi {
    async fn generate_text(
        &self,
        req: TextRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        tracing::debug!(model = %req.model, prompt_len = req.prompt.len(), "Generating text");
        let body = GenerateContentBody {
            contents: vec![user_turn(vec![Part::Text(req.prompt)])],
            generation_config: None,
        };
        self.generate_content(&req.model, &body).await
    }

    async fn generate_image(
        &self,
        req: ImageRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        tracing::debug!(
            model = %req.model,
            edit = req.source.is_some(),
            aspect_ratio = req.aspect_ratio.as_deref().unwrap_or("-"),
            image_size = req.image_size.as_deref().unwrap_or("-"),
            "Generating image",
        );

        let mut parts = vec![Part::Text(req.prompt)];
        if let Some(source) = &req.source {
            parts.push(Part::InlineData(Blob::from_bytes(
                source.mime_type.clone(),
                &source.bytes,
            )));
        }

        let image_config = (req.aspect_ratio.is_some() || req.image_size.is_some()).then(|| {
            ImageConfig {
                aspect_ratio: req.aspect_ratio.clone(),
                image_size: req.image_size.clone(),
            }
        });

        let body = GenerateContentBody {
            contents: vec![user_turn(parts)],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE", "TEXT"],
                image_config,
            }),
        };
        self.generate_content(&req.model, &body).await
    }

    async fn start_video(&self, req: VideoRequest) -> Result<VideoOperation, GenAiError> {
        tracing::info!(model = %req.model, "Starting video generation");
        let body = PredictLongRunningBody {
            instances: vec![VideoInstance { prompt: req.prompt }],
            parameters: req
                .aspect_ratio
                .map(|aspect_ratio| VideoParameters { aspect_ratio }),
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:predictLongRunning",
                self.base_url, req.model
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn video_status(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, GenAiError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, operation.name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn download_video(&self, file: &VideoFile) -> Result<Vec<u8>, GenAiError> {
        let mut last_err = GenAiError::NoVideo;
        for locator in file.locators() {
            let url = match &locator {
                VideoLocator::FileName(name) => self.file_download_url(name),
                VideoLocator::Uri(uri) => uri.clone(),
            };
            match self.fetch_bytes(&url).await {
                Ok(bytes) => {
                    tracing::info!(?locator, bytes = bytes.len(), "Video downloaded");
                    return Ok(bytes);
                }
                Err(e) => {
                    tracing::warn!(?locator, error = %e, "Video download failed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

fn user_turn(parts: Vec<Part>) -> Content {
    Content {
        role: Some("user".to_string()),
        parts,
    }
}
