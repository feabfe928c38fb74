#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use silhouette_db::store::MemoryItemStore;
use silhouette_disk::{CaptureStore, PreferencesStore};
use silhouette_genai::messages::{
    Blob, Candidate, Content, GenerateContentResponse, GeneratedVideo, ImageRequest, Part,
    TextRequest, VideoFile, VideoOperation, VideoRequest, VideoResponse,
};
use silhouette_genai::{GenAiError, MediaGenerator, ModelConfig, PollPolicy};
use silhouette_vision::{StyleAnalyzer, StyleVerdict, VideoClip, VisionError};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use silhouette_api::background::VideoJobManager;
use silhouette_api::config::{GeminiConfig, OvershootConfig, ServerConfig};
use silhouette_api::router::build_app_router;
use silhouette_api::state::AppState;

/// Smallest byte string `image::guess_format` recognises as PNG.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
pub const GENERATED_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRgenerated";
pub const VIDEO_BYTES: &[u8] = b"\0\0\0\x18ftypmp42fake-video";

pub const RECOMMENDATION_TEXT: &str = "OUTFIT: Relaxed street layers\n\
ITEMS:\n\
1. Black hoodie - $45 - https://shop.example/hoodie\n\
2. Cargo pants - $60 - https://shop.example/cargo\n\
WHY IT WORKS: The loose fit balances the shoulders.\n\
STYLING TIP: Roll the cuffs once.";

/// A 429 body carrying a `RetryInfo` detail, as the provider sends it.
pub const QUOTA_BODY: &str = r#"{"error":{"code":429,"message":"You exceeded your current quota.\nPlease migrate to a paid plan.","status":"RESOURCE_EXHAUSTED","details":[{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"27s"}]}}"#;

pub const ORIGIN: &str = "http://localhost:3000";

/// Build a test `ServerConfig` rooted at `dir`.
///
/// Video polling checks immediately and gives up after three attempts.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![ORIGIN.to_string()],
        request_timeout_secs: 30,
        max_body_bytes: 1024 * 1024,
        database_url: None,
        captures_dir: dir.path().join("captures"),
        preferences_dir: dir.path().join("preferences"),
        gemini: GeminiConfig {
            api_key: None,
            base_url: "http://gemini.invalid".to_string(),
            models: ModelConfig::default(),
        },
        video_poll: PollPolicy {
            interval: Duration::ZERO,
            max_attempts: 3,
        },
        video_job_retention: Duration::from_secs(3600),
        overshoot: OvershootConfig {
            api_key: None,
            api_url: "ws://overshoot.invalid".to_string(),
            window: Duration::from_millis(10),
        },
        production: false,
    }
}

/// A running application over temporary directories.
///
/// Holds the directory guard so the stores outlive every request.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

#[derive(Default)]
pub struct TestAppBuilder {
    media: Option<Arc<FakeMedia>>,
    analyzer: Option<Arc<FakeAnalyzer>>,
    video_poll: Option<PollPolicy>,
}

impl TestAppBuilder {
    pub fn media(mut self, media: Arc<FakeMedia>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn analyzer(mut self, analyzer: Arc<FakeAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn video_poll(mut self, policy: PollPolicy) -> Self {
        self.video_poll = Some(policy);
        self
    }

    /// Build the full application router with all middleware layers.
    ///
    /// Uses the same `build_app_router` as `main.rs`, with the in-memory
    /// item store and file stores under a fresh temp directory.
    pub async fn build(self) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        if let Some(policy) = self.video_poll {
            config.video_poll = policy;
        }

        let captures = CaptureStore::open(&config.captures_dir).await.unwrap();
        let preferences = PreferencesStore::open(&config.preferences_dir)
            .await
            .unwrap();
        let shutdown = CancellationToken::new();

        let state = AppState {
            config: Arc::new(config.clone()),
            items: Arc::new(MemoryItemStore::new()),
            captures: Arc::new(captures),
            preferences: Arc::new(preferences),
            media: self.media.map(|m| m as Arc<dyn MediaGenerator>),
            analyzer: self.analyzer.map(|a| a as Arc<dyn StyleAnalyzer>),
            video_jobs: Arc::new(VideoJobManager::new(shutdown.child_token())),
            shutdown,
        };

        TestApp {
            app: build_app_router(state.clone(), &config),
            state,
            _dir: dir,
        }
    }
}

/// An application without generative or vision providers.
pub async fn build_test_app() -> TestApp {
    TestAppBuilder::default().build().await
}

/// An application whose generative provider is `media`.
pub async fn build_test_app_with_media(media: Arc<FakeMedia>) -> TestApp {
    TestAppBuilder::default().media(media).build().await
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a single-file multipart form.
pub async fn post_file(
    app: Router,
    uri: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response {
    const BOUNDARY: &str = "silhouette-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert `response` has `status` and return its JSON body.
pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Fake providers
// ---------------------------------------------------------------------------

fn response(parts: Vec<Part>) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Content { role: None, parts },
            finish_reason: None,
        }],
    }
}

/// In-process stand-in for the generative provider.
///
/// Text requests get [`RECOMMENDATION_TEXT`], image requests get
/// [`GENERATED_PNG`] and videos are ready on the configured status check.
pub struct FakeMedia {
    pub prompts: Mutex<Vec<String>>,
    pub image_requests: Mutex<Vec<ImageRequest>>,
    /// Every call fails with this status and body.
    failure: Option<(u16, String)>,
    /// 1-based status check that reports the video done; `None` never does.
    video_ready_at: Option<u32>,
    /// Image responses carry no image part.
    text_only_images: bool,
    status_checks: AtomicU32,
}

impl Default for FakeMedia {
    fn default() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            image_requests: Mutex::new(Vec::new()),
            failure: None,
            video_ready_at: Some(1),
            text_only_images: false,
            status_checks: AtomicU32::new(0),
        }
    }
}

impl FakeMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some((status, body.to_string())),
            ..Self::default()
        })
    }

    pub fn quota_exhausted() -> Arc<Self> {
        Self::failing(429, QUOTA_BODY)
    }

    pub fn video_ready_at(check: u32) -> Arc<Self> {
        Arc::new(Self {
            video_ready_at: Some(check),
            ..Self::default()
        })
    }

    pub fn video_never_finishes() -> Arc<Self> {
        Arc::new(Self {
            video_ready_at: None,
            ..Self::default()
        })
    }

    pub fn without_images() -> Arc<Self> {
        Arc::new(Self {
            text_only_images: true,
            ..Self::default()
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.image_requests.lock().unwrap().clone()
    }

    pub fn status_checks(&self) -> u32 {
        self.status_checks.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), GenAiError> {
        match &self.failure {
            Some((status, body)) => Err(GenAiError::Api {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MediaGenerator for FakeMedia {
    async fn generate_text(&self, req: TextRequest) -> Result<GenerateContentResponse, GenAiError> {
        self.check_failure()?;
        self.prompts.lock().unwrap().push(req.prompt);
        Ok(response(vec![Part::Text(RECOMMENDATION_TEXT.into())]))
    }

    async fn generate_image(
        &self,
        req: ImageRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        self.check_failure()?;
        self.prompts.lock().unwrap().push(req.prompt.clone());
        self.image_requests.lock().unwrap().push(req);

        let mut parts = vec![Part::Text("Here is your look".into())];
        if !self.text_only_images {
            parts.push(Part::InlineData(Blob::from_bytes("image/png", GENERATED_PNG)));
        }
        Ok(response(parts))
    }

    async fn start_video(&self, req: VideoRequest) -> Result<VideoOperation, GenAiError> {
        self.check_failure()?;
        self.prompts.lock().unwrap().push(req.prompt);
        Ok(VideoOperation {
            name: "operations/fake-video".into(),
            ..VideoOperation::default()
        })
    }

    async fn video_status(&self, operation: &VideoOperation) -> Result<VideoOperation, GenAiError> {
        let check = self.status_checks.fetch_add(1, Ordering::SeqCst) + 1;
        let done = self.video_ready_at.is_some_and(|at| check >= at);
        if !done {
            return Ok(operation.clone());
        }

        Ok(VideoOperation {
            name: operation.name.clone(),
            done: true,
            response: Some(VideoResponse {
                generated_videos: vec![GeneratedVideo {
                    video: VideoFile {
                        name: Some("files/fake-video".into()),
                        uri: Some("https://video.example/fake-video.mp4".into()),
                    },
                }],
                ..VideoResponse::default()
            }),
            error: None,
        })
    }

    async fn download_video(&self, _file: &VideoFile) -> Result<Vec<u8>, GenAiError> {
        Ok(VIDEO_BYTES.to_vec())
    }
}

/// Vision provider returning a fixed result text.
pub struct FakeAnalyzer {
    result: String,
    pub clips: Mutex<Vec<VideoClip>>,
}

impl FakeAnalyzer {
    pub fn new(result: &str) -> Arc<Self> {
        Arc::new(Self {
            result: result.to_string(),
            clips: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl StyleAnalyzer for FakeAnalyzer {
    async fn analyze(&self, clip: VideoClip) -> Result<StyleVerdict, VisionError> {
        self.clips.lock().unwrap().push(clip);
        Ok(StyleVerdict::from_text(self.result.clone()))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Store a capture through the API.
pub async fn save_capture(app: Router, style: &str) -> serde_json::Value {
    let body = serde_json::json!({
        "snapshot": silhouette_core::data_url::encode("image/png", PNG_BYTES),
        "styleAnalysis": { "color": "navy", "style": style, "itemCategory": "tops" },
    });
    let response = post_json(app, "/api/capture", body).await;
    expect_json(response, StatusCode::CREATED).await
}
