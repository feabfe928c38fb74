pub mod capture;
pub mod health;
pub mod items;
pub mod preferences;
pub mod recommendation;
pub mod video_jobs;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::{analysis, media};
use crate::state::AppState;

/// Build the `/api` routes subject to the request timeout.
///
/// Route hierarchy:
///
/// ```text
/// /capture                              save (POST)
/// /capture/latest                       latest capture with snapshot
/// /capture/generate-photo               edit the latest capture (POST)
///
/// /preferences                          save (POST)
/// /preferences/latest                   latest preference set
/// /preferences/style-vibe               save (POST)
/// /preferences/style-vibe/latest        latest style vibe
///
/// /analyze-style                        multipart `video` (POST)
///
/// /recommendation                       recommendation text (POST)
/// /recommendation/photo                 outfit photo (POST)
///
/// /generate-image[-info]                text -> image (POST)
/// /edit-image[-info]                    text + image -> image (POST)
/// /generate-text                        text (POST)
/// /generate-text-stream                 text as text/plain (POST)
///
/// /video-jobs                           list, submit
/// /video-jobs/{id}                      get, cancel
/// /video-jobs/{id}/content              download
/// ```
///
/// `video_body_limit` applies to the clip upload of `/analyze-style`.
pub fn api_routes(video_body_limit: usize) -> Router<AppState> {
    Router::new()
        .nest("/capture", capture::router())
        .nest("/preferences", preferences::router())
        .nest("/recommendation", recommendation::router())
        .nest("/video-jobs", video_jobs::router())
        .route(
            "/analyze-style",
            post(analysis::analyze_style).layer(DefaultBodyLimit::max(video_body_limit)),
        )
        .route("/generate-image", post(media::generate_image))
        .route("/generate-image-info", post(media::generate_image_info))
        .route("/edit-image", post(media::edit_image))
        .route("/edit-image-info", post(media::edit_image_info))
        .route("/generate-text", post(media::generate_text))
        .route("/generate-text-stream", post(media::generate_text_stream))
}

/// `/api` routes that poll a provider inside the request and so are
/// mounted without the request timeout.
///
/// ```text
/// /generate-video          video/mp4 (POST)
/// /generate-video-info     video location (POST)
/// ```
pub fn long_running_routes() -> Router<AppState> {
    Router::new()
        .route("/generate-video", post(media::generate_video))
        .route("/generate-video-info", post(media::generate_video_info))
}
