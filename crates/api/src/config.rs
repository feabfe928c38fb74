use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use silhouette_genai::{ModelConfig, PollPolicy};

/// Generative provider settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// `None` disables every generative endpoint.
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: ModelConfig,
}

/// Realtime vision provider settings.
#[derive(Debug, Clone)]
pub struct OvershootConfig {
    /// `None` disables `/api/analyze-style`.
    pub api_key: Option<String>,
    pub api_url: String,
    /// How long results are collected after the clip was sent.
    pub window: Duration,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Timeout for every route except the synchronous video ones.
    pub request_timeout_secs: u64,
    /// JSON body limit. Video uploads get eight times this.
    pub max_body_bytes: usize,
    /// Postgres URL for the item store; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub captures_dir: PathBuf,
    pub preferences_dir: PathBuf,
    pub gemini: GeminiConfig,
    pub video_poll: PollPolicy,
    /// How long finished video jobs stay retrievable.
    pub video_job_retention: Duration,
    pub overshoot: OvershootConfig,
    /// `APP_ENV=production` hides internal error details.
    pub production: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                                            |
    /// |------------------------------|----------------------------------------------------|
    /// | `HOST`                       | `0.0.0.0`                                          |
    /// | `PORT`                       | `3000`                                             |
    /// | `CORS_ORIGINS`               | `http://localhost:3000`                            |
    /// | `REQUEST_TIMEOUT_SECS`       | `120`                                              |
    /// | `MAX_BODY_BYTES`             | `10485760`                                         |
    /// | `DATABASE_URL`               | unset (replaces `MONGODB_URI`)                     |
    /// | `CAPTURES_DIR`               | `captures`                                         |
    /// | `PREFERENCES_DIR`            | `preferences`                                      |
    /// | `GEMINI_API_KEY`             | unset                                              |
    /// | `GEMINI_BASE_URL`            | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `GEMINI_TEXT_MODEL`          | `gemini-2.5-flash`                                 |
    /// | `GEMINI_IMAGE_MODEL`         | `gemini-2.5-flash-image`                           |
    /// | `GEMINI_PHOTO_MODEL`         | `gemini-3-pro-image-preview`                       |
    /// | `GEMINI_VIDEO_MODEL`         | `veo-3.1-generate-preview`                         |
    /// | `VIDEO_POLL_INTERVAL_SECS`   | `10`                                               |
    /// | `VIDEO_POLL_MAX_ATTEMPTS`    | `60`                                               |
    /// | `VIDEO_JOB_RETENTION_SECS`   | `86400`                                            |
    /// | `OVERSHOOT_API_KEY`          | unset                                              |
    /// | `OVERSHOOT_API_URL`          | `wss://cluster1.overshoot.ai/api/v0.2`             |
    /// | `STYLE_ANALYSIS_WINDOW_SECS` | `5`                                                |
    /// | `APP_ENV`                    | `development`                                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_var("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", "120");
        let max_body_bytes: usize = parse_var("MAX_BODY_BYTES", "10485760");

        let defaults = ModelConfig::default();
        let gemini = GeminiConfig {
            api_key: optional_var("GEMINI_API_KEY"),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| silhouette_genai::api::DEFAULT_BASE_URL.into()),
            models: ModelConfig {
                text: std::env::var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text),
                image: std::env::var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image),
                photo: std::env::var("GEMINI_PHOTO_MODEL").unwrap_or(defaults.photo),
                video: std::env::var("GEMINI_VIDEO_MODEL").unwrap_or(defaults.video),
            },
        };

        let video_poll = PollPolicy {
            interval: Duration::from_secs(parse_var("VIDEO_POLL_INTERVAL_SECS", "10")),
            max_attempts: parse_var("VIDEO_POLL_MAX_ATTEMPTS", "60"),
        };

        let video_job_retention =
            Duration::from_secs(parse_var("VIDEO_JOB_RETENTION_SECS", "86400"));

        let overshoot = OvershootConfig {
            api_key: optional_var("OVERSHOOT_API_KEY"),
            api_url: std::env::var("OVERSHOOT_API_URL")
                .unwrap_or_else(|_| silhouette_vision::client::DEFAULT_API_URL.into()),
            window: Duration::from_secs(parse_var("STYLE_ANALYSIS_WINDOW_SECS", "5")),
        };

        let production = std::env::var("APP_ENV")
            .map(|env| env.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_body_bytes,
            database_url: optional_var("DATABASE_URL"),
            captures_dir: std::env::var("CAPTURES_DIR")
                .unwrap_or_else(|_| "captures".into())
                .into(),
            preferences_dir: std::env::var("PREFERENCES_DIR")
                .unwrap_or_else(|_| "preferences".into())
                .into(),
            gemini,
            video_poll,
            video_job_retention,
            overshoot,
            production,
        }
    }
}

/// Variables from earlier deployments and what replaced them.
const RETIRED_VARS: [(&str, &str); 1] = [("MONGODB_URI", "DATABASE_URL")];

/// Log a warning for every retired variable that is still set.
pub fn warn_retired_vars() {
    for (name, replacement) in retired_vars_set(optional_var) {
        tracing::warn!(
            var = name,
            replacement,
            "{name} is no longer read; set {replacement} to configure the item store",
        );
    }
}

fn retired_vars_set(
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<(&'static str, &'static str)> {
    RETIRED_VARS
        .into_iter()
        .filter(|(name, _)| lookup(*name).is_some())
        .collect()
}

/// Parse `name` (or `default` when unset). Panics on a malformed value.
fn parse_var<T>(name: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.into());
    raw.parse()
        .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>()))
}

/// Unset and blank values are both `None`.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
