use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Map, Value};
use silhouette_core::error::CoreError;
use silhouette_disk::DiskError;
use silhouette_genai::{GenAiError, PollError};
use silhouette_pipeline::PipelineError;
use silhouette_vision::VisionError;

/// Remediation text attached to quota errors.
pub const QUOTA_SUGGESTION: &str = "Your free tier quota has been exceeded. Please wait before \
     retrying, or enable billing for higher limits. See \
     https://ai.google.dev/gemini-api/docs/rate-limits";

/// Whether 500 responses carry a `details` field. Off until `main` enables
/// it for non-production environments.
static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Toggle `details` on internal error responses.
pub fn expose_internal_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

/// Application-level error type for HTTP handlers.
///
/// Wraps the library error enums and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses
/// of the shape `{ "error", "code", ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `silhouette_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Disk(#[from] DiskError),

    /// The generative provider failed.
    #[error(transparent)]
    Provider(#[from] GenAiError),

    #[error(transparent)]
    Poll(#[from] PollError),

    /// The vision provider failed.
    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A provider credential is missing from the environment.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Core(CoreError::InvalidFields(errors))
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Core(core) => core_error(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Disk(err) => disk_error(err),
            AppError::Provider(err) => provider_error(err),
            AppError::Poll(err) => poll_error(err),
            AppError::Vision(err) => {
                tracing::error!(error = %err, "Style analysis failed");
                let mut body = error_body("ANALYSIS_FAILED", "Analysis failed");
                body["details"] = json!(err.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            AppError::Pipeline(err) => match err {
                PipelineError::NoCapture => (
                    StatusCode::BAD_REQUEST,
                    error_body("NO_CAPTURE", err.to_string()),
                ),
                PipelineError::Invalid(core) => core_error(core),
                PipelineError::Disk(disk) => disk_error(disk),
                PipelineError::Provider(provider) => provider_error(provider),
            },
            AppError::NotConfigured(var) => {
                tracing::error!(var, "Provider credential missing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("NOT_CONFIGURED", format!("{var} is not configured")),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, error_body("BAD_REQUEST", msg)),
            AppError::InternalError(msg) => internal_error(msg),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn error_body(code: &str, message: impl Into<String>) -> Value {
    json!({
        "error": message.into(),
        "code": code,
    })
}

/// Log `err` and build a sanitized 500 body.
fn internal_error(err: impl Display) -> (StatusCode, Value) {
    tracing::error!(error = %err, "Internal error");
    let mut body = error_body("INTERNAL_ERROR", "An internal error occurred");
    if EXPOSE_DETAILS.load(Ordering::Relaxed) {
        body["details"] = json!(err.to_string());
    }
    (StatusCode::INTERNAL_SERVER_ERROR, body)
}

fn core_error(err: &CoreError) -> (StatusCode, Value) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            error_body("NOT_FOUND", format!("{entity} with id {id} not found")),
        ),
        CoreError::Missing(what) => (
            StatusCode::NOT_FOUND,
            error_body("NOT_FOUND", format!("No {what} found")),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, error_body("VALIDATION_ERROR", msg)),
        CoreError::InvalidFields(errors) => {
            let mut body = error_body("VALIDATION_ERROR", "Validation failed");
            body["fields"] = field_messages(errors);
            (StatusCode::BAD_REQUEST, body)
        }
        CoreError::Internal(msg) => internal_error(msg),
    }
}

/// `{ field: [message, ...] }` from a `validator` report.
fn field_messages(errors: &validator::ValidationErrors) -> Value {
    let mut fields = Map::new();
    for (field, errs) in errors.field_errors() {
        let messages: Vec<String> = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        fields.insert(camel_case(&field), json!(messages));
    }
    Value::Object(fields)
}

/// `item_type` -> `itemType`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn disk_error(err: &DiskError) -> (StatusCode, Value) {
    match err {
        DiskError::Invalid(core) => core_error(core),
        other => internal_error(other),
    }
}

fn provider_error(err: &GenAiError) -> (StatusCode, Value) {
    if let Some(quota) = err.quota() {
        tracing::warn!(
            message = %quota.message,
            retry_after = ?quota.retry_after,
            "Provider quota exceeded",
        );
        let body = json!({
            "error": "Quota exceeded",
            "code": "QUOTA_EXCEEDED",
            "message": quota.message,
            "retryAfter": quota.retry_after,
            "suggestion": QUOTA_SUGGESTION,
        });
        return (StatusCode::TOO_MANY_REQUESTS, body);
    }

    match err {
        GenAiError::Api { status, .. } => {
            let message = err.provider_message();
            tracing::warn!(status, message = %message, "Provider rejected the request");
            let http_status = StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            let mut body = error_body("PROVIDER_ERROR", "API request failed");
            body["message"] = json!(message);
            body["status"] = json!(status);
            (http_status, body)
        }
        GenAiError::Request(e) => {
            tracing::error!(error = %e, "Provider unreachable");
            (
                StatusCode::BAD_GATEWAY,
                error_body("PROVIDER_UNAVAILABLE", "Generation provider is unreachable"),
            )
        }
        GenAiError::Decode(msg) => {
            tracing::error!(error = %msg, "Malformed provider response");
            (
                StatusCode::BAD_GATEWAY,
                error_body("PROVIDER_ERROR", "Malformed provider response"),
            )
        }
        GenAiError::NoImage => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body("NO_IMAGE", err.to_string()),
        ),
        GenAiError::NoVideo => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body("NO_VIDEO", err.to_string()),
        ),
        GenAiError::OperationFailed(msg) => {
            tracing::warn!(error = %msg, "Video operation failed");
            let mut body = error_body("VIDEO_FAILED", "Video generation failed");
            body["message"] = json!(msg);
            (StatusCode::INTERNAL_SERVER_ERROR, body)
        }
    }
}

fn poll_error(err: &PollError) -> (StatusCode, Value) {
    match err {
        PollError::TimedOut {
            operation_id,
            attempts,
        } => {
            let mut body = error_body("TIMEOUT", "Video generation timed out");
            body["operationId"] = json!(operation_id);
            body["attempts"] = json!(attempts);
            (StatusCode::GATEWAY_TIMEOUT, body)
        }
        PollError::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            error_body("CANCELLED", "Video generation was cancelled"),
        ),
        PollError::Provider(provider) => provider_error(provider),
    }
}

/// Classify a sqlx error into an HTTP status and body.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, Value) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            error_body("NOT_FOUND", "Resource not found"),
        ),
        other => internal_error(format!("Database error: {other}")),
    }
}
