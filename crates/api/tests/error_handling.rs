//! Tests for `AppError` → HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct HTTP
//! status code, error code, and message. They do NOT need an HTTP server --
//! they call `IntoResponse` directly on `AppError` values.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use silhouette_api::error::{AppError, QUOTA_SUGGESTION};
use silhouette_core::error::CoreError;
use silhouette_disk::DiskError;
use silhouette_genai::{GenAiError, PollError};
use silhouette_pipeline::PipelineError;
use silhouette_vision::VisionError;
use validator::Validate;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Item",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Item with id 42 not found");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Missing maps to 404 naming the absent record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_singleton_returns_404() {
    let (status, json) = error_to_response(CoreError::Missing("capture data").into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "No capture data found");
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with BAD_REQUEST code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("No video file uploaded".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "No video file uploaded");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400 with VALIDATION_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Prompt is required".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Prompt is required");
}

// ---------------------------------------------------------------------------
// Test: Field validation failures list messages per field
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_fields_are_listed() {
    let input: silhouette_core::item::CreateItem = serde_json::from_value(serde_json::json!({
        "color": "",
        "itemType": "",
        "style": "formal",
        "productLink": "not a url",
        "imageLink": "https://img.example/a.png",
    }))
    .unwrap();
    let errors = input.validate().unwrap_err();

    let (status, json) = error_to_response(errors.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["color"][0], "color is required");
    assert_eq!(json["fields"]["itemType"][0], "itemType is required");
    assert_eq!(
        json["fields"]["productLink"][0],
        "productLink must be a valid URL"
    );
    assert!(json["fields"].get("imageLink").is_none());

    // Keys use the JSON field names only.
    let keys: Vec<&String> = json["fields"].as_object().unwrap().keys().collect();
    assert!(keys.iter().all(|k| !k.contains('_')), "{keys:?}");
}

// ---------------------------------------------------------------------------
// Test: Internal errors are sanitized
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_returns_500_without_leaking_details() {
    let err = AppError::InternalError("db password is hunter2".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
    assert!(json.get("details").is_none());
    assert!(!json.to_string().contains("hunter2"));
}

#[tokio::test]
async fn disk_io_error_is_internal() {
    let err = DiskError::Io {
        path: "/var/lib/silhouette/captures/latest.json".into(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json.to_string().contains("/var/lib"));
}

#[tokio::test]
async fn disk_validation_error_is_bad_request() {
    let err = DiskError::Invalid(CoreError::Validation("Snapshot must not be empty".into()));

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Snapshot must not be empty");
}

// ---------------------------------------------------------------------------
// Test: sqlx::Error::RowNotFound maps to 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sqlx_row_not_found_returns_404() {
    let (status, json) = error_to_response(sqlx::Error::RowNotFound.into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: Provider quota errors map to 429 with retry information
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quota_error_returns_429_with_suggestion() {
    let err = GenAiError::Api {
        status: 429,
        body: common::QUOTA_BODY.into(),
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"], "Quota exceeded");
    assert_eq!(json["code"], "QUOTA_EXCEEDED");
    assert_eq!(json["message"], "You exceeded your current quota.");
    assert_eq!(json["retryAfter"], "27 seconds");
    assert_eq!(json["suggestion"], QUOTA_SUGGESTION);
}

#[tokio::test]
async fn quota_error_without_body_uses_default_message() {
    let err = GenAiError::Api {
        status: 429,
        body: String::new(),
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["message"], "Quota exceeded - Rate limit reached");
    assert!(json["retryAfter"].is_null());
}

// ---------------------------------------------------------------------------
// Test: Other provider statuses pass through
// ---------------------------------------------------------------------------

#[tokio::test]
async fn provider_error_passes_status_through() {
    let err = GenAiError::Api {
        status: 400,
        body: r#"{"error":{"code":400,"message":"API key not valid."}}"#.into(),
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "API request failed");
    assert_eq!(json["code"], "PROVIDER_ERROR");
    assert_eq!(json["message"], "API key not valid.");
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn provider_error_with_odd_status_becomes_bad_gateway() {
    let err = GenAiError::Api {
        status: 302,
        body: "moved".into(),
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["status"], 302);
}

#[tokio::test]
async fn missing_image_returns_500() {
    let (status, json) = error_to_response(GenAiError::NoImage.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "NO_IMAGE");
    assert_eq!(json["error"], "No image generated in response");
}

#[tokio::test]
async fn failed_operation_carries_provider_message() {
    let err = GenAiError::OperationFailed("Prompt was blocked".into());

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "VIDEO_FAILED");
    assert_eq!(json["message"], "Prompt was blocked");
}

// ---------------------------------------------------------------------------
// Test: Video polling outcomes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_timeout_returns_504_with_operation_id() {
    let err = PollError::TimedOut {
        operation_id: "operations/abc".into(),
        attempts: 60,
    };

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["code"], "TIMEOUT");
    assert_eq!(json["operationId"], "operations/abc");
    assert_eq!(json["attempts"], 60);
}

#[tokio::test]
async fn poll_cancel_returns_503() {
    let (status, json) = error_to_response(PollError::Cancelled.into()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "CANCELLED");
}

#[tokio::test]
async fn poll_provider_error_uses_provider_mapping() {
    let err = PollError::Provider(GenAiError::Api {
        status: 429,
        body: common::QUOTA_BODY.into(),
    });

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "QUOTA_EXCEEDED");
}

// ---------------------------------------------------------------------------
// Test: Pipeline, vision and configuration errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_capture_returns_400() {
    let (status, json) = error_to_response(PipelineError::NoCapture.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "NO_CAPTURE");
    assert_eq!(
        json["error"],
        "No capture data found. Please capture an image first."
    );
}

#[tokio::test]
async fn vision_error_returns_analysis_failed() {
    let err = VisionError::Provider("quota".into());

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "ANALYSIS_FAILED");
    assert_eq!(json["error"], "Analysis failed");
    assert_eq!(json["details"], "Vision service error: quota");
}

#[tokio::test]
async fn not_configured_names_the_variable() {
    let (status, json) = error_to_response(AppError::NotConfigured("GEMINI_API_KEY")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "NOT_CONFIGURED");
    assert_eq!(json["error"], "GEMINI_API_KEY is not configured");
}
