//! Shared response types for API handlers.
//!
//! JSON responses use a `{ "data": ... }` envelope via [`DataResponse`].
//! Binary media downloads go through [`attachment`].

use axum::body::{Body, Bytes};
use axum::http::header;
use axum::response::Response;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Body of a successful delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub ok: bool,
}

/// File extension for a generated media MIME type.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        _ => "bin",
    }
}

/// A binary download named `generated_<kind>_<millis>.<ext>`.
pub fn attachment(bytes: impl Into<Bytes>, mime_type: &str, kind: &str) -> AppResult<Response> {
    let bytes: Bytes = bytes.into();
    let file_name = format!(
        "generated_{kind}_{}.{}",
        chrono::Utc::now().timestamp_millis(),
        extension_for(mime_type),
    );

    Response::builder()
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::InternalError(format!("Failed to build download response: {e}")))
}
