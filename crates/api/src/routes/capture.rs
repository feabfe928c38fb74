//! Route definitions for captures.
//!
//! Mounted at `/api/capture`.
//!
//! ```text
//! POST /                  save_capture
//! GET  /latest            latest_capture
//! POST /generate-photo    generate_photo
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::capture;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(capture::save_capture))
        .route("/latest", get(capture::latest_capture))
        .route("/generate-photo", post(capture::generate_photo))
}
