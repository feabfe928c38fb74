//! Route definitions for body-part preferences and the style vibe.
//!
//! Mounted at `/api/preferences`.
//!
//! ```text
//! POST /                      save_preferences
//! GET  /latest                latest_preferences
//! POST /style-vibe            save_style_vibe
//! GET  /style-vibe/latest     latest_style_vibe
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::preferences;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(preferences::save_preferences))
        .route("/latest", get(preferences::latest_preferences))
        .route("/style-vibe", post(preferences::save_style_vibe))
        .route("/style-vibe/latest", get(preferences::latest_style_vibe))
}
