//! Route definitions for outfit recommendations.
//!
//! Mounted at `/api/recommendation`.
//!
//! ```text
//! POST /          recommend
//! POST /photo     recommendation_photo
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::recommendation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(recommendation::recommend))
        .route("/photo", post(recommendation::recommendation_photo))
}
