//! Route definitions for the item catalogue.
//!
//! Mounted at `/items`.
//!
//! ```text
//! GET    /          list_items (or filtered lookup with ?color=&style=&itemType=&match=)
//! POST   /          create_item
//! GET    /{id}      get_item
//! DELETE /{id}      delete_item
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::items;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(items::list_items).post(items::create_item))
        .route("/{id}", get(items::get_item).delete(items::delete_item))
}
