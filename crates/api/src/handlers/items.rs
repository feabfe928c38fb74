//! Handlers for the `/items` resource.
//!
//! Items are append/delete only; there is no update.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use silhouette_core::error::CoreError;
use silhouette_core::item::{CreateItem, ItemFilter};
use silhouette_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::{DataResponse, Deleted};
use crate::state::AppState;

/// POST /items
pub async fn create_item(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateItem>,
) -> AppResult<impl IntoResponse> {
    let input = input.into_validated()?;
    let item = state.items.create(&input).await?;

    tracing::info!(
        item_id = item.id,
        item_type = %item.item_type,
        style = %item.style,
        "Item created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /items
///
/// Without filter fields this lists every item newest first. With any of
/// `color`, `style`, `itemType` it runs a capped filtered lookup, combined
/// per `match=any|all`.
pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> AppResult<impl IntoResponse> {
    let items = if filter.is_empty() {
        state.items.list().await?
    } else {
        state.items.find(&filter).await?
    };
    Ok(Json(DataResponse { data: items }))
}

/// GET /items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = state
        .items
        .find_by_id(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Item", id }))?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !state.items.delete(id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Item", id }));
    }

    tracing::info!(item_id = id, "Item deleted");
    Ok(Json(DataResponse {
        data: Deleted { ok: true },
    }))
}
