//! Clothing item model.

use serde::Serialize;
use silhouette_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `items` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: DbId,
    pub color: String,
    pub item_type: String,
    pub style: String,
    pub product_link: String,
    pub image_link: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
