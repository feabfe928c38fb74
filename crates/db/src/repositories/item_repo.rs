//! Repository for the `items` table.
//!
//! Items are append/delete only: there is deliberately no update method.

use silhouette_core::item::{CreateItem, ItemFilter, MatchMode, FIND_LIMIT};
use silhouette_core::types::DbId;
use sqlx::PgPool;

use crate::models::item::Item;

/// Column list for `items` queries.
const ITEM_COLUMNS: &str = "\
    id, color, item_type, style, product_link, image_link, created_at, updated_at";

/// Provides create/list/find/delete operations for clothing items.
pub struct ItemRepo;

impl ItemRepo {
    /// Insert a validated item, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateItem) -> Result<Item, sqlx::Error> {
        let query = format!(
            "INSERT INTO items (color, item_type, style, product_link, image_link) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(&input.color)
            .bind(&input.item_type)
            .bind(&input.style)
            .bind(&input.product_link)
            .bind(&input.image_link)
            .fetch_one(pool)
            .await
    }

    /// List all items, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Item>, sqlx::Error> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Item>(&query).fetch_all(pool).await
    }

    /// Find an item by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Filtered lookup, newest first, capped at [`FIND_LIMIT`].
    ///
    /// `color` is a case-insensitive substring match (`ILIKE`), `style` and
    /// `item_type` are exact.
    pub async fn find(pool: &PgPool, filter: &ItemFilter) -> Result<Vec<Item>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(color) = filter.color() {
            binds.push(format!("%{}%", escape_like(color)));
            conditions.push(format!("color ILIKE ${} ESCAPE '\\'", binds.len()));
        }
        if let Some(style) = filter.style() {
            binds.push(style.to_string());
            conditions.push(format!("style = ${}", binds.len()));
        }
        if let Some(item_type) = filter.item_type() {
            binds.push(item_type.to_string());
            conditions.push(format!("item_type = ${}", binds.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            let joiner = match filter.mode {
                MatchMode::Any => " OR ",
                MatchMode::All => " AND ",
            };
            format!("WHERE {}", conditions.join(joiner))
        };

        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM items {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT {FIND_LIMIT}"
        );

        let mut q = sqlx::query_as::<_, Item>(&query);
        for value in &binds {
            q = q.bind(value);
        }
        q.fetch_all(pool).await
    }
}

/// Escape `%`, `_` and `\` so user input is matched literally by `LIKE`.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
