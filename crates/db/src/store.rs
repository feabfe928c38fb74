//! The [`ItemStore`] seam between the HTTP layer and item persistence.

use async_trait::async_trait;
use chrono::Utc;
use silhouette_core::item::{CreateItem, ItemFilter, FIND_LIMIT};
use silhouette_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::item::Item;
use crate::repositories::ItemRepo;
use crate::DbPool;

/// Item catalogue operations. Inputs are validated by the caller.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn create(&self, input: &CreateItem) -> Result<Item, sqlx::Error>;

    /// All items, newest first.
    async fn list(&self) -> Result<Vec<Item>, sqlx::Error>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Item>, sqlx::Error>;

    /// Returns `false` when no item had that ID.
    async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error>;

    /// Filtered lookup, newest first, capped at [`FIND_LIMIT`].
    async fn find(&self, filter: &ItemFilter) -> Result<Vec<Item>, sqlx::Error>;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// [`ItemStore`] backed by the `items` table.
pub struct PgItemStore {
    pool: DbPool,
}

impl PgItemStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, input: &CreateItem) -> Result<Item, sqlx::Error> {
        ItemRepo::create(&self.pool, input).await
    }

    async fn list(&self) -> Result<Vec<Item>, sqlx::Error> {
        ItemRepo::list(&self.pool).await
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        ItemRepo::find_by_id(&self.pool, id).await
    }

    async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error> {
        ItemRepo::delete(&self.pool, id).await
    }

    async fn find(&self, filter: &ItemFilter) -> Result<Vec<Item>, sqlx::Error> {
        ItemRepo::find(&self.pool, filter).await
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local [`ItemStore`] used when no database is configured.
///
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryItemStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: DbId,
    /// Kept in insertion order, which is creation order.
    items: Vec<Item>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, input: &CreateItem) -> Result<Item, sqlx::Error> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = Utc::now();
        let item = Item {
            id: inner.next_id,
            color: input.color.clone(),
            item_type: input.item_type.clone(),
            style: input.style.clone(),
            product_link: input.product_link.clone(),
            image_link: input.image_link.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.items.push(item.clone());
        Ok(item)
    }

    async fn list(&self) -> Result<Vec<Item>, sqlx::Error> {
        Ok(self.inner.read().await.items.iter().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        Ok(self
            .inner
            .read()
            .await
            .items
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn delete(&self, id: DbId) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.write().await;
        let before = inner.items.len();
        inner.items.retain(|i| i.id != id);
        Ok(inner.items.len() < before)
    }

    async fn find(&self, filter: &ItemFilter) -> Result<Vec<Item>, sqlx::Error> {
        Ok(self
            .inner
            .read()
            .await
            .items
            .iter()
            .rev()
            .filter(|i| filter.matches(&i.color, &i.style, &i.item_type))
            .take(FIND_LIMIT)
            .cloned()
            .collect())
    }
}
