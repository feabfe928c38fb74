//! Integration tests for the PostgreSQL item repository.
//!
//! These need a live database (`DATABASE_URL`) and are ignored by default:
//! run them with `cargo test -p silhouette-db -- --ignored`.

use silhouette_core::item::{CreateItem, ItemFilter, MatchMode, FIND_LIMIT};
use silhouette_db::repositories::ItemRepo;
use sqlx::PgPool;

fn new_item(color: &str, style: &str, item_type: &str) -> CreateItem {
    CreateItem {
        color: color.to_string(),
        item_type: item_type.to_string(),
        style: style.to_string(),
        product_link: "https://shop.example.com/product/1".to_string(),
        image_link: "https://cdn.example.com/product/1.jpg".to_string(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_get_delete_round_trip(pool: PgPool) {
    let created = ItemRepo::create(&pool, &new_item("navy", "formal", "tops"))
        .await
        .unwrap();
    assert!(created.id > 0);

    let fetched = ItemRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    assert!(ItemRepo::delete(&pool, created.id).await.unwrap());
    assert!(ItemRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
    assert!(!ItemRepo::delete(&pool, created.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_is_newest_first(pool: PgPool) {
    for color in ["red", "green", "blue"] {
        ItemRepo::create(&pool, &new_item(color, "active", "shoes"))
            .await
            .unwrap();
    }

    let items = ItemRepo::list(&pool).await.unwrap();
    assert_eq!(items.len(), 3);
    assert!(items
        .windows(2)
        .all(|w| (w[0].created_at, w[0].id) >= (w[1].created_at, w[1].id)));
    assert_eq!(items[0].color, "blue");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn find_color_is_case_insensitive_substring(pool: PgPool) {
    ItemRepo::create(&pool, &new_item("blue denim", "streetwear", "bottoms"))
        .await
        .unwrap();
    ItemRepo::create(&pool, &new_item("red", "formal", "tops"))
        .await
        .unwrap();

    let filter = ItemFilter {
        color: Some("Blue".into()),
        ..Default::default()
    };
    let found = ItemRepo::find(&pool, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].color, "blue denim");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn find_all_mode_requires_every_field(pool: PgPool) {
    ItemRepo::create(&pool, &new_item("black", "formal", "shoes"))
        .await
        .unwrap();
    ItemRepo::create(&pool, &new_item("black", "active", "shoes"))
        .await
        .unwrap();

    let filter = ItemFilter {
        style: Some("formal".into()),
        item_type: Some("shoes".into()),
        mode: MatchMode::All,
        ..Default::default()
    };
    let found = ItemRepo::find(&pool, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].style, "formal");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn find_is_capped(pool: PgPool) {
    for _ in 0..(FIND_LIMIT + 3) {
        ItemRepo::create(&pool, &new_item("grey", "formal", "tops"))
            .await
            .unwrap();
    }
    let found = ItemRepo::find(&pool, &ItemFilter::default()).await.unwrap();
    assert_eq!(found.len(), FIND_LIMIT);
}
