//! End-to-end tests for the system vibe seeding reconciler

use seshy_common::db::{init_database, upsert_default_vibes, DEFAULT_VIBES};
use sqlx::SqlitePool;

async fn fresh_db(dir: &tempfile::TempDir) -> SqlitePool {
    let db_path = dir.path().join("seshy.db");
    init_database(&db_path).await.expect("init_database failed")
}

#[derive(Debug, sqlx::FromRow)]
struct VibeRow {
    name: String,
    system_defined: bool,
    is_active: bool,
    deleted_at: Option<chrono::NaiveDateTime>,
}

async fn fetch_vibe(pool: &SqlitePool, slug: &str) -> VibeRow {
    sqlx::query_as("SELECT name, system_defined, is_active, deleted_at FROM vibes WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .expect("vibe row missing")
}

#[tokio::test]
async fn test_fresh_database_inserts_full_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;

    let summary = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(summary.inserted as usize, DEFAULT_VIBES.len());
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.inactivated, 0);

    // Every canonical slug exists, active and system-defined
    for def in DEFAULT_VIBES {
        let row = fetch_vibe(&pool, def.slug).await;
        assert_eq!(row.name, def.name);
        assert!(row.system_defined, "{} not system-defined", def.slug);
        assert!(row.is_active, "{} not active", def.slug);
        assert!(row.deleted_at.is_none());
    }
}

#[tokio::test]
async fn test_second_run_is_all_zero() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;

    upsert_default_vibes(&pool).await.unwrap();
    let second = upsert_default_vibes(&pool).await.unwrap();

    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.inactivated, 0);
}

#[tokio::test]
async fn test_stale_name_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;
    upsert_default_vibes(&pool).await.unwrap();

    sqlx::query("UPDATE vibes SET name = 'Houseparty' WHERE slug = 'house-party'")
        .execute(&pool)
        .await
        .unwrap();

    let summary = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.inserted, 0);

    let row = fetch_vibe(&pool, "house-party").await;
    assert_eq!(row.name, "House Party");
}

#[tokio::test]
async fn test_retired_system_vibe_is_deactivated_not_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;
    upsert_default_vibes(&pool).await.unwrap();

    sqlx::query(
        "INSERT INTO vibes (id, name, slug, category, system_defined, is_active)
         VALUES ('retired-id', 'Retired Tag', 'retired-tag', 4, 1, 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let summary = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(summary.inactivated, 1);
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 0);

    // Row survives: inactive, not soft-deleted
    let row = fetch_vibe(&pool, "retired-tag").await;
    assert!(!row.is_active);
    assert!(row.deleted_at.is_none());
    assert!(row.system_defined);

    // And the deactivation does not repeat
    let again = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(again.inactivated, 0);
}

#[tokio::test]
async fn test_soft_deleted_canonical_vibe_is_undeleted() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;
    upsert_default_vibes(&pool).await.unwrap();

    sqlx::query(
        "UPDATE vibes SET deleted_at = CURRENT_TIMESTAMP, is_active = 0 WHERE slug = 'open-decks'",
    )
    .execute(&pool)
    .await
    .unwrap();

    let summary = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(summary.updated, 1);

    let row = fetch_vibe(&pool, "open-decks").await;
    assert!(row.deleted_at.is_none(), "deleted_at not cleared");
    assert!(row.is_active, "row not reactivated");
}

#[tokio::test]
async fn test_user_vibes_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;
    upsert_default_vibes(&pool).await.unwrap();

    sqlx::query(
        "INSERT INTO vibes (id, name, slug, category, system_defined, is_active)
         VALUES ('user-id', 'My Own Vibe', 'my-own-vibe', 0, 0, 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let summary = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.inactivated, 0);

    let row = fetch_vibe(&pool, "my-own-vibe").await;
    assert_eq!(row.name, "My Own Vibe");
    assert!(!row.system_defined);
    assert!(row.is_active);
    assert!(row.deleted_at.is_none());
}

#[tokio::test]
async fn test_colliding_user_slug_is_claimed() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;

    // A user row squatting on a canonical slug, before any seeding
    sqlx::query(
        "INSERT INTO vibes (id, name, slug, category, system_defined, is_active)
         VALUES ('squatter-id', 'houseparty!!', 'house-party', 0, 0, 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let summary = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(summary.inserted as usize, DEFAULT_VIBES.len() - 1);
    assert_eq!(summary.updated, 1);

    let row = fetch_vibe(&pool, "house-party").await;
    assert!(row.system_defined, "colliding row not claimed");
    assert_eq!(row.name, "House Party");
}

#[tokio::test]
async fn test_idempotence_from_arbitrary_start_state() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;
    upsert_default_vibes(&pool).await.unwrap();

    // Mangle a few rows in different ways
    sqlx::query("UPDATE vibes SET name = 'Wrong' WHERE slug = 'chill-hang'")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE vibes SET deleted_at = CURRENT_TIMESTAMP WHERE slug = 'game-night'")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO vibes (id, name, slug, category, system_defined, is_active)
         VALUES ('old-id', 'Old Tag', 'old-tag', 1, 1, 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let first = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(first.updated, 2);
    assert_eq!(first.inactivated, 1);

    let second = upsert_default_vibes(&pool).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.inactivated, 0);
}
