//! Tests for database initialization and schema bootstrap

use seshy_common::db::init_database;
use seshy_common::ANONYMOUS_PROFILE_ID;

async fn fresh_db(dir: &tempfile::TempDir) -> sqlx::SqlitePool {
    let db_path = dir.path().join("seshy.db");
    init_database(&db_path).await.expect("init_database failed")
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sub").join("seshy.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "database file was not created");
}

#[tokio::test]
async fn test_idempotent_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("seshy.db");

    let pool1 = init_database(&db_path).await.unwrap();
    drop(pool1);

    // Second init must succeed and leave the bootstrap row count unchanged
    let pool2 = init_database(&db_path).await.unwrap();
    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM public_profiles")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(profiles, 1, "bootstrap profile duplicated on re-init");
}

#[tokio::test]
async fn test_anonymous_profile_bootstrapped() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;

    let row: Option<(String, String)> = sqlx::query_as(
        "SELECT username, display_name FROM public_profiles WHERE id = ?",
    )
    .bind(ANONYMOUS_PROFILE_ID.to_string())
    .fetch_optional(&pool)
    .await
    .unwrap();

    let (username, display_name) = row.expect("anonymous profile not created");
    assert_eq!(username, "anonymous");
    assert_eq!(display_name, "Anonymous");
}

#[tokio::test]
async fn test_foreign_keys_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;

    let fk_enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(fk_enabled, 1, "foreign keys should be enabled");
}

#[tokio::test]
async fn test_vibe_slug_uniqueness_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;

    sqlx::query("INSERT INTO vibes (id, name, slug) VALUES ('a', 'First', 'dup-slug')")
        .execute(&pool)
        .await
        .unwrap();

    let duplicate = sqlx::query("INSERT INTO vibes (id, name, slug) VALUES ('b', 'Second', 'dup-slug')")
        .execute(&pool)
        .await;
    assert!(duplicate.is_err(), "duplicate slug insert should fail");
}

#[tokio::test]
async fn test_media_requires_exactly_one_owner() {
    let dir = tempfile::tempdir().unwrap();
    let pool = fresh_db(&dir).await;

    // No owner at all
    let orphan = sqlx::query("INSERT INTO media (id, url) VALUES ('m1', 'http://x/a.png')")
        .execute(&pool)
        .await;
    assert!(orphan.is_err(), "ownerless media row should be rejected");

    // Exactly one owner is fine
    let owned = sqlx::query(
        "INSERT INTO media (id, url, public_profile_id) VALUES ('m2', 'http://x/a.png', ?)",
    )
    .bind(ANONYMOUS_PROFILE_ID.to_string())
    .execute(&pool)
    .await;
    assert!(owned.is_ok(), "single-owner media row rejected: {:?}", owned.err());
}
