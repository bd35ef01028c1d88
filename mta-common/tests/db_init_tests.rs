//! Database initialization tests against an on-disk file

use mta_common::db::{init_database, DEFAULT_EFFECT_TYPES};
use tempfile::TempDir;

#[tokio::test]
async fn test_init_database_creates_file_and_seeds() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("magic_tricks.db");

    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM effect_types")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count as usize, DEFAULT_EFFECT_TYPES.len());
}

#[tokio::test]
async fn test_reopen_preserves_effect_type_ids() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("magic_tricks.db");

    let pool = init_database(&db_path).await.unwrap();
    let first: String = sqlx::query_scalar("SELECT id FROM effect_types WHERE name = 'Card'")
        .fetch_one(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let second: String = sqlx::query_scalar("SELECT id FROM effect_types WHERE name = 'Card'")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(first, second, "Seeding must be append-only");
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("magic_tricks.db")).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO tricks (id, book_id, position, name, description, difficulty, confidence)
         VALUES ('t1', 'missing-book', 0, 'Orphan', 'desc', 'Beginner', 0.5)",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Trick must belong to an existing book");
}
