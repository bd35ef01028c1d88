//! Database initialization
//!
//! Creates the database file on first run, applies the schema (idempotent)
//! and seeds the canonical effect-type table.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Canonical effect types seeded on first run: (name, description)
///
/// The table is append-only; names here are never removed.
pub const DEFAULT_EFFECT_TYPES: &[(&str, &str)] = &[
    ("Card", "Card magic and manipulation"),
    ("Coin", "Coin magic and sleight of hand"),
    ("Mentalism", "Mind reading, predictions, and psychological effects"),
    ("Close-Up", "General close-up magic and sleight of hand"),
    ("Stage Magic", "Large-scale illusions and stage presentations"),
    ("Rope", "Rope magic and cutting/restoring effects"),
    ("Silk", "Silk handkerchief magic and vanishing effects"),
    ("Ring", "Ring magic and linking effects"),
    ("Ball", "Ball manipulation and sponge ball magic"),
    ("Paper", "Paper magic, newspaper tricks, and origami effects"),
    ("Money", "Bill magic and currency effects"),
    ("Restoration", "Torn and restored effects"),
    ("Vanish", "Making objects disappear"),
    ("Production", "Making objects appear"),
    ("Transformation", "Changing one object into another"),
    ("Transposition", "Objects changing places"),
    ("Penetration", "Objects passing through solid barriers"),
    ("Levitation", "Objects or people floating in air"),
    ("Prediction", "Foretelling future events or choices"),
    ("Mind Reading", "Revealing thoughts or hidden information"),
    ("General", "Unclassified technique"),
];

/// Open (or create) the database at `db_path` and apply the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    seed_effect_types(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_books_table(pool).await?;
    create_effect_types_table(pool).await?;
    create_tricks_table(pool).await?;
    create_cross_references_table(pool).await?;
    debug!("Schema verified (books, effect_types, tricks, cross_references)");
    Ok(())
}

async fn create_books_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            publication_year INTEGER,
            text_content TEXT NOT NULL,
            char_count INTEGER NOT NULL DEFAULT 0,
            ocr_confidence REAL,
            processed_at TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_effect_types_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS effect_types (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_tricks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tricks (
            id TEXT PRIMARY KEY,
            book_id TEXT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            method TEXT,
            props TEXT NOT NULL DEFAULT '[]',
            effect_type_id TEXT REFERENCES effect_types(id),
            difficulty TEXT NOT NULL
                CHECK (difficulty IN ('Beginner', 'Intermediate', 'Advanced', 'Expert')),
            page_start INTEGER,
            page_end INTEGER,
            confidence REAL NOT NULL CHECK (confidence >= 0.0 AND confidence <= 1.0),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tricks_book ON tricks(book_id, position)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tricks_effect_type ON tricks(effect_type_id)")
        .execute(pool)
        .await?;
    Ok(())
}

async fn create_cross_references_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cross_references (
            source_trick_id TEXT NOT NULL REFERENCES tricks(id) ON DELETE CASCADE,
            target_trick_id TEXT NOT NULL REFERENCES tricks(id) ON DELETE CASCADE,
            relationship_type TEXT NOT NULL CHECK (relationship_type IN (
                'duplicate', 'variation', 'attributed_source', 'related_technique', 'progression'
            )),
            similarity_score REAL NOT NULL
                CHECK (similarity_score >= 0.0 AND similarity_score <= 1.0),
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (source_trick_id, target_trick_id),
            CHECK (source_trick_id <> target_trick_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_cross_references_target ON cross_references(target_trick_id)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert any missing default effect types (by case-insensitive name)
///
/// Returns the number of rows added.
pub async fn seed_effect_types(pool: &SqlitePool) -> Result<u64> {
    let mut added = 0;
    for (name, description) in DEFAULT_EFFECT_TYPES {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO effect_types (id, name, description) VALUES (?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
        added += result.rows_affected();
    }

    if added > 0 {
        info!("Seeded {} effect types", added);
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_schema_is_idempotent() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();

        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["books", "cross_references", "effect_types", "tricks"]);
    }

    #[tokio::test]
    async fn test_seed_effect_types_only_once() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        create_schema(&pool).await.unwrap();

        let first = seed_effect_types(&pool).await.unwrap();
        let second = seed_effect_types(&pool).await.unwrap();

        assert_eq!(first as usize, DEFAULT_EFFECT_TYPES.len());
        assert_eq!(second, 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM effect_types")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count as usize, DEFAULT_EFFECT_TYPES.len());
    }

    #[tokio::test]
    async fn test_effect_type_names_unique_case_insensitive() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        seed_effect_types(&pool).await.unwrap();

        let result = sqlx::query("INSERT INTO effect_types (id, name) VALUES (?, 'card')")
            .bind(Uuid::new_v4().to_string())
            .execute(&pool)
            .await;
        assert!(result.is_err(), "Duplicate name differing only in case must be rejected");
    }
}
