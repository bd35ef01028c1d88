//! Database access for mta-engine
//!
//! Schema creation and effect-type seeding live in `mta_common::db`; this
//! module holds the engine's queries. Multi-statement writes take a
//! `&mut SqliteConnection` so callers can compose them inside one transaction.

pub mod books;
pub mod cross_references;
pub mod effect_types;
pub mod stats;
pub mod tricks;

use mta_common::{Error, Result};
use uuid::Uuid;

/// Parse a TEXT primary/foreign key column
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| Error::CorruptValue(format!("Invalid UUID '{}' in database: {}", value, e)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use mta_common::db::create_schema;
    use mta_common::db::seed_effect_types;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// Fresh in-memory database with schema and seeded effect types
    pub async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        seed_effect_types(&pool).await.unwrap();
        pool
    }
}
