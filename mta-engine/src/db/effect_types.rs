//! Effect-type catalog operations
//!
//! The table is append-only: rows are added, never renamed or removed.

use mta_common::{EffectType, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::parse_uuid;
use crate::models::EffectTypeCatalog;

pub async fn list_effect_types(pool: &SqlitePool) -> Result<Vec<EffectType>> {
    let rows = sqlx::query("SELECT id, name FROM effect_types ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<EffectType> {
            let id: String = row.try_get("id")?;
            Ok(EffectType {
                id: parse_uuid(&id)?,
                name: row.try_get("name")?,
            })
        })
        .collect()
}

/// Snapshot the current table for one extraction run
pub async fn load_catalog(pool: &SqlitePool) -> Result<EffectTypeCatalog> {
    let types = list_effect_types(pool).await?;
    tracing::debug!(count = types.len(), "Loaded effect-type catalog");
    Ok(EffectTypeCatalog::new(types))
}

/// Append an effect type, returning the existing row when the name is taken
///
/// Names compare case-insensitively.
pub async fn append_effect_type(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
) -> Result<EffectType> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Effect type name must not be empty".to_string()));
    }

    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO effect_types (id, name, description) VALUES (?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .bind(description)
    .execute(pool)
    .await?
    .rows_affected();

    let row = sqlx::query("SELECT id, name FROM effect_types WHERE name = ? COLLATE NOCASE")
        .bind(name)
        .fetch_one(pool)
        .await?;
    let id: String = row.try_get("id")?;
    let effect_type = EffectType {
        id: parse_uuid(&id)?,
        name: row.try_get("name")?,
    };

    if inserted > 0 {
        tracing::info!(name = %effect_type.name, "Effect type added");
    }

    Ok(effect_type)
}
