//! Cross-reference edge operations
//!
//! Edges for a scope are replaced, never merged: every edge touching a trick
//! in the scope is deleted and the freshly computed set inserted, all in one
//! transaction.

use mta_common::{CrossReference, RelationshipType, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::parse_uuid;
use crate::models::RecomputeScope;

fn edge_from_row(row: &SqliteRow) -> Result<CrossReference> {
    let source: String = row.try_get("source_trick_id")?;
    let target: String = row.try_get("target_trick_id")?;
    let relationship: String = row.try_get("relationship_type")?;

    Ok(CrossReference {
        source_trick_id: parse_uuid(&source)?,
        target_trick_id: parse_uuid(&target)?,
        relationship_type: relationship.parse::<RelationshipType>()?,
        similarity_score: row.try_get("similarity_score")?,
        notes: row.try_get("notes")?,
    })
}

/// Swap the edge set of `scope` for `edges` atomically
///
/// Returns the number of edges removed.
pub async fn replace_cross_references(
    pool: &SqlitePool,
    scope: &RecomputeScope,
    edges: &[CrossReference],
) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let removed = delete_scope(&mut *tx, scope).await?;
    insert_edges(&mut *tx, edges).await?;
    tx.commit().await?;

    debug!(
        scope = %scope,
        removed,
        inserted = edges.len(),
        "Replaced cross-references"
    );

    Ok(removed)
}

async fn delete_scope(conn: &mut SqliteConnection, scope: &RecomputeScope) -> Result<u64> {
    let result = match scope {
        RecomputeScope::All => {
            sqlx::query("DELETE FROM cross_references")
                .execute(&mut *conn)
                .await?
        }
        RecomputeScope::Book(book_id) => {
            sqlx::query(
                r#"
                DELETE FROM cross_references
                WHERE source_trick_id IN (SELECT id FROM tricks WHERE book_id = ?)
                   OR target_trick_id IN (SELECT id FROM tricks WHERE book_id = ?)
                "#,
            )
            .bind(book_id.to_string())
            .bind(book_id.to_string())
            .execute(&mut *conn)
            .await?
        }
        RecomputeScope::Trick(trick_id) => {
            sqlx::query(
                "DELETE FROM cross_references WHERE source_trick_id = ? OR target_trick_id = ?",
            )
            .bind(trick_id.to_string())
            .bind(trick_id.to_string())
            .execute(&mut *conn)
            .await?
        }
    };

    Ok(result.rows_affected())
}

async fn insert_edges(conn: &mut SqliteConnection, edges: &[CrossReference]) -> Result<()> {
    for edge in edges {
        sqlx::query(
            r#"
            INSERT INTO cross_references
                (source_trick_id, target_trick_id, relationship_type, similarity_score, notes)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(edge.source_trick_id.to_string())
        .bind(edge.target_trick_id.to_string())
        .bind(edge.relationship_type.as_str())
        .bind(edge.similarity_score)
        .bind(&edge.notes)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Every edge, ordered by (source, target)
pub async fn load_all_cross_references(pool: &SqlitePool) -> Result<Vec<CrossReference>> {
    let rows = sqlx::query(
        r#"
        SELECT source_trick_id, target_trick_id, relationship_type, similarity_score, notes
        FROM cross_references
        ORDER BY source_trick_id, target_trick_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(edge_from_row).collect()
}

/// Edges where the trick is source or target, ordered by (source, target)
pub async fn load_cross_references_for_trick(
    pool: &SqlitePool,
    trick_id: Uuid,
) -> Result<Vec<CrossReference>> {
    let rows = sqlx::query(
        r#"
        SELECT source_trick_id, target_trick_id, relationship_type, similarity_score, notes
        FROM cross_references
        WHERE source_trick_id = ? OR target_trick_id = ?
        ORDER BY source_trick_id, target_trick_id
        "#,
    )
    .bind(trick_id.to_string())
    .bind(trick_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(edge_from_row).collect()
}
