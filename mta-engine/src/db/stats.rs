//! Corpus statistics

use mta_common::Result;
use sqlx::{Row, SqlitePool};

use crate::models::CorpusStats;

async fn count(pool: &SqlitePool, sql: &str) -> Result<i64> {
    let row = sqlx::query(sql).fetch_one(pool).await?;
    Ok(row.try_get(0)?)
}

pub async fn corpus_stats(pool: &SqlitePool) -> Result<CorpusStats> {
    let by_effect_type = sqlx::query(
        r#"
        SELECT COALESCE(e.name, '(unclassified)') AS effect_name, COUNT(*) AS n
        FROM tricks t
        LEFT JOIN effect_types e ON e.id = t.effect_type_id
        GROUP BY effect_name
        ORDER BY n DESC, effect_name
        "#,
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| -> Result<(String, i64)> {
        Ok((row.try_get("effect_name")?, row.try_get("n")?))
    })
    .collect::<Result<Vec<(String, i64)>>>()?;

    let by_relationship = sqlx::query(
        r#"
        SELECT relationship_type, COUNT(*) AS n
        FROM cross_references
        GROUP BY relationship_type
        ORDER BY relationship_type
        "#,
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(|row| -> Result<(String, i64)> {
        Ok((row.try_get("relationship_type")?, row.try_get("n")?))
    })
    .collect::<Result<Vec<(String, i64)>>>()?;

    Ok(CorpusStats {
        books: count(pool, "SELECT COUNT(*) FROM books").await?,
        processed_books: count(pool, "SELECT COUNT(*) FROM books WHERE processed_at IS NOT NULL")
            .await?,
        tricks: count(pool, "SELECT COUNT(*) FROM tricks").await?,
        cross_references: count(pool, "SELECT COUNT(*) FROM cross_references").await?,
        effect_types: count(pool, "SELECT COUNT(*) FROM effect_types").await?,
        tricks_by_effect_type: by_effect_type,
        cross_references_by_type: by_relationship,
        review_accept: count(pool, "SELECT COUNT(*) FROM tricks WHERE confidence >= 0.85").await?,
        review_review: count(
            pool,
            "SELECT COUNT(*) FROM tricks WHERE confidence >= 0.60 AND confidence < 0.85",
        )
        .await?,
        review_reject: count(pool, "SELECT COUNT(*) FROM tricks WHERE confidence < 0.60").await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_test_db;
    use mta_common::db::DEFAULT_EFFECT_TYPES;

    #[tokio::test]
    async fn test_empty_store_stats() {
        let pool = setup_test_db().await;
        let stats = corpus_stats(&pool).await.unwrap();

        assert_eq!(stats.books, 0);
        assert_eq!(stats.tricks, 0);
        assert_eq!(stats.effect_types, DEFAULT_EFFECT_TYPES.len() as i64);
        assert!(stats.tricks_by_effect_type.is_empty());
    }
}
