//! Trick database operations
//!
//! A book's trick set is only ever replaced wholesale: delete-then-insert
//! inside one transaction, so a failure leaves the previous set in place.

use mta_common::{Difficulty, Error, PageRange, Result, Trick};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::parse_uuid;
use crate::models::CorpusEntry;

const TRICK_COLUMNS: &str = "t.id, t.book_id, t.name, t.description, t.method, t.props, \
     t.effect_type_id, t.difficulty, t.page_start, t.page_end, t.confidence";

fn trick_from_row(row: &SqliteRow) -> Result<Trick> {
    let id: String = row.try_get("id")?;
    let book_id: String = row.try_get("book_id")?;
    let effect_type_id: Option<String> = row.try_get("effect_type_id")?;
    let difficulty: String = row.try_get("difficulty")?;
    let props: String = row.try_get("props")?;
    let page_start: Option<i64> = row.try_get("page_start")?;
    let page_end: Option<i64> = row.try_get("page_end")?;

    let props: Vec<String> = serde_json::from_str(&props)
        .map_err(|e| Error::CorruptValue(format!("Invalid props JSON for trick {}: {}", id, e)))?;
    let page_range = page_start.map(|start| {
        PageRange::new(
            u32::try_from(start).unwrap_or(1),
            page_end.and_then(|end| u32::try_from(end).ok()),
        )
    });

    Ok(Trick {
        id: parse_uuid(&id)?,
        book_id: parse_uuid(&book_id)?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        method: row.try_get("method")?,
        props,
        effect_type_id: effect_type_id.as_deref().map(parse_uuid).transpose()?,
        difficulty: difficulty.parse::<Difficulty>()?,
        page_range,
        confidence: row.try_get("confidence")?,
    })
}

/// Replace every trick of a book, and the edges touching them, in one transaction
pub async fn replace_tricks_for_book(
    pool: &SqlitePool,
    book_id: Uuid,
    tricks: &[Trick],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    replace_tricks_in(&mut *tx, book_id, tricks).await?;
    tx.commit().await?;
    Ok(())
}

/// Delete-then-insert on an open connection (normally a transaction)
///
/// Slice order becomes the stored position. Returns the number of tricks removed.
pub async fn replace_tricks_in(
    conn: &mut SqliteConnection,
    book_id: Uuid,
    tricks: &[Trick],
) -> Result<u64> {
    let book = book_id.to_string();

    let edges_removed = sqlx::query(
        r#"
        DELETE FROM cross_references
        WHERE source_trick_id IN (SELECT id FROM tricks WHERE book_id = ?)
           OR target_trick_id IN (SELECT id FROM tricks WHERE book_id = ?)
        "#,
    )
    .bind(&book)
    .bind(&book)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let removed = sqlx::query("DELETE FROM tricks WHERE book_id = ?")
        .bind(&book)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    for (position, trick) in tricks.iter().enumerate() {
        if trick.book_id != book_id {
            return Err(Error::InvalidInput(format!(
                "Trick {} belongs to book {}, not {}",
                trick.id, trick.book_id, book_id
            )));
        }

        let props = serde_json::to_string(&trick.props)?;

        sqlx::query(
            r#"
            INSERT INTO tricks (id, book_id, position, name, description, method, props,
                                effect_type_id, difficulty, page_start, page_end, confidence)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trick.id.to_string())
        .bind(&book)
        .bind(position as i64)
        .bind(&trick.name)
        .bind(&trick.description)
        .bind(&trick.method)
        .bind(props)
        .bind(trick.effect_type_id.map(|id| id.to_string()))
        .bind(trick.difficulty.as_str())
        .bind(trick.page_range.map(|r| i64::from(r.start)))
        .bind(trick.page_range.and_then(|r| r.end).map(i64::from))
        .bind(trick.confidence)
        .execute(&mut *conn)
        .await?;
    }

    debug!(
        book_id = %book_id,
        removed,
        edges_removed,
        inserted = tricks.len(),
        "Replaced trick set"
    );

    Ok(removed)
}

/// Tricks of one book in stored order
pub async fn load_tricks_for_book(pool: &SqlitePool, book_id: Uuid) -> Result<Vec<Trick>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM tricks t WHERE t.book_id = ? ORDER BY t.position",
        TRICK_COLUMNS
    ))
    .bind(book_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(trick_from_row).collect()
}

pub async fn load_trick(pool: &SqlitePool, id: Uuid) -> Result<Option<Trick>> {
    let row = sqlx::query(&format!("SELECT {} FROM tricks t WHERE t.id = ?", TRICK_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(trick_from_row).transpose()
}

/// Every trick joined with its book, ordered by trick id
pub async fn load_corpus(pool: &SqlitePool) -> Result<Vec<CorpusEntry>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}, b.title AS book_title, b.author AS author, b.publication_year AS publication_year
        FROM tricks t
        JOIN books b ON b.id = t.book_id
        ORDER BY t.id
        "#,
        TRICK_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<CorpusEntry> {
            Ok(CorpusEntry {
                trick: trick_from_row(row)?,
                book_title: row.try_get("book_title")?,
                author: row.try_get("author")?,
                publication_year: row.try_get("publication_year")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::books::save_book;
    use crate::db::effect_types::load_catalog;
    use crate::db::test_support::setup_test_db;
    use mta_common::Book;

    fn trick(book_id: Uuid, name: &str, effect_type_id: Uuid) -> Trick {
        Trick {
            id: Uuid::new_v4(),
            book_id,
            name: name.to_string(),
            description: format!("{} description", name),
            method: Some("Secret move".to_string()),
            props: vec!["Cards".to_string(), "Wand".to_string()],
            effect_type_id: Some(effect_type_id),
            difficulty: Difficulty::Advanced,
            page_range: Some(PageRange::new(4, Some(6))),
            confidence: 0.75,
        }
    }

    #[tokio::test]
    async fn test_replace_and_load_round_trip() {
        let pool = setup_test_db().await;
        let card = load_catalog(&pool).await.unwrap().get_exact("Card").unwrap().id;
        let book = Book::new("Book", "Author", "text");
        save_book(&pool, &book).await.unwrap();

        let tricks = vec![trick(book.id, "First", card), trick(book.id, "Second", card)];
        replace_tricks_for_book(&pool, book.id, &tricks).await.unwrap();

        let loaded = load_tricks_for_book(&pool, book.id).await.unwrap();
        assert_eq!(loaded, tricks);
        assert_eq!(load_trick(&pool, tricks[1].id).await.unwrap(), Some(tricks[1].clone()));
    }

    #[tokio::test]
    async fn test_replace_discards_previous_set() {
        let pool = setup_test_db().await;
        let card = load_catalog(&pool).await.unwrap().get_exact("Card").unwrap().id;
        let book = Book::new("Book", "Author", "text");
        save_book(&pool, &book).await.unwrap();

        replace_tricks_for_book(&pool, book.id, &[trick(book.id, "Old", card)])
            .await
            .unwrap();
        let new_set = vec![trick(book.id, "New", card)];
        replace_tricks_for_book(&pool, book.id, &new_set).await.unwrap();

        assert_eq!(load_tricks_for_book(&pool, book.id).await.unwrap(), new_set);
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back() {
        let pool = setup_test_db().await;
        let card = load_catalog(&pool).await.unwrap().get_exact("Card").unwrap().id;
        let book = Book::new("Book", "Author", "text");
        save_book(&pool, &book).await.unwrap();

        let original = vec![trick(book.id, "Original", card)];
        replace_tricks_for_book(&pool, book.id, &original).await.unwrap();

        // Unknown effect type violates the foreign key on the second insert
        let broken = vec![trick(book.id, "Good", card), trick(book.id, "Bad", Uuid::new_v4())];
        assert!(replace_tricks_for_book(&pool, book.id, &broken).await.is_err());

        assert_eq!(load_tricks_for_book(&pool, book.id).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_load_corpus_joins_book_data() {
        let pool = setup_test_db().await;
        let card = load_catalog(&pool).await.unwrap().get_exact("Card").unwrap().id;
        let mut book = Book::new("Stars of Magic", "Dai Vernon", "text");
        book.publication_year = Some(1946);
        save_book(&pool, &book).await.unwrap();
        replace_tricks_for_book(&pool, book.id, &[trick(book.id, "Trick", card)])
            .await
            .unwrap();

        let corpus = load_corpus(&pool).await.unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].author, "Dai Vernon");
        assert_eq!(corpus[0].book_title, "Stars of Magic");
        assert_eq!(corpus[0].publication_year, Some(1946));
    }
}
