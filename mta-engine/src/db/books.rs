//! Book database operations

use chrono::{DateTime, Utc};
use mta_common::{Book, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::parse_uuid;

fn book_from_row(row: &SqliteRow) -> Result<Book> {
    let id: String = row.try_get("id")?;
    let processed_at: Option<String> = row.try_get("processed_at")?;
    let processed_at = processed_at
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::CorruptValue(format!("Invalid processed_at '{}': {}", s, e)))
        })
        .transpose()?;

    Ok(Book {
        id: parse_uuid(&id)?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        publication_year: row.try_get("publication_year")?,
        text_content: row.try_get("text_content")?,
        char_count: row.try_get("char_count")?,
        ocr_confidence: row.try_get("ocr_confidence")?,
        processed_at,
    })
}

/// Insert a new book
pub async fn save_book(pool: &SqlitePool, book: &Book) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO books (id, title, author, publication_year, text_content, char_count,
                           ocr_confidence, processed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(book.id.to_string())
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.publication_year)
    .bind(&book.text_content)
    .bind(book.char_count)
    .bind(book.ocr_confidence)
    .bind(book.processed_at.map(|dt| dt.to_rfc3339()))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn load_book(pool: &SqlitePool, id: Uuid) -> Result<Option<Book>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, author, publication_year, text_content, char_count,
               ocr_confidence, processed_at
        FROM books
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(book_from_row).transpose()
}

/// All books ordered by title, then id
pub async fn list_books(pool: &SqlitePool) -> Result<Vec<Book>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, author, publication_year, text_content, char_count,
               ocr_confidence, processed_at
        FROM books
        ORDER BY title, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(book_from_row).collect()
}

/// Replace a book's text and clear its processed timestamp
///
/// Returns false when the book does not exist.
pub async fn replace_book_text(conn: &mut SqliteConnection, id: Uuid, text: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE books
        SET text_content = ?, char_count = ?, processed_at = NULL, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(text)
    .bind(text.chars().count() as i64)
    .bind(id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn mark_processed(
    conn: &mut SqliteConnection,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE books SET processed_at = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(at.to_rfc3339())
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(())
}
