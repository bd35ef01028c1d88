//! Trick engine
//!
//! Async facade over the pure pipelines and the SQLite store. Writes to one
//! book's trick set are serialized through a per-book lock; different books
//! proceed in parallel. Cross-reference recomputes stage the full edge set
//! before a single atomic swap, so cancellation never leaves partial edges.

use chrono::Utc;
use mta_common::{Book, CrossReference, EffectType, Error, Trick};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::db;
use crate::error::{EngineError, EngineResult};
use crate::models::{CorpusStats, EffectTypeCatalog, RecomputeScope};
use crate::utils::retry_on_lock;
use crate::workflow::{compute_cross_references, ExtractionPipeline, ExtractionReport};

/// Bibliographic data and text for a book entering the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_year: Option<i32>,
    pub ocr_confidence: Option<f64>,
    pub text: String,
}

/// Trick extraction and cross-referencing engine
#[derive(Clone)]
pub struct TrickEngine {
    db: SqlitePool,
    config: Arc<EngineConfig>,
    pipeline: Arc<ExtractionPipeline>,
    /// Per-book write locks, created on first use
    book_locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl TrickEngine {
    pub fn new(db: SqlitePool, config: EngineConfig) -> Self {
        let pipeline = ExtractionPipeline::new(&config);
        Self {
            db,
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            book_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn lock_book(&self, book_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.book_locks.lock().await;
            locks.entry(book_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    async fn require_book(&self, book_id: Uuid) -> EngineResult<Book> {
        db::books::load_book(&self.db, book_id)
            .await?
            .ok_or(EngineError::BookNotFound(book_id))
    }

    /// Register a book; its text is stored but not yet extracted
    pub async fn register_book(&self, new_book: NewBook) -> EngineResult<Book> {
        if new_book.title.trim().is_empty() || new_book.author.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "Book title and author must not be empty".to_string(),
            ));
        }
        if let Some(confidence) = new_book.ocr_confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(EngineError::InvalidInput(format!(
                    "OCR confidence {} outside [0, 1]",
                    confidence
                )));
            }
        }

        let mut book = Book::new(new_book.title.trim(), new_book.author.trim(), new_book.text);
        book.publication_year = new_book.publication_year;
        book.ocr_confidence = new_book.ocr_confidence;

        db::books::save_book(&self.db, &book).await?;
        info!(book_id = %book.id, title = %book.title, chars = book.char_count, "Book registered");

        Ok(book)
    }

    pub async fn get_book(&self, book_id: Uuid) -> EngineResult<Book> {
        self.require_book(book_id).await
    }

    pub async fn list_books(&self) -> EngineResult<Vec<Book>> {
        Ok(db::books::list_books(&self.db).await?)
    }

    /// Extract tricks from `text` and replace the book's trick set
    ///
    /// Uses a fresh snapshot of the effect-type table. Text below the
    /// minimum length returns an empty list and writes nothing.
    pub async fn extract(&self, book_id: Uuid, text: &str) -> EngineResult<Vec<Trick>> {
        let catalog = db::effect_types::load_catalog(&self.db).await?;
        self.extract_with_catalog(book_id, text, &catalog).await
    }

    /// Extract from the text already stored for the book
    pub async fn extract_stored(&self, book_id: Uuid) -> EngineResult<Vec<Trick>> {
        let book = self.require_book(book_id).await?;
        self.extract(book_id, &book.text_content).await
    }

    /// [`extract`](Self::extract) against a caller-supplied catalog snapshot
    pub async fn extract_with_catalog(
        &self,
        book_id: Uuid,
        text: &str,
        catalog: &EffectTypeCatalog,
    ) -> EngineResult<Vec<Trick>> {
        let _guard = self.lock_book(book_id).await;
        self.require_book(book_id).await?;

        let report = self.pipeline.run(text, catalog);
        if report.too_short {
            info!(book_id = %book_id, "Text below minimum length; nothing extracted");
            return Ok(Vec::new());
        }

        let tricks = self.persist_report(book_id, report, None).await?;
        Ok(tricks)
    }

    /// Replace a book's text, then re-extract its tricks
    ///
    /// Old tricks and every edge touching them are removed in the same
    /// transaction that stores the new text and trick set.
    pub async fn reprocess_book(&self, book_id: Uuid, new_text: &str) -> EngineResult<Vec<Trick>> {
        let _guard = self.lock_book(book_id).await;
        self.require_book(book_id).await?;

        let catalog = db::effect_types::load_catalog(&self.db).await?;
        let report = self.pipeline.run(new_text, &catalog);

        self.persist_report(book_id, report, Some(new_text)).await
    }

    async fn persist_report(
        &self,
        book_id: Uuid,
        report: ExtractionReport,
        new_text: Option<&str>,
    ) -> EngineResult<Vec<Trick>> {
        let rejected = report.outcome.rejected.len();
        let tricks: Vec<Trick> = report
            .outcome
            .accepted
            .into_iter()
            .map(|draft| draft.into_trick(book_id))
            .collect();

        let too_short = report.too_short;
        let trick_set = tricks.as_slice();
        let removed = retry_on_lock(
            "store trick set",
            self.config.extraction.max_lock_wait_ms,
            || self.write_trick_set(book_id, trick_set, new_text, too_short),
        )
        .await
        .map_err(|e| match e {
            Error::NotFound { .. } => EngineError::BookNotFound(book_id),
            other => EngineError::Common(other),
        })?;

        info!(
            book_id = %book_id,
            candidates = report.candidates,
            accepted = tricks.len(),
            rejected,
            replaced = removed,
            "Trick set stored"
        );

        Ok(tricks)
    }

    /// One transaction: optional text replacement, trick swap, processed stamp
    async fn write_trick_set(
        &self,
        book_id: Uuid,
        tricks: &[Trick],
        new_text: Option<&str>,
        too_short: bool,
    ) -> mta_common::Result<u64> {
        let mut tx = self.db.begin().await?;
        if let Some(text) = new_text {
            if !db::books::replace_book_text(&mut *tx, book_id, text).await? {
                return Err(Error::not_found("book", book_id));
            }
        }
        let removed = db::tricks::replace_tricks_in(&mut *tx, book_id, tricks).await?;
        if !too_short {
            db::books::mark_processed(&mut *tx, book_id, Utc::now()).await?;
        }
        tx.commit().await?;
        Ok(removed)
    }

    pub async fn tricks_for_book(&self, book_id: Uuid) -> EngineResult<Vec<Trick>> {
        self.require_book(book_id).await?;
        Ok(db::tricks::load_tricks_for_book(&self.db, book_id).await?)
    }

    /// Recompute and swap the cross-reference edges of `scope`
    ///
    /// Returns every edge touching the scope. Cancelling `cancel` before the
    /// swap yields [`EngineError::RecomputeAborted`] with the store unchanged.
    /// Only the scope's own book is locked; if another book's tricks are
    /// replaced between the corpus read and the swap, the swap is rejected
    /// and the recompute runs once more against a fresh corpus.
    pub async fn recompute_cross_references(
        &self,
        scope: RecomputeScope,
        cancel: &CancellationToken,
    ) -> EngineResult<Vec<CrossReference>> {
        let _guard = match scope {
            RecomputeScope::All => None,
            RecomputeScope::Book(book_id) => {
                self.require_book(book_id).await?;
                Some(self.lock_book(book_id).await)
            }
            RecomputeScope::Trick(trick_id) => {
                let trick = db::tricks::load_trick(&self.db, trick_id)
                    .await?
                    .ok_or(EngineError::TrickNotFound(trick_id))?;
                Some(self.lock_book(trick.book_id).await)
            }
        };

        let mut refreshed = false;
        loop {
            let corpus = db::tricks::load_corpus(&self.db).await?;
            let token = cancel.clone();
            let edges = tokio::task::spawn_blocking(move || {
                compute_cross_references(&corpus, &scope, &token)
            })
            .await
            .map_err(|e| Error::Internal(format!("Cross-reference task failed: {}", e)))??;

            if cancel.is_cancelled() {
                warn!(scope = %scope, "Recompute cancelled before swap; store unchanged");
                return Err(EngineError::RecomputeAborted);
            }

            match db::cross_references::replace_cross_references(&self.db, &scope, &edges).await {
                Ok(removed) => {
                    info!(
                        scope = %scope,
                        removed,
                        inserted = edges.len(),
                        "Cross-references swapped"
                    );
                    return Ok(edges);
                }
                // Another book was re-extracted after the corpus was read
                Err(err) if err.is_foreign_key_violation() && !refreshed => {
                    warn!(scope = %scope, error = %err, "Corpus changed during recompute; recomputing once");
                    refreshed = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub async fn cross_references_for_trick(
        &self,
        trick_id: Uuid,
    ) -> EngineResult<Vec<CrossReference>> {
        if db::tricks::load_trick(&self.db, trick_id).await?.is_none() {
            return Err(EngineError::TrickNotFound(trick_id));
        }
        Ok(db::cross_references::load_cross_references_for_trick(&self.db, trick_id).await?)
    }

    pub async fn effect_types(&self) -> EngineResult<Vec<EffectType>> {
        Ok(db::effect_types::list_effect_types(&self.db).await?)
    }

    /// Append a canonical effect type (no-op when the name already exists)
    pub async fn add_effect_type(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> EngineResult<EffectType> {
        Ok(db::effect_types::append_effect_type(&self.db, name, description).await?)
    }

    pub async fn corpus_stats(&self) -> EngineResult<CorpusStats> {
        Ok(db::stats::corpus_stats(&self.db).await?)
    }
}
