//! Error types for mta-engine

use thiserror::Error;
use uuid::Uuid;

/// Engine result type
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// mta-common error (database init, config, row decoding)
    #[error("Common error: {0}")]
    Common(#[from] mta_common::Error),

    /// Query or transaction failure; the transaction has been rolled back
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cross-reference recompute cancelled before the swap; store unchanged
    #[error("Cross-reference recompute aborted")]
    RecomputeAborted,

    #[error("Book not found: {0}")]
    BookNotFound(Uuid),

    #[error("Trick not found: {0}")]
    TrickNotFound(Uuid),

    /// Unparseable recompute scope or other caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
