//! Recompute scope

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::CorpusEntry;
use crate::error::EngineError;

/// Tricks whose edges a recompute replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum RecomputeScope {
    All,
    Book(Uuid),
    Trick(Uuid),
}

impl RecomputeScope {
    pub fn contains(&self, entry: &CorpusEntry) -> bool {
        match self {
            RecomputeScope::All => true,
            RecomputeScope::Book(id) => entry.trick.book_id == *id,
            RecomputeScope::Trick(id) => entry.trick.id == *id,
        }
    }
}

impl fmt::Display for RecomputeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecomputeScope::All => write!(f, "all"),
            RecomputeScope::Book(id) => write!(f, "book:{}", id),
            RecomputeScope::Trick(id) => write!(f, "trick:{}", id),
        }
    }
}

impl FromStr for RecomputeScope {
    type Err = EngineError;

    /// Parse `all`, `book:<uuid>` or `trick:<uuid>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(RecomputeScope::All);
        }

        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| EngineError::InvalidInput(format!("Invalid scope: {}", s)))?;
        let id = Uuid::parse_str(id.trim())
            .map_err(|e| EngineError::InvalidInput(format!("Invalid scope id '{}': {}", id, e)))?;

        match kind.trim().to_ascii_lowercase().as_str() {
            "book" => Ok(RecomputeScope::Book(id)),
            "trick" => Ok(RecomputeScope::Trick(id)),
            other => Err(EngineError::InvalidInput(format!(
                "Unknown scope kind: {}",
                other
            ))),
        }
    }
}
