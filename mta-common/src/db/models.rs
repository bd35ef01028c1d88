//! Database models
//!
//! Persisted shapes for books, effect types, tricks and cross-references.
//! Identifiers are UUIDs stored as TEXT.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// Book with its OCR-extracted text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub publication_year: Option<i32>,
    pub text_content: String,
    pub char_count: i64,
    pub ocr_confidence: Option<f64>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Create a new, unprocessed book record
    pub fn new(title: impl Into<String>, author: impl Into<String>, text: impl Into<String>) -> Self {
        let text_content = text.into();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            publication_year: None,
            char_count: text_content.chars().count() as i64,
            text_content,
            ocr_confidence: None,
            processed_at: None,
        }
    }
}

/// Canonical effect category (row of the append-only `effect_types` table)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectType {
    pub id: Uuid,
    pub name: String,
}

/// Difficulty tier, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
            Difficulty::Expert => "Expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            "expert" => Ok(Difficulty::Expert),
            other => Err(Error::InvalidInput(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// Inclusive page range within a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PageRange {
    pub fn new(start: u32, end: Option<u32>) -> Self {
        // end before start collapses to a single page
        let end = end.filter(|e| *e > start);
        Self { start: start.max(1), end }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

/// Human-review tier derived from a trick's confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    /// Confidence >= 0.85
    Accept,
    /// Confidence 0.60-0.85
    Review,
    /// Confidence < 0.60 (kept, flagged for a human)
    Reject,
}

impl ReviewStatus {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.85 {
            ReviewStatus::Accept
        } else if confidence >= 0.60 {
            ReviewStatus::Review
        } else {
            ReviewStatus::Reject
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Accept => "Accept",
            ReviewStatus::Review => "Review",
            ReviewStatus::Reject => "Reject",
        }
    }
}

/// Persisted trick record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trick {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub description: String,
    pub method: Option<String>,
    pub props: Vec<String>,
    /// Resolved `effect_types.id`; `None` only for rows awaiting manual classification
    pub effect_type_id: Option<Uuid>,
    pub difficulty: Difficulty,
    pub page_range: Option<PageRange>,
    pub confidence: f64,
}

impl Trick {
    pub fn review_status(&self) -> ReviewStatus {
        ReviewStatus::from_confidence(self.confidence)
    }
}

/// Cross-reference relationship label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Duplicate,
    Variation,
    AttributedSource,
    RelatedTechnique,
    Progression,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Duplicate => "duplicate",
            RelationshipType::Variation => "variation",
            RelationshipType::AttributedSource => "attributed_source",
            RelationshipType::RelatedTechnique => "related_technique",
            RelationshipType::Progression => "progression",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "duplicate" => Ok(RelationshipType::Duplicate),
            "variation" => Ok(RelationshipType::Variation),
            "attributed_source" => Ok(RelationshipType::AttributedSource),
            "related_technique" => Ok(RelationshipType::RelatedTechnique),
            "progression" => Ok(RelationshipType::Progression),
            other => Err(Error::InvalidInput(format!(
                "Unknown relationship type: {}",
                other
            ))),
        }
    }
}

/// Directed, typed, scored edge between two persisted tricks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub source_trick_id: Uuid,
    pub target_trick_id: Uuid,
    pub relationship_type: RelationshipType,
    pub similarity_score: f64,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_ordering() {
        assert!(Difficulty::Beginner < Difficulty::Intermediate);
        assert!(Difficulty::Advanced < Difficulty::Expert);
    }

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!("advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert_eq!(" Expert ".parse::<Difficulty>().unwrap(), Difficulty::Expert);
        assert!("wizard".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_relationship_type_strings() {
        for rel in [
            RelationshipType::Duplicate,
            RelationshipType::Variation,
            RelationshipType::AttributedSource,
            RelationshipType::RelatedTechnique,
            RelationshipType::Progression,
        ] {
            assert_eq!(rel.as_str().parse::<RelationshipType>().unwrap(), rel);
        }
    }

    #[test]
    fn test_page_range_display() {
        assert_eq!(PageRange::new(12, None).to_string(), "12");
        assert_eq!(PageRange::new(12, Some(15)).to_string(), "12-15");
        // end before start collapses
        assert_eq!(PageRange::new(12, Some(3)).to_string(), "12");
        assert_eq!(PageRange::new(0, None).start, 1);
    }

    #[test]
    fn test_review_status_thresholds() {
        assert_eq!(ReviewStatus::from_confidence(0.85), ReviewStatus::Accept);
        assert_eq!(ReviewStatus::from_confidence(0.60), ReviewStatus::Review);
        assert_eq!(ReviewStatus::from_confidence(0.0), ReviewStatus::Reject);
    }

    #[test]
    fn test_book_new_counts_chars() {
        let book = Book::new("Expert Card Technique", "Hugard", "abc\u{e9}");
        assert_eq!(book.char_count, 4);
        assert!(book.processed_at.is_none());
    }
}
