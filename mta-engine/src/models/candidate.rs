//! Intermediate shapes between raw book text and persisted tricks

use mta_common::{Difficulty, PageRange, Trick};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::effect_rules::EffectCategory;

/// Structural anchor that opened a candidate passage
///
/// Variants are listed from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorKind {
    /// "CHAPTER ONE. THE AMBITIOUS CARD" or "Section 3: ..."
    Chapter,
    /// "--- Page 12 ---" marker
    PageBreak,
    /// Short title-like line after a blank line
    Paragraph,
    /// No anchor found; the whole text is one passage
    Unanchored,
}

/// Contiguous passage believed to describe one trick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrickCandidate {
    /// Order within the book, starting at 0
    pub position: usize,
    /// Byte offset of the anchor within the source text
    pub start_offset: usize,
    /// Byte offset one past the end of the passage
    pub end_offset: usize,
    pub title_guess: String,
    /// Passage body with page markers removed
    pub body: String,
    /// 1-based page the passage starts on
    pub page_start: u32,
    /// 1-based page the passage ends on (>= `page_start`)
    pub page_end: u32,
    pub anchor: AnchorKind,
}

impl TrickCandidate {
    pub fn is_unanchored(&self) -> bool {
        self.anchor == AnchorKind::Unanchored
    }

    pub fn page_range(&self) -> PageRange {
        PageRange::new(self.page_start, Some(self.page_end))
    }
}

/// Classifier verdict for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: EffectCategory,
    pub difficulty: Difficulty,
    /// 0.0 ..= 1.0; 0.0 for unanchored passages
    pub confidence: f64,
}

/// Candidate plus everything the classifier derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedCandidate {
    pub candidate: TrickCandidate,
    pub classification: Classification,
    pub method: Option<String>,
    pub props: Vec<String>,
}

/// Accepted trick before it is bound to a book and given an identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrickDraft {
    pub position: usize,
    pub name: String,
    pub description: String,
    pub method: Option<String>,
    pub props: Vec<String>,
    pub effect_type_id: Uuid,
    pub difficulty: Difficulty,
    pub page_range: PageRange,
    pub confidence: f64,
}

impl TrickDraft {
    /// Bind the draft to a book under a fresh identifier
    pub fn into_trick(self, book_id: Uuid) -> Trick {
        Trick {
            id: Uuid::new_v4(),
            book_id,
            name: self.name,
            description: self.description,
            method: self.method,
            props: self.props,
            effect_type_id: Some(self.effect_type_id),
            difficulty: self.difficulty,
            page_range: Some(self.page_range),
            confidence: self.confidence,
        }
    }
}
