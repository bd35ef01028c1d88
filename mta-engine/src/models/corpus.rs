//! Corpus views used by cross-referencing and reporting

use mta_common::Trick;
use serde::{Deserialize, Serialize};

/// Persisted trick joined with the bibliographic data of its book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub trick: Trick,
    pub book_title: String,
    pub author: String,
    pub publication_year: Option<i32>,
}

/// Store-wide counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub books: i64,
    pub processed_books: i64,
    pub tricks: i64,
    pub cross_references: i64,
    pub effect_types: i64,
    /// (effect type name, trick count), most common first
    pub tricks_by_effect_type: Vec<(String, i64)>,
    /// (relationship label, edge count), ordered by label
    pub cross_references_by_type: Vec<(String, i64)>,
    /// Tricks whose confidence falls in the Accept / Review / Reject tiers
    pub review_accept: i64,
    pub review_review: i64,
    pub review_reject: i64,
}
