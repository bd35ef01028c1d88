//! Trick similarity
//!
//! Score between two tricks in [0, 1]:
//!
//! ```text
//! score = 0.45 * name + 0.25 * effect_type + 0.30 * description
//! name  = 0.5 * jaccard(name tokens) + 0.5 * normalized_levenshtein(names)
//! ```
//!
//! `effect_type` is 1.0 when both tricks resolve to the same type and 0.0
//! otherwise; `description` is the Jaccard index of content-word sets.
//! Every component is non-decreasing in its input overlap, so the score is
//! monotonic and symmetric.
//!
//! Two tricks sharing no name token and no effect type score at most
//! `0.45 * 0.5 + 0.30 = 0.525`, which is below the reporting floor. The
//! candidate index relies on this bound.

use mta_common::Difficulty;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::CorpusEntry;
use crate::utils::text::{content_tokens, jaccard, normalize_name};

pub const NAME_WEIGHT: f64 = 0.45;
pub const EFFECT_TYPE_WEIGHT: f64 = 0.25;
pub const DESCRIPTION_WEIGHT: f64 = 0.30;

/// Highest score reachable without a shared name token or effect type
pub const UNRELATED_CEILING: f64 = NAME_WEIGHT * 0.5 + DESCRIPTION_WEIGHT;

/// Precomputed comparison features of one trick
#[derive(Debug, Clone)]
pub struct TrickProfile {
    pub trick_id: Uuid,
    pub book_id: Uuid,
    pub author: String,
    pub normalized_name: String,
    pub name_tokens: HashSet<String>,
    pub description_tokens: HashSet<String>,
    pub effect_type_id: Option<Uuid>,
    pub difficulty: Difficulty,
}

impl TrickProfile {
    pub fn from_entry(entry: &CorpusEntry) -> Self {
        let trick = &entry.trick;
        let normalized_name = normalize_name(&trick.name);

        let mut name_tokens = content_tokens(&trick.name);
        if name_tokens.is_empty() {
            // Names made only of stop words still need a token
            name_tokens = normalized_name.split(' ').map(str::to_string).collect();
            name_tokens.retain(|t| !t.is_empty());
        }

        Self {
            trick_id: trick.id,
            book_id: trick.book_id,
            author: entry.author.trim().to_lowercase(),
            normalized_name,
            name_tokens,
            description_tokens: content_tokens(&trick.description),
            effect_type_id: trick.effect_type_id,
            difficulty: trick.difficulty,
        }
    }
}

/// Component scores behind one similarity value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityBreakdown {
    pub name: f64,
    pub effect_type: f64,
    pub description: f64,
    pub score: f64,
}

/// Name component: token overlap and edit distance, equally weighted
pub fn name_similarity(a: &TrickProfile, b: &TrickProfile) -> f64 {
    let tokens = jaccard(&a.name_tokens, &b.name_tokens);
    let edit = strsim::normalized_levenshtein(&a.normalized_name, &b.normalized_name);
    0.5 * tokens + 0.5 * edit
}

pub fn similarity(a: &TrickProfile, b: &TrickProfile) -> SimilarityBreakdown {
    let name = name_similarity(a, b);
    let effect_type = match (a.effect_type_id, b.effect_type_id) {
        (Some(x), Some(y)) if x == y => 1.0,
        _ => 0.0,
    };
    let description = jaccard(&a.description_tokens, &b.description_tokens);

    let score = (NAME_WEIGHT * name + EFFECT_TYPE_WEIGHT * effect_type + DESCRIPTION_WEIGHT * description)
        .clamp(0.0, 1.0);

    SimilarityBreakdown {
        name,
        effect_type,
        description,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mta_common::Trick;

    fn profile(name: &str, description: &str, effect_type_id: Option<Uuid>) -> TrickProfile {
        TrickProfile::from_entry(&CorpusEntry {
            trick: Trick {
                id: Uuid::new_v4(),
                book_id: Uuid::new_v4(),
                name: name.to_string(),
                description: description.to_string(),
                method: None,
                props: vec![],
                effect_type_id,
                difficulty: Difficulty::Intermediate,
                page_range: None,
                confidence: 0.5,
            },
            book_title: "Book".to_string(),
            author: "Author".to_string(),
            publication_year: None,
        })
    }

    #[test]
    fn test_identical_tricks_score_one() {
        let card = Some(Uuid::new_v4());
        let a = profile("The Ambitious Card", "a chosen card rises to the top", card);
        let b = profile("The Ambitious Card", "a chosen card rises to the top", card);

        assert!((similarity(&a, &b).score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = profile("Ambitious Card", "card rises repeatedly", Some(Uuid::new_v4()));
        let b = profile("Ambitious Card Routine", "selected card rises", None);

        assert_eq!(similarity(&a, &b), similarity(&b, &a));
    }

    #[test]
    fn test_unrelated_tricks_stay_under_ceiling() {
        let a = profile("Zombie Ball", "the ball floats behind a foulard", Some(Uuid::new_v4()));
        let b = profile("Torn Newspaper", "the ball floats behind a foulard", Some(Uuid::new_v4()));

        let result = similarity(&a, &b);
        assert!(result.score <= UNRELATED_CEILING + 1e-9);
        assert!(UNRELATED_CEILING < 0.55);
    }

    #[test]
    fn test_more_description_overlap_never_lowers_score() {
        let card = Some(Uuid::new_v4());
        let base = profile("Card Rise", "alpha beta gamma delta", card);
        let low = profile("Card Rise", "alpha zeta eta theta", card);
        let high = profile("Card Rise", "alpha beta gamma theta", card);

        assert!(similarity(&base, &high).score > similarity(&base, &low).score);
    }

    #[test]
    fn test_shared_effect_type_raises_score() {
        let card = Some(Uuid::new_v4());
        let a = profile("Card Rise", "alpha beta", card);
        let same = profile("Card Rise", "alpha beta", card);
        let other = profile("Card Rise", "alpha beta", Some(Uuid::new_v4()));

        let diff = similarity(&a, &same).score - similarity(&a, &other).score;
        assert!((diff - EFFECT_TYPE_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_exact_name_scores_at_least_renamed_pair() {
        let card = Some(Uuid::new_v4());
        let description = "a chosen card rises from the deck";
        let a = profile("Card Rise", description, card);
        let same_name = profile("Card Rise", description, card);
        let renamed = profile("Rising Card", description, card);

        let exact = similarity(&a, &same_name);
        let fuzzy = similarity(&a, &renamed);

        assert_eq!(exact.name, 1.0);
        assert!(exact.name >= fuzzy.name);
        assert!(exact.score >= fuzzy.score);
        assert_eq!(exact.effect_type, fuzzy.effect_type);
        assert_eq!(exact.description, fuzzy.description);
    }

    #[test]
    fn test_stop_word_names_still_have_tokens() {
        let p = profile("The One", "x", None);
        assert!(!p.name_tokens.is_empty());
    }
}
