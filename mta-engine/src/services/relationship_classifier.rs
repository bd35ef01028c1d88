//! Relationship classification
//!
//! Maps a similarity score plus same-author, same-difficulty and same-name
//! flags onto a relationship label. Scores below
//! [`MIN_REPORTABLE_SCORE`] produce no edge.
//!
//! | score band        | condition                      | label               |
//! |-------------------|--------------------------------|---------------------|
//! | s >= 0.90         |                                | duplicate           |
//! | 0.75 <= s < 0.90  | same author                    | variation           |
//! | 0.75 <= s < 0.90  | other author, same name        | variation           |
//! | 0.75 <= s < 0.90  | other author, different name   | attributed_source   |
//! | 0.55 <= s < 0.75  | different difficulty, same name| progression         |
//! | 0.55 <= s < 0.75  | otherwise                      | related_technique   |

use mta_common::{PageRange, RelationshipType};

use super::similarity_engine::TrickProfile;
use crate::models::CorpusEntry;

pub const DUPLICATE_THRESHOLD: f64 = 0.90;
pub const VARIATION_THRESHOLD: f64 = 0.75;
pub const MIN_REPORTABLE_SCORE: f64 = 0.55;

/// Inputs to the decision table for one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSignals {
    pub score: f64,
    pub same_author: bool,
    pub same_difficulty: bool,
    pub same_name: bool,
}

impl PairSignals {
    pub fn between(a: &TrickProfile, b: &TrickProfile, score: f64) -> Self {
        Self {
            score,
            same_author: a.author == b.author,
            same_difficulty: a.difficulty == b.difficulty,
            same_name: a.normalized_name == b.normalized_name,
        }
    }
}

/// Apply the decision table; `None` means no edge
pub fn classify_relationship(signals: &PairSignals) -> Option<RelationshipType> {
    let s = signals.score;
    if s.is_nan() || s < MIN_REPORTABLE_SCORE {
        return None;
    }

    let label = if s >= DUPLICATE_THRESHOLD {
        RelationshipType::Duplicate
    } else if s >= VARIATION_THRESHOLD {
        if signals.same_author || signals.same_name {
            RelationshipType::Variation
        } else {
            RelationshipType::AttributedSource
        }
    } else if !signals.same_difficulty && signals.same_name {
        RelationshipType::Progression
    } else {
        RelationshipType::RelatedTechnique
    };

    Some(label)
}

fn pages(range: Option<PageRange>) -> String {
    match range {
        Some(r @ PageRange { end: Some(_), .. }) => format!(", pp. {}", r),
        Some(r) => format!(", p. {}", r),
        None => String::new(),
    }
}

fn version(entry: &CorpusEntry) -> String {
    format!(
        "{}'s \"{}\" in {}{}",
        entry.author,
        entry.trick.name,
        entry.book_title,
        pages(entry.trick.page_range)
    )
}

/// Human-readable note for the directed edge `source -> target`
pub fn edge_notes(
    relationship: RelationshipType,
    source: &CorpusEntry,
    target: &CorpusEntry,
) -> String {
    match relationship {
        RelationshipType::Duplicate => {
            format!("Same trick as {}", version(target))
        }
        RelationshipType::Variation => {
            format!("Variation of {}", version(target))
        }
        RelationshipType::AttributedSource => {
            let mut note = format!("{} parallels {}", version(source), version(target));
            if let (Some(src_year), Some(tgt_year)) =
                (source.publication_year, target.publication_year)
            {
                if tgt_year < src_year {
                    note.push_str(&format!(
                        "; {} ({}) is the earlier publication",
                        target.book_title, tgt_year
                    ));
                } else if src_year < tgt_year {
                    note.push_str(&format!(
                        "; {} ({}) is the earlier publication",
                        source.book_title, src_year
                    ));
                }
            }
            note
        }
        RelationshipType::RelatedTechnique => {
            format!("Related technique: {}", version(target))
        }
        RelationshipType::Progression => format!(
            "Progression from {} to {}: {}",
            source.trick.difficulty,
            target.trick.difficulty,
            version(target)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mta_common::{Difficulty, Trick};
    use uuid::Uuid;

    fn signals(score: f64, same_author: bool, same_difficulty: bool, same_name: bool) -> PairSignals {
        PairSignals {
            score,
            same_author,
            same_difficulty,
            same_name,
        }
    }

    #[test]
    fn test_decision_table() {
        use RelationshipType::*;

        let cases = [
            (0.95, false, false, false, Some(Duplicate)),
            (0.90, true, true, true, Some(Duplicate)),
            (0.89, true, false, false, Some(Variation)),
            (0.80, false, true, true, Some(Variation)),
            (0.80, false, true, false, Some(AttributedSource)),
            (0.75, false, false, false, Some(AttributedSource)),
            (0.70, false, false, true, Some(Progression)),
            (0.70, false, true, true, Some(RelatedTechnique)),
            (0.70, true, false, false, Some(RelatedTechnique)),
            (0.55, false, false, false, Some(RelatedTechnique)),
            (0.5499, true, true, true, None),
            (0.0, true, true, true, None),
        ];

        for (score, a, d, n, expected) in cases {
            assert_eq!(
                classify_relationship(&signals(score, a, d, n)),
                expected,
                "score={} A={} D={} name={}",
                score,
                a,
                d,
                n
            );
        }
    }

    #[test]
    fn test_nan_score_emits_nothing() {
        assert_eq!(classify_relationship(&signals(f64::NAN, true, true, true)), None);
    }

    fn entry(author: &str, book: &str, year: Option<i32>, pages: Option<PageRange>) -> CorpusEntry {
        CorpusEntry {
            trick: Trick {
                id: Uuid::new_v4(),
                book_id: Uuid::new_v4(),
                name: "The Ambitious Card".to_string(),
                description: String::new(),
                method: None,
                props: vec![],
                effect_type_id: None,
                difficulty: Difficulty::Advanced,
                page_range: pages,
                confidence: 0.5,
            },
            book_title: book.to_string(),
            author: author.to_string(),
            publication_year: year,
        }
    }

    #[test]
    fn test_attributed_source_notes_name_earlier_edition() {
        let vernon = entry("Dai Vernon", "Stars of Magic", Some(1946), Some(PageRange::new(12, Some(15))));
        let other = entry("Ed Marlo", "Marlo's Magazine", Some(1976), Some(PageRange::new(3, None)));

        let forward = edge_notes(RelationshipType::AttributedSource, &other, &vernon);
        assert!(forward.contains("Ed Marlo's \"The Ambitious Card\" in Marlo's Magazine, p. 3"));
        assert!(forward.contains("Dai Vernon's \"The Ambitious Card\" in Stars of Magic, pp. 12-15"));
        assert!(forward.ends_with("Stars of Magic (1946) is the earlier publication"));

        let backward = edge_notes(RelationshipType::AttributedSource, &vernon, &other);
        assert!(backward.ends_with("Stars of Magic (1946) is the earlier publication"));
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_notes_without_pages_or_years() {
        let a = entry("A", "Book A", None, None);
        let b = entry("B", "Book B", None, None);

        assert_eq!(
            edge_notes(RelationshipType::Duplicate, &a, &b),
            "Same trick as B's \"The Ambitious Card\" in Book B"
        );
        assert!(!edge_notes(RelationshipType::AttributedSource, &a, &b).contains("earlier"));
    }
}
