//! Quality filter
//!
//! Final gate between classified candidates and persisted tricks. Rules are
//! applied in order and the first failure rejects the candidate:
//!
//! 1. Title must not be a bare positional label ("Page 42", "Chapter IV")
//! 2. Body must reach `min_description_chars`
//! 3. Effect category must resolve to a row of the effect-type catalog
//! 4. Within one book, a later candidate with the same normalized name and
//!    description length as an accepted one is a duplicate
//!
//! Every rejection is returned with its reason; nothing is dropped silently.

use mta_common::EffectType;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use super::effect_rules::EffectCategory;
use crate::config::FilterConfig;
use crate::models::{ClassifiedCandidate, EffectTypeCatalog, TrickDraft};
use crate::utils::text::{is_positional_label, normalize_name, title_case, truncate_with_ellipsis};

/// Why a candidate did not become a trick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RejectionReason {
    PositionalTitle,
    DescriptionTooShort { chars: usize, min: usize },
    UnresolvedEffectType { category: EffectCategory },
    DuplicateInBook { kept_position: usize },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::PositionalTitle => write!(f, "title is a positional label"),
            RejectionReason::DescriptionTooShort { chars, min } => {
                write!(f, "description has {} chars, minimum is {}", chars, min)
            }
            RejectionReason::UnresolvedEffectType { category } => write!(
                f,
                "effect category '{}' has no matching effect type",
                category.key()
            ),
            RejectionReason::DuplicateInBook { kept_position } => {
                write!(f, "duplicate of candidate at position {}", kept_position)
            }
        }
    }
}

/// Rejected candidate with its reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub position: usize,
    pub title: String,
    pub reason: RejectionReason,
}

/// Accepted drafts and rejections, both in candidate order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub accepted: Vec<TrickDraft>,
    pub rejected: Vec<Rejection>,
}

/// Quality Filter
pub struct QualityFilter {
    config: FilterConfig,
}

impl QualityFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Filter candidates against the catalog snapshot
    ///
    /// Pure function of the candidate list, the catalog and the config.
    pub fn filter(
        &self,
        candidates: Vec<ClassifiedCandidate>,
        catalog: &EffectTypeCatalog,
    ) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();
        // (normalized name, description length) -> position of the accepted candidate
        let mut seen: HashMap<(String, usize), usize> = HashMap::new();

        for classified in candidates {
            let candidate = &classified.candidate;
            let position = candidate.position;

            let reject = |reason: RejectionReason| {
                debug!(
                    position,
                    title = %candidate.title_guess,
                    reason = %reason,
                    "Rejected candidate"
                );
                Rejection {
                    position,
                    title: candidate.title_guess.clone(),
                    reason,
                }
            };

            if is_positional_label(&candidate.title_guess) {
                outcome.rejected.push(reject(RejectionReason::PositionalTitle));
                continue;
            }

            let chars = candidate.body.chars().count();
            if chars < self.config.min_description_chars {
                outcome.rejected.push(reject(RejectionReason::DescriptionTooShort {
                    chars,
                    min: self.config.min_description_chars,
                }));
                continue;
            }

            let category = classified.classification.category;
            let Some(effect_type) = resolve_effect_type(category, catalog) else {
                outcome
                    .rejected
                    .push(reject(RejectionReason::UnresolvedEffectType { category }));
                continue;
            };

            let name = title_case(&candidate.title_guess);
            let description = truncate_with_ellipsis(&candidate.body, self.config.description_cap);

            let key = (normalize_name(&name), description.chars().count());
            if let Some(&kept_position) = seen.get(&key) {
                outcome
                    .rejected
                    .push(reject(RejectionReason::DuplicateInBook { kept_position }));
                continue;
            }
            seen.insert(key, position);

            debug!(
                position,
                name = %name,
                effect_type = %effect_type.name,
                "Accepted candidate"
            );

            outcome.accepted.push(TrickDraft {
                position,
                name,
                description,
                method: classified
                    .method
                    .as_deref()
                    .map(|m| truncate_with_ellipsis(m, self.config.method_cap)),
                props: classified.props.clone(),
                effect_type_id: effect_type.id,
                difficulty: classified.classification.difficulty,
                page_range: candidate.page_range(),
                confidence: classified.classification.confidence,
            });
        }

        outcome
    }
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

/// Map a category to a catalog row
///
/// Exact canonical name first, then one case-insensitive pass over the
/// canonical name and its aliases.
pub fn resolve_effect_type(
    category: EffectCategory,
    catalog: &EffectTypeCatalog,
) -> Option<&EffectType> {
    if let Some(found) = catalog.get_exact(category.canonical_name()) {
        return Some(found);
    }

    debug!(
        category = category.key(),
        canonical = category.canonical_name(),
        "Effect type not found by exact name, attempting resolution pass"
    );

    std::iter::once(category.canonical_name())
        .chain(category.aliases().iter().copied())
        .find_map(|name| catalog.find_case_insensitive(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnchorKind, Classification, TrickCandidate};
    use mta_common::Difficulty;
    use uuid::Uuid;

    fn catalog(names: &[&str]) -> EffectTypeCatalog {
        EffectTypeCatalog::new(
            names
                .iter()
                .map(|n| EffectType {
                    id: Uuid::new_v4(),
                    name: n.to_string(),
                })
                .collect(),
        )
    }

    fn classified(position: usize, title: &str, body: &str, category: EffectCategory) -> ClassifiedCandidate {
        ClassifiedCandidate {
            candidate: TrickCandidate {
                position,
                start_offset: 0,
                end_offset: body.len(),
                title_guess: title.to_string(),
                body: body.to_string(),
                page_start: 3,
                page_end: 4,
                anchor: AnchorKind::Chapter,
            },
            classification: Classification {
                category,
                difficulty: Difficulty::Advanced,
                confidence: 0.8,
            },
            method: Some("m".repeat(600)),
            props: vec!["Cards".to_string()],
        }
    }

    #[test]
    fn test_accepts_good_candidate() {
        let filter = QualityFilter::default();
        let catalog = catalog(&["Card", "Close-Up"]);
        let body = "x".repeat(1500);

        let outcome = filter.filter(
            vec![classified(0, "THE AMBITIOUS CARD", &body, EffectCategory::Card)],
            &catalog,
        );

        assert!(outcome.rejected.is_empty());
        let draft = &outcome.accepted[0];
        assert_eq!(draft.name, "The Ambitious Card");
        assert_eq!(draft.description.chars().count(), 1003);
        assert!(draft.description.ends_with("..."));
        assert_eq!(draft.method.as_ref().map(|m| m.chars().count()), Some(503));
        assert_eq!(draft.effect_type_id, catalog.get_exact("Card").unwrap().id);
        assert_eq!(draft.page_range.to_string(), "3-4");
    }

    #[test]
    fn test_page_marker_title_with_short_body_is_rejected() {
        let filter = QualityFilter::default();
        let outcome = filter.filter(
            vec![classified(0, "--- Page 42 ---", &"y".repeat(30), EffectCategory::CloseUp)],
            &catalog(&["Close-Up"]),
        );

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected[0].reason, RejectionReason::PositionalTitle);
    }

    #[test]
    fn test_short_description_is_rejected() {
        let filter = QualityFilter::default();
        let outcome = filter.filter(
            vec![classified(0, "Short One", &"y".repeat(99), EffectCategory::Card)],
            &catalog(&["Card"]),
        );

        assert_eq!(
            outcome.rejected[0].reason,
            RejectionReason::DescriptionTooShort { chars: 99, min: 100 }
        );
    }

    #[test]
    fn test_resolution_pass_is_case_insensitive() {
        let filter = QualityFilter::default();
        let catalog = catalog(&["card"]);
        let outcome = filter.filter(
            vec![classified(0, "Card Rise", &"y".repeat(200), EffectCategory::Card)],
            &catalog,
        );

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(
            outcome.accepted[0].effect_type_id,
            catalog.find_case_insensitive("card").unwrap().id
        );
    }

    #[test]
    fn test_unresolved_effect_type_is_rejected() {
        let filter = QualityFilter::default();
        let outcome = filter.filter(
            vec![classified(0, "Coin Vanish", &"y".repeat(200), EffectCategory::Coin)],
            &catalog(&["Card"]),
        );

        assert!(outcome.accepted.is_empty());
        assert_eq!(
            outcome.rejected[0].reason,
            RejectionReason::UnresolvedEffectType {
                category: EffectCategory::Coin
            }
        );
    }

    #[test]
    fn test_duplicates_within_book_are_rejected() {
        let filter = QualityFilter::default();
        let body = "y".repeat(300);
        let outcome = filter.filter(
            vec![
                classified(0, "THE AMBITIOUS CARD", &body, EffectCategory::Card),
                classified(1, "The Ambitious  Card.", &body, EffectCategory::Card),
                classified(2, "The Ambitious Card", &"z".repeat(301), EffectCategory::Card),
            ],
            &catalog(&["Card"]),
        );

        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.accepted[1].position, 2);
        assert_eq!(
            outcome.rejected[0].reason,
            RejectionReason::DuplicateInBook { kept_position: 0 }
        );
    }

    #[test]
    fn test_filter_is_deterministic() {
        let filter = QualityFilter::default();
        let catalog = catalog(&["Card", "Close-Up"]);
        let input = vec![
            classified(0, "Page 1", &"y".repeat(300), EffectCategory::Card),
            classified(1, "Card Rise", &"y".repeat(300), EffectCategory::Card),
        ];

        assert_eq!(
            filter.filter(input.clone(), &catalog),
            filter.filter(input, &catalog)
        );
    }
}
