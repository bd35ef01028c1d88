//! Extraction pipeline
//!
//! Segmenter → Classifier → Quality Filter over one book's text. Pure and
//! synchronous: persistence happens in [`TrickEngine`](crate::TrickEngine).
//!
//! # Example
//! ```rust,ignore
//! let pipeline = ExtractionPipeline::new(&EngineConfig::default());
//! let report = pipeline.run(&text, &catalog);
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{EngineConfig, ExtractionConfig};
use crate::models::EffectTypeCatalog;
use crate::services::{FilterOutcome, QualityFilter, TrickClassifier, TrickSegmenter};

/// Result of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionReport {
    /// Candidates produced by the segmenter
    pub candidates: usize,
    /// True when the text was below the minimum length and nothing ran
    pub too_short: bool,
    pub outcome: FilterOutcome,
}

/// Extraction pipeline
pub struct ExtractionPipeline {
    config: ExtractionConfig,
    segmenter: TrickSegmenter,
    classifier: TrickClassifier,
    filter: QualityFilter,
}

impl ExtractionPipeline {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.extraction.clone(),
            segmenter: TrickSegmenter::new(config.segmenter.clone()),
            classifier: TrickClassifier::new(config.classifier.clone()),
            filter: QualityFilter::new(config.filter.clone()),
        }
    }

    /// Run the pipeline over `text` against a catalog snapshot
    ///
    /// Texts shorter than `min_text_chars` (after trimming) yield an empty
    /// report with `too_short` set.
    pub fn run(&self, text: &str, catalog: &EffectTypeCatalog) -> ExtractionReport {
        let chars = text.trim().chars().count();
        if chars < self.config.min_text_chars {
            debug!(
                chars,
                min = self.config.min_text_chars,
                "Text too short for extraction"
            );
            return ExtractionReport {
                too_short: true,
                ..Default::default()
            };
        }

        let candidates = self.segmenter.segment(text);
        let candidate_count = candidates.len();
        let classified = self.classifier.classify_all(candidates);
        let outcome = self.filter.filter(classified, catalog);

        info!(
            chars,
            candidates = candidate_count,
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "Extraction pipeline complete"
        );

        ExtractionReport {
            candidates: candidate_count,
            too_short: false,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mta_common::db::DEFAULT_EFFECT_TYPES;
    use mta_common::{Difficulty, EffectType};
    use uuid::Uuid;

    fn seeded_catalog() -> EffectTypeCatalog {
        EffectTypeCatalog::new(
            DEFAULT_EFFECT_TYPES
                .iter()
                .map(|(name, _)| EffectType {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                })
                .collect(),
        )
    }

    fn ambitious_card_text() -> String {
        let body = "EFFECT: A selected card is placed in the middle of the deck and rises to the top. \
                    METHOD: A double lift is shown and the top card is slipped into the centre, which \
                    requires practice to make invisible. The routine repeats with the card rising again.";
        format!(
            "CHAPTER ONE. THE AMBITIOUS CARD\n{}\nCHAPTER TWO. FOREWORD\n{}",
            body,
            "Dai Vernon was born in Ottawa and learned his first tricks from his father. ".repeat(4)
        )
    }

    #[test]
    fn test_ambitious_card_example() {
        let pipeline = ExtractionPipeline::new(&EngineConfig::default());
        let catalog = seeded_catalog();

        let report = pipeline.run(&ambitious_card_text(), &catalog);

        assert_eq!(report.candidates, 1);
        assert_eq!(report.outcome.accepted.len(), 1);
        let trick = &report.outcome.accepted[0];
        assert_eq!(trick.name, "The Ambitious Card");
        assert_eq!(trick.effect_type_id, catalog.get_exact("Card").unwrap().id);
        assert_eq!(trick.difficulty, Difficulty::Advanced);
        assert!(trick.confidence > 0.0);
        assert!(trick.method.as_deref().unwrap().starts_with("A double lift"));
    }

    #[test]
    fn test_short_text_yields_empty_report() {
        let pipeline = ExtractionPipeline::new(&EngineConfig::default());
        let report = pipeline.run("CHAPTER ONE. TINY\nToo short.", &seeded_catalog());

        assert!(report.too_short);
        assert_eq!(report.candidates, 0);
        assert!(report.outcome.accepted.is_empty());
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let pipeline = ExtractionPipeline::new(&EngineConfig::default());
        let catalog = seeded_catalog();
        let text = ambitious_card_text();

        assert_eq!(pipeline.run(&text, &catalog), pipeline.run(&text, &catalog));
    }
}
