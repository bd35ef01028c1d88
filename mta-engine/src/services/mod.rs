//! Service modules for the trick extraction engine
//!
//! Extraction: segmenter → classifier → quality filter.
//! Cross-referencing: similarity engine (with candidate index) → relationship classifier.

pub mod candidate_index;
pub mod effect_rules;
pub mod quality_filter;
pub mod relationship_classifier;
pub mod similarity_engine;
pub mod trick_classifier;
pub mod trick_segmenter;

pub use candidate_index::CandidateIndex;
pub use effect_rules::{EffectCategory, EffectRule, EFFECT_RULES};
pub use quality_filter::{FilterOutcome, QualityFilter, Rejection, RejectionReason};
pub use relationship_classifier::{classify_relationship, PairSignals};
pub use similarity_engine::{similarity, SimilarityBreakdown, TrickProfile};
pub use trick_classifier::TrickClassifier;
pub use trick_segmenter::TrickSegmenter;
