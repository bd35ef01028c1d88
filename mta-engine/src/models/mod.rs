//! Data models for the extraction and cross-reference pipelines

pub mod candidate;
pub mod corpus;
pub mod effect_catalog;
pub mod scope;

pub use candidate::{AnchorKind, Classification, ClassifiedCandidate, TrickCandidate, TrickDraft};
pub use corpus::{CorpusEntry, CorpusStats};
pub use effect_catalog::EffectTypeCatalog;
pub use scope::RecomputeScope;
