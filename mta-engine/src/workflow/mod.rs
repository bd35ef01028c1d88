//! Engine workflows
//!
//! Pure, synchronous computations over in-memory inputs:
//! - [`pipeline`]: book text → accepted trick drafts plus rejections
//! - [`cross_reference`]: corpus snapshot → directed cross-reference edges

pub mod cross_reference;
pub mod pipeline;

pub use crate::models::RecomputeScope;
pub use cross_reference::compute_cross_references;
pub use pipeline::{ExtractionPipeline, ExtractionReport};
