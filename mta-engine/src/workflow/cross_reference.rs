//! Cross-reference computation
//!
//! Similarity Engine + Relationship Classifier over a corpus snapshot.
//! Every unordered pair is scored once; a labelled pair yields two directed
//! edges with the same label and score but direction-specific notes. The
//! result is sorted by (source, target), so identical corpora always give
//! identical edge lists.

use mta_common::CrossReference;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{CorpusEntry, RecomputeScope};
use crate::services::relationship_classifier::{classify_relationship, edge_notes, PairSignals};
use crate::services::similarity_engine::{similarity, TrickProfile};
use crate::services::CandidateIndex;

/// Compute every edge touching a trick in `scope`
///
/// Checks `cancel` between tricks; a cancelled run returns
/// [`EngineError::RecomputeAborted`] and no partial result.
pub fn compute_cross_references(
    corpus: &[CorpusEntry],
    scope: &RecomputeScope,
    cancel: &CancellationToken,
) -> EngineResult<Vec<CrossReference>> {
    let mut entries: Vec<&CorpusEntry> = corpus.iter().collect();
    entries.sort_by_key(|e| e.trick.id);

    let profiles: Vec<TrickProfile> = entries.iter().map(|e| TrickProfile::from_entry(e)).collect();
    let index = CandidateIndex::build(&profiles);

    let focus: Vec<usize> = (0..entries.len())
        .filter(|&i| scope.contains(entries[i]))
        .collect();
    let in_focus: HashSet<usize> = focus.iter().copied().collect();

    let mut edges = Vec::new();
    let mut compared = 0usize;

    for &i in &focus {
        if cancel.is_cancelled() {
            info!(scope = %scope, "Cross-reference recompute cancelled");
            return Err(EngineError::RecomputeAborted);
        }

        for j in index.candidates_for(i, &profiles[i]) {
            // Pairs inside the focus set are visited once, from the lower index
            if in_focus.contains(&j) && j < i {
                continue;
            }

            compared += 1;
            let breakdown = similarity(&profiles[i], &profiles[j]);
            let signals = PairSignals::between(&profiles[i], &profiles[j], breakdown.score);
            let Some(relationship) = classify_relationship(&signals) else {
                continue;
            };

            debug!(
                source = %entries[i].trick.id,
                target = %entries[j].trick.id,
                score = breakdown.score,
                relationship = %relationship,
                "Pair labelled"
            );

            for (src, tgt) in [(entries[i], entries[j]), (entries[j], entries[i])] {
                edges.push(CrossReference {
                    source_trick_id: src.trick.id,
                    target_trick_id: tgt.trick.id,
                    relationship_type: relationship,
                    similarity_score: breakdown.score,
                    notes: Some(edge_notes(relationship, src, tgt)),
                });
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(EngineError::RecomputeAborted);
    }

    edges.sort_by_key(|e| (e.source_trick_id, e.target_trick_id));

    info!(
        scope = %scope,
        tricks = entries.len(),
        focus = focus.len(),
        compared,
        edges = edges.len(),
        "Cross-references computed"
    );

    Ok(edges)
}
