//! Pre-filter index for pairwise comparison
//!
//! Buckets tricks by effect type and by name token. Only tricks sharing at
//! least one bucket are compared. Any pair sharing neither scores at most
//! [`UNRELATED_CEILING`](super::similarity_engine::UNRELATED_CEILING), below
//! the reporting floor, so the index never hides a reportable pair.

use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use super::similarity_engine::TrickProfile;

/// Inverted index over a slice of profiles
#[derive(Debug, Default)]
pub struct CandidateIndex {
    by_effect_type: HashMap<Uuid, Vec<usize>>,
    by_name_token: HashMap<String, Vec<usize>>,
}

impl CandidateIndex {
    pub fn build(profiles: &[TrickProfile]) -> Self {
        let mut index = Self::default();
        for (idx, profile) in profiles.iter().enumerate() {
            if let Some(effect_type_id) = profile.effect_type_id {
                index
                    .by_effect_type
                    .entry(effect_type_id)
                    .or_default()
                    .push(idx);
            }
            for token in &profile.name_tokens {
                index
                    .by_name_token
                    .entry(token.clone())
                    .or_default()
                    .push(idx);
            }
        }
        index
    }

    /// Indices sharing a bucket with `profiles[idx]`, ascending, excluding `idx`
    pub fn candidates_for(&self, idx: usize, profile: &TrickProfile) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();

        if let Some(bucket) = profile
            .effect_type_id
            .and_then(|id| self.by_effect_type.get(&id))
        {
            out.extend(bucket.iter().copied());
        }
        for token in &profile.name_tokens {
            if let Some(bucket) = self.by_name_token.get(token) {
                out.extend(bucket.iter().copied());
            }
        }

        out.remove(&idx);
        out
    }
}
