//! Indirect propagation of strong relationships
//!
//! A person strongly tied to asset A is weakly relevant to every asset A'
//! that shares coverage with A. Each strong edge (P, A, S) adds
//! `S * sim(A, A') * propagation_damping` to the (P, A') weight. Propagated
//! weight never increments the direct co-mention count or date.
//!
//! Must run after direct collection and before materialization.

use crate::comention::CoMentionMap;
use crate::models::{PairKey, Relationship};
use crate::params::ScoringParams;
use crate::similarity::AssetSimilarity;

/// Mutates `co_mentions` in place; returns the number of contributions added.
pub fn propagate_indirect(
    co_mentions: &mut CoMentionMap,
    seeds: &[Relationship],
    similarity: &AssetSimilarity,
    params: &ScoringParams,
) -> usize {
    let mut contributions = 0;

    for seed in seeds
        .iter()
        .filter(|r| r.correlation_score >= params.propagation_seed_threshold)
    {
        for (neighbor, sim) in similarity.neighbors(&seed.asset_id) {
            if sim <= params.similarity_threshold {
                continue;
            }
            let indirect_weight = seed.correlation_score * sim * params.propagation_damping;
            co_mentions
                .entry(PairKey::new(seed.person_id.clone(), neighbor))
                .or_default()
                .weighted_count += indirect_weight;
            contributions += 1;
        }
    }

    contributions
}
