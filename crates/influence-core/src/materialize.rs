//! Relationship materialization
//!
//! Turns accumulated co-mention weight into persisted edge fields. Weights are
//! normalized against the global maximum (never below 1), so an edge's
//! correlation is relative to the strongest edge in the whole graph.

use std::collections::{HashMap, HashSet};

use crate::comention::CoMentionMap;
use crate::models::{EntityId, PairKey, Relationship};
use crate::params::ScoringParams;

/// Curated edges that a scoring run must never rewrite
#[derive(Debug, Clone, Default)]
pub struct PermanentSet {
    keys: HashSet<PairKey>,
}

impl PermanentSet {
    /// Keep only stored relationships that clear both permanence thresholds.
    pub fn from_relationships(stored: &[Relationship], params: &ScoringParams) -> Self {
        let keys = stored
            .iter()
            .filter(|r| {
                r.correlation_score >= params.permanent_min_correlation
                    && r.co_mention_count >= params.permanent_min_co_mentions
            })
            .map(Relationship::key)
            .collect();
        Self { keys }
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaterializedRelationships {
    /// Rows to upsert, in key order
    pub updates: Vec<Relationship>,
    pub skipped_permanent: usize,
    pub skipped_trivial: usize,
    pub max_weight: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn materialize_relationships(
    co_mentions: &CoMentionMap,
    person_scores: &HashMap<EntityId, u8>,
    permanent: &PermanentSet,
    params: &ScoringParams,
) -> MaterializedRelationships {
    let max_weight = co_mentions
        .values()
        .map(|c| c.weighted_count)
        .fold(1.0_f64, f64::max);

    let mut result = MaterializedRelationships {
        max_weight,
        ..Default::default()
    };

    for (key, data) in co_mentions {
        if permanent.contains(key) {
            result.skipped_permanent += 1;
            continue;
        }
        if data.count == 0 && data.weighted_count <= params.min_persist_weight {
            result.skipped_trivial += 1;
            continue;
        }

        let correlation = (data.weighted_count / max_weight).min(1.0);
        let person_score = person_scores
            .get(&key.person_id)
            .copied()
            .unwrap_or(params.default_person_score);
        let influence_strength = (correlation * person_score as f64).round().clamp(0.0, 100.0) as u8;

        result.updates.push(Relationship {
            person_id: key.person_id.clone(),
            asset_id: key.asset_id.clone(),
            correlation_score: round2(correlation),
            influence_strength,
            co_mention_count: data.count,
            last_co_mention_at: data.last_mention,
        });
    }

    result
}
