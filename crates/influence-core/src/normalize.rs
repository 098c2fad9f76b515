//! Min-max normalization into the 0-100 display range

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aggregate::{raw_scores, MentionStats};
use crate::models::{EntityId, EntityKind, ScoredEntity};
use crate::params::{BaselinePolicy, ScoringParams};

/// Score every population member in `[0, 100]`. A population without spread
/// (including all zeros) scores 50 across the board.
pub fn normalize_scores(raw: &[f64]) -> Vec<u8> {
    if raw.is_empty() {
        return Vec::new();
    }

    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return vec![50; raw.len()];
    }

    raw.iter()
        .map(|score| ((score - min) / (max - min) * 100.0).round().clamp(0.0, 100.0) as u8)
        .collect()
}

/// Source of substitute scores for entities that normalized to zero.
pub struct Baseline {
    policy: BaselinePolicy,
    rng: Option<StdRng>,
}

impl Baseline {
    pub fn new(policy: &BaselinePolicy) -> Self {
        let rng = match policy {
            BaselinePolicy::Fixed { .. } => None,
            BaselinePolicy::Random { seed: Some(seed) } => Some(StdRng::seed_from_u64(*seed)),
            BaselinePolicy::Random { seed: None } => Some(StdRng::from_entropy()),
        };
        Self {
            policy: policy.clone(),
            rng,
        }
    }

    pub fn score(&mut self, kind: EntityKind) -> u8 {
        match (&self.policy, self.rng.as_mut()) {
            (BaselinePolicy::Fixed { person, asset }, _) => match kind {
                EntityKind::Person => *person,
                EntityKind::Asset => *asset,
            },
            (BaselinePolicy::Random { .. }, Some(rng)) => {
                let (low, high) = BaselinePolicy::random_range(kind);
                rng.gen_range(low..=high)
            }
            (BaselinePolicy::Random { .. }, None) => BaselinePolicy::random_range(kind).0,
        }
    }
}

/// Aggregate -> normalize -> baseline for one population, in `ids` order.
pub fn score_population<S: AsRef<str>>(
    ids: &[S],
    stats: &HashMap<EntityId, MentionStats>,
    kind: EntityKind,
    params: &ScoringParams,
    baseline: &mut Baseline,
) -> Vec<ScoredEntity> {
    let raw = raw_scores(ids, stats, params);
    let normalized = normalize_scores(&raw);

    ids.iter()
        .zip(raw)
        .zip(normalized)
        .map(|((id, raw_score), score)| {
            let baseline_applied = score == 0;
            ScoredEntity {
                id: id.as_ref().to_string(),
                raw_score,
                score: if baseline_applied { baseline.score(kind) } else { score },
                baseline_applied,
            }
        })
        .collect()
}
