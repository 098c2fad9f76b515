//! Entity score aggregation
//!
//! Folds every mention of an entity into three capped sub-scores:
//! volume (decayed mention counts), intensity (decayed absolute sentiment,
//! direction ignored) and diversity (number of articles, undecayed).

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::decay::mention_decay;
use crate::models::{EntityId, Mention};
use crate::params::ScoringParams;

/// Running totals for one entity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MentionStats {
    pub total_weight: f64,
    pub sentiment_sum: f64,
    pub article_count: u32,
}

impl MentionStats {
    /// Add one mention with decay weight `decay`.
    pub fn record(&mut self, mention_count: u32, sentiment: Option<f64>, decay: f64) {
        self.total_weight += mention_count as f64 * decay;
        self.sentiment_sum += sentiment.unwrap_or(0.0).abs() * decay;
        self.article_count += 1;
    }

    /// Raw influence before normalization, at most the sum of the three caps.
    pub fn raw_score(&self, params: &ScoringParams) -> f64 {
        let volume = (self.total_weight * params.volume_multiplier).min(params.volume_cap);
        let intensity =
            (self.sentiment_sum * params.sentiment_multiplier).min(params.sentiment_cap);
        let diversity = (self.article_count as f64 * params.diversity_multiplier)
            .min(params.diversity_cap);
        volume + intensity + diversity
    }
}

/// Accumulate stats per entity. Mentions whose article is missing are skipped.
pub fn aggregate_mentions(
    mentions: &[Mention],
    now: DateTime<Utc>,
    params: &ScoringParams,
) -> HashMap<EntityId, MentionStats> {
    let mut stats: HashMap<EntityId, MentionStats> = HashMap::new();

    for mention in mentions {
        if mention.article.is_none() {
            continue;
        }
        let decay = mention_decay(mention, now, params);
        stats
            .entry(mention.entity_id.clone())
            .or_default()
            .record(mention.weight_count(), mention.sentiment(), decay);
    }

    stats
}

/// Raw scores aligned with `ids`; entities without mentions score 0.
pub fn raw_scores<S: AsRef<str>>(
    ids: &[S],
    stats: &HashMap<EntityId, MentionStats>,
    params: &ScoringParams,
) -> Vec<f64> {
    ids.iter()
        .map(|id| {
            stats
                .get(id.as_ref())
                .map(|s| s.raw_score(params))
                .unwrap_or(0.0)
        })
        .collect()
}
