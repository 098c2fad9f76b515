//! Person <-> asset co-mention collection
//!
//! A person and an asset mentioned by the same article form a co-mention.
//! Asset mentions are grouped by article first, so the work is proportional
//! to the co-mentions actually present rather than a full cross product.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::decay::mention_decay;
use crate::models::{Mention, PairKey};
use crate::params::ScoringParams;

/// Accumulated evidence for one person -> asset edge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoMention {
    /// Direct co-mentions, undecayed
    pub count: u32,
    /// Decayed direct weight plus any propagated weight
    pub weighted_count: f64,
    /// Latest direct co-mention date
    pub last_mention: Option<DateTime<Utc>>,
}

impl CoMention {
    fn record(&mut self, decay: f64, date: DateTime<Utc>) {
        self.count += 1;
        self.weighted_count += decay;
        self.last_mention = Some(match self.last_mention {
            Some(previous) if previous >= date => previous,
            _ => date,
        });
    }
}

/// Sparse weighted bipartite adjacency, ordered by key for stable output.
pub type CoMentionMap = BTreeMap<PairKey, CoMention>;

/// Build the direct co-mention map. Decay and date come from the person
/// mention's article.
pub fn collect_co_mentions(
    person_mentions: &[Mention],
    asset_mentions: &[Mention],
    now: DateTime<Utc>,
    params: &ScoringParams,
) -> CoMentionMap {
    let mut assets_by_article: HashMap<&str, Vec<&Mention>> = HashMap::new();
    for am in asset_mentions {
        assets_by_article
            .entry(am.article_id.as_str())
            .or_default()
            .push(am);
    }

    let mut co_mentions = CoMentionMap::new();

    for pm in person_mentions {
        let Some(article_assets) = assets_by_article.get(pm.article_id.as_str()) else {
            continue;
        };

        let date = pm.effective_date();
        let decay = mention_decay(pm, now, params);

        for am in article_assets {
            co_mentions
                .entry(PairKey::new(pm.entity_id.clone(), am.entity_id.clone()))
                .or_default()
                .record(decay, date);
        }
    }

    co_mentions
}
