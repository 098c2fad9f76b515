//! Asset relatedness from shared article membership
//!
//! Two assets are related when the articles mentioning them overlap. The
//! measure is Jaccard similarity of their article-id sets; only pairs above
//! `similarity_threshold` become edges. Edges are stored in both directions
//! so propagation can walk from any asset to its neighbors.
//!
//! Pairwise comparison is quadratic in the number of mentioned assets, which
//! is fine for catalogs of a few thousand instruments.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{EntityId, Mention};
use crate::params::ScoringParams;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetSimilarity {
    edges: BTreeMap<EntityId, BTreeMap<EntityId, f64>>,
}

impl AssetSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symmetric edge. Self-edges are ignored.
    pub fn insert(&mut self, a: &str, b: &str, similarity: f64) {
        if a == b {
            return;
        }
        self.edges
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), similarity);
        self.edges
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), similarity);
    }

    pub fn get(&self, from: &str, to: &str) -> Option<f64> {
        self.edges.get(from).and_then(|n| n.get(to)).copied()
    }

    /// Neighbors of `asset` with their similarity
    pub fn neighbors<'a>(&'a self, asset: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.edges
            .get(asset)
            .into_iter()
            .flat_map(|n| n.iter().map(|(id, sim)| (id.as_str(), *sim)))
    }

    /// Number of directed edges (twice the number of related pairs)
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// `|a ∩ b| / |a ∪ b|`; zero when both sets are empty.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Build the similarity map from asset mentions.
pub fn build_asset_similarity(asset_mentions: &[Mention], params: &ScoringParams) -> AssetSimilarity {
    let mut articles_by_asset: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for am in asset_mentions {
        articles_by_asset
            .entry(am.entity_id.as_str())
            .or_default()
            .insert(am.article_id.as_str());
    }

    let assets: Vec<(&str, &BTreeSet<&str>)> =
        articles_by_asset.iter().map(|(id, set)| (*id, set)).collect();

    let mut similarity = AssetSimilarity::new();

    for (i, &(asset1, articles1)) in assets.iter().enumerate() {
        for &(asset2, articles2) in &assets[i + 1..] {
            if articles1.is_disjoint(articles2) {
                continue;
            }
            let sim = jaccard(articles1, articles2);
            if sim > params.similarity_threshold {
                similarity.insert(asset1, asset2, sim);
            }
        }
    }

    similarity
}
