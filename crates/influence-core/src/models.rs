//! Data model shared by the scoring phases
//!
//! People and assets are seeded elsewhere; the engine only ever writes their
//! `influence_score`. Articles and mentions are read-only inputs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a person, asset or article.
pub type EntityId = String;

// =============================================================================
// Entities
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Asset,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => write!(f, "person"),
            EntityKind::Asset => write!(f, "asset"),
        }
    }
}

/// A tracked public figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    /// Current score (0-100), owned by the engine
    #[serde(default)]
    pub influence_score: u8,
}

/// A tracked financial instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: EntityId,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub influence_score: u8,
}

// =============================================================================
// Corpus
// =============================================================================

/// The slice of a news article the engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub id: EntityId,
    /// Sentiment in [-1, 1], if the article has been analyzed
    pub sentiment_score: Option<f64>,
    pub published_at: Option<DateTime<Utc>>,
    pub crawled_at: Option<DateTime<Utc>>,
}

/// One entity (person or asset) mentioned in one article.
///
/// Upstream guarantees at most one mention record per (entity, article).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub entity_id: EntityId,
    pub article_id: EntityId,
    pub mention_count: u32,
    pub created_at: DateTime<Utc>,
    /// Joined article; `None` when the article row is missing
    pub article: Option<ArticleRef>,
}

impl Mention {
    /// Date used for decay: published, else crawled, else mention creation.
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.article
            .as_ref()
            .and_then(|a| a.published_at.or(a.crawled_at))
            .unwrap_or(self.created_at)
    }

    /// Mention count with a floor of one.
    pub fn weight_count(&self) -> u32 {
        self.mention_count.max(1)
    }

    pub fn sentiment(&self) -> Option<f64> {
        self.article.as_ref().and_then(|a| a.sentiment_score)
    }
}

// =============================================================================
// Relationship graph
// =============================================================================

/// Key of a person -> asset edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub person_id: EntityId,
    pub asset_id: EntityId,
}

impl PairKey {
    pub fn new(person_id: impl Into<EntityId>, asset_id: impl Into<EntityId>) -> Self {
        Self {
            person_id: person_id.into(),
            asset_id: asset_id.into(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.person_id, self.asset_id)
    }
}

/// A persisted person <-> asset edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub person_id: EntityId,
    pub asset_id: EntityId,
    /// Normalized edge weight in [0, 1], two decimals when written by the engine
    pub correlation_score: f64,
    /// `correlation_score * person score`, in [0, 100]
    pub influence_strength: u8,
    /// Direct co-mentions observed (undecayed)
    pub co_mention_count: u32,
    /// Latest direct co-mention; `None` for purely inferred edges
    pub last_co_mention_at: Option<DateTime<Utc>>,
}

impl Relationship {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.person_id.clone(), self.asset_id.clone())
    }
}

/// One row of the append-only person score history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenceLogEntry {
    pub person_id: EntityId,
    pub influence_score: u8,
    pub logged_at: DateTime<Utc>,
}

/// Final score of one entity for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub id: EntityId,
    pub raw_score: f64,
    pub score: u8,
    /// The normalized score was zero and the baseline was used instead
    pub baseline_applied: bool,
}
