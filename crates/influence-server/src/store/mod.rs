//! Read/write contract between the scoring engine and the relational store
//!
//! The engine only ever reads people, assets, mentions and relationships, and
//! only ever writes entity scores, the person score log and relationship rows.

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use influence_core::{Asset, EntityId, InfluenceLogEntry, Mention, Person, Relationship};

use crate::error::AppResult;

#[cfg(test)]
pub use memory::MemoryStore;

#[async_trait]
pub trait InfluenceStore: Send + Sync {
    async fn fetch_people(&self) -> AppResult<Vec<Person>>;

    async fn fetch_assets(&self) -> AppResult<Vec<Asset>>;

    /// Person mentions joined with their article
    async fn fetch_person_mentions(&self) -> AppResult<Vec<Mention>>;

    /// Asset mentions joined with their article
    async fn fetch_asset_mentions(&self) -> AppResult<Vec<Mention>>;

    /// Stored relationships with `correlation_score >= min_correlation` and
    /// `co_mention_count >= min_co_mentions`
    async fn fetch_relationships(
        &self,
        min_correlation: f64,
        min_co_mentions: u32,
    ) -> AppResult<Vec<Relationship>>;

    /// Set `influence_score` for each listed person in one write. Unknown ids
    /// are ignored. The batch lands or fails as a whole.
    async fn update_person_scores(&self, scores: &[(EntityId, u8)]) -> AppResult<()>;

    /// Append one score log row per entry in one write.
    async fn append_influence_logs(&self, entries: &[InfluenceLogEntry]) -> AppResult<()>;

    /// Same contract as [`InfluenceStore::update_person_scores`].
    async fn update_asset_scores(&self, scores: &[(EntityId, u8)]) -> AppResult<()>;

    /// Insert or replace the row keyed by (person_id, asset_id)
    async fn upsert_relationship(&self, relationship: &Relationship) -> AppResult<()>;

    async fn health_check(&self) -> AppResult<()>;
}
