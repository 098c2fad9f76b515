//! In-process store for tests.
//!
//! Writes can be made to fail per key to exercise the engine's
//! log-and-continue behavior. A batch containing a failing key fails whole.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use influence_core::{
    Asset, EntityId, InfluenceLogEntry, Mention, PairKey, Person, Relationship,
};
use tokio::sync::RwLock;

use super::InfluenceStore;
use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct FailurePlan {
    fetches: HashSet<&'static str>,
    person_writes: HashSet<String>,
    asset_writes: HashSet<String>,
    relationship_writes: HashSet<PairKey>,
    log_writes: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    people: RwLock<Vec<Person>>,
    assets: RwLock<Vec<Asset>>,
    person_mentions: RwLock<Vec<Mention>>,
    asset_mentions: RwLock<Vec<Mention>>,
    relationships: RwLock<BTreeMap<PairKey, Relationship>>,
    logs: RwLock<Vec<InfluenceLogEntry>>,
    failures: FailurePlan,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_people(mut self, people: Vec<Person>) -> Self {
        self.people = RwLock::new(people);
        self
    }

    pub fn with_assets(mut self, assets: Vec<Asset>) -> Self {
        self.assets = RwLock::new(assets);
        self
    }

    pub fn with_person_mentions(mut self, mentions: Vec<Mention>) -> Self {
        self.person_mentions = RwLock::new(mentions);
        self
    }

    pub fn with_asset_mentions(mut self, mentions: Vec<Mention>) -> Self {
        self.asset_mentions = RwLock::new(mentions);
        self
    }

    pub fn with_relationships(mut self, relationships: Vec<Relationship>) -> Self {
        self.relationships = RwLock::new(
            relationships
                .into_iter()
                .map(|r| (r.key(), r))
                .collect(),
        );
        self
    }

    /// Make a fetch fail: "people", "assets", "person_mentions",
    /// "asset_mentions" or "relationships".
    pub fn failing_fetch(mut self, what: &'static str) -> Self {
        self.failures.fetches.insert(what);
        self
    }

    pub fn failing_person_write(mut self, person_id: &str) -> Self {
        self.failures.person_writes.insert(person_id.to_string());
        self
    }

    pub fn failing_asset_write(mut self, asset_id: &str) -> Self {
        self.failures.asset_writes.insert(asset_id.to_string());
        self
    }

    pub fn failing_log_write(mut self) -> Self {
        self.failures.log_writes = true;
        self
    }

    pub fn failing_relationship_write(mut self, key: PairKey) -> Self {
        self.failures.relationship_writes.insert(key);
        self
    }

    pub async fn person(&self, person_id: &str) -> Option<Person> {
        self.people
            .read()
            .await
            .iter()
            .find(|p| p.id == person_id)
            .cloned()
    }

    pub async fn asset(&self, asset_id: &str) -> Option<Asset> {
        self.assets
            .read()
            .await
            .iter()
            .find(|a| a.id == asset_id)
            .cloned()
    }

    pub async fn relationship(&self, key: &PairKey) -> Option<Relationship> {
        self.relationships.read().await.get(key).cloned()
    }

    pub async fn relationships(&self) -> Vec<Relationship> {
        self.relationships.read().await.values().cloned().collect()
    }

    pub async fn logs(&self) -> Vec<InfluenceLogEntry> {
        self.logs.read().await.clone()
    }

    fn check_fetch(&self, what: &'static str) -> AppResult<()> {
        if self.failures.fetches.contains(what) {
            return Err(AppError::Store(format!("{} unavailable", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl InfluenceStore for MemoryStore {
    async fn fetch_people(&self) -> AppResult<Vec<Person>> {
        self.check_fetch("people")?;
        Ok(self.people.read().await.clone())
    }

    async fn fetch_assets(&self) -> AppResult<Vec<Asset>> {
        self.check_fetch("assets")?;
        Ok(self.assets.read().await.clone())
    }

    async fn fetch_person_mentions(&self) -> AppResult<Vec<Mention>> {
        self.check_fetch("person_mentions")?;
        Ok(self.person_mentions.read().await.clone())
    }

    async fn fetch_asset_mentions(&self) -> AppResult<Vec<Mention>> {
        self.check_fetch("asset_mentions")?;
        Ok(self.asset_mentions.read().await.clone())
    }

    async fn fetch_relationships(
        &self,
        min_correlation: f64,
        min_co_mentions: u32,
    ) -> AppResult<Vec<Relationship>> {
        self.check_fetch("relationships")?;
        Ok(self
            .relationships
            .read()
            .await
            .values()
            .filter(|r| {
                r.correlation_score >= min_correlation && r.co_mention_count >= min_co_mentions
            })
            .cloned()
            .collect())
    }

    async fn update_person_scores(&self, scores: &[(EntityId, u8)]) -> AppResult<()> {
        if let Some((id, _)) = scores
            .iter()
            .find(|(id, _)| self.failures.person_writes.contains(id))
        {
            return Err(AppError::Store(format!("write rejected for person {}", id)));
        }
        let mut people = self.people.write().await;
        for (id, score) in scores {
            if let Some(person) = people.iter_mut().find(|p| &p.id == id) {
                person.influence_score = *score;
            }
        }
        Ok(())
    }

    async fn append_influence_logs(&self, entries: &[InfluenceLogEntry]) -> AppResult<()> {
        if self.failures.log_writes {
            return Err(AppError::Store("influence log insert rejected".to_string()));
        }
        self.logs.write().await.extend_from_slice(entries);
        Ok(())
    }

    async fn update_asset_scores(&self, scores: &[(EntityId, u8)]) -> AppResult<()> {
        if let Some((id, _)) = scores
            .iter()
            .find(|(id, _)| self.failures.asset_writes.contains(id))
        {
            return Err(AppError::Store(format!("write rejected for asset {}", id)));
        }
        let mut assets = self.assets.write().await;
        for (id, score) in scores {
            if let Some(asset) = assets.iter_mut().find(|a| &a.id == id) {
                asset.influence_score = *score;
            }
        }
        Ok(())
    }

    async fn upsert_relationship(&self, relationship: &Relationship) -> AppResult<()> {
        let key = relationship.key();
        if self.failures.relationship_writes.contains(&key) {
            return Err(AppError::Store(format!("write rejected for relationship {}", key)));
        }
        self.relationships
            .write()
            .await
            .insert(key, relationship.clone());
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relationship(person: &str, asset: &str, correlation: f64, count: u32) -> Relationship {
        Relationship {
            person_id: person.to_string(),
            asset_id: asset.to_string(),
            correlation_score: correlation,
            influence_strength: 0,
            co_mention_count: count,
            last_co_mention_at: None,
        }
    }

    #[test]
    fn test_relationship_threshold_filter() {
        let store = MemoryStore::new().with_relationships(vec![
            relationship("musk", "tsla", 0.95, 60),
            relationship("musk", "rivn", 0.6, 3),
            relationship("cook", "aapl", 0.3, 90),
        ]);

        tokio_test::block_on(async {
            assert_eq!(store.fetch_relationships(0.9, 50).await.unwrap().len(), 1);
            assert_eq!(store.fetch_relationships(0.5, 0).await.unwrap().len(), 2);
        });
    }

    #[test]
    fn test_upsert_replaces_by_key() {
        let store = MemoryStore::new().with_relationships(vec![relationship("musk", "tsla", 0.2, 1)]);

        tokio_test::block_on(async {
            store
                .upsert_relationship(&relationship("musk", "tsla", 0.7, 4))
                .await
                .unwrap();

            let all = store.relationships().await;
            assert_eq!(all.len(), 1);
            assert_eq!(all[0].correlation_score, 0.7);
        });
    }

    #[test]
    fn test_injected_failures() {
        let store = MemoryStore::new()
            .failing_fetch("people")
            .failing_relationship_write(PairKey::new("musk", "tsla"));

        tokio_test::block_on(async {
            assert!(store.fetch_people().await.is_err());
            assert!(store.fetch_assets().await.is_ok());
            assert!(store
                .upsert_relationship(&relationship("musk", "tsla", 0.5, 1))
                .await
                .is_err());
        });
    }

    #[test]
    fn test_score_batch_is_all_or_nothing() {
        let store = MemoryStore::new()
            .with_people(vec![
                Person {
                    id: "musk".to_string(),
                    name: "Elon Musk".to_string(),
                    influence_score: 0,
                },
                Person {
                    id: "cook".to_string(),
                    name: "Tim Cook".to_string(),
                    influence_score: 0,
                },
            ])
            .failing_person_write("cook");

        tokio_test::block_on(async {
            let batch = vec![("musk".to_string(), 80), ("cook".to_string(), 60)];
            assert!(store.update_person_scores(&batch).await.is_err());
            assert_eq!(store.person("musk").await.unwrap().influence_score, 0);

            let batch = vec![("musk".to_string(), 80), ("ghost".to_string(), 10)];
            store.update_person_scores(&batch).await.unwrap();
            assert_eq!(store.person("musk").await.unwrap().influence_score, 80);
        });
    }
}
