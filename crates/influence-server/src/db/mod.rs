pub mod models;
pub mod queries;

use async_trait::async_trait;
use clickhouse::Client;
use influence_core::{Asset, EntityId, InfluenceLogEntry, Mention, Person, Relationship};

use self::queries::{MentionTable, ScoreTable};
use crate::config::DatabaseConfig;
use crate::error::AppResult;
use crate::store::InfluenceStore;

#[derive(Clone)]
pub struct Database {
    client: Client,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Self {
        let mut client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database);

        if let Some(ref user) = config.user {
            client = client.with_user(user);
        }
        if let Some(ref password) = config.password {
            client = client.with_password(password);
        }

        tracing::info!(
            url = %config.url,
            database = %config.database,
            "Connecting to ClickHouse"
        );

        Self { client }
    }
}

#[async_trait]
impl InfluenceStore for Database {
    async fn fetch_people(&self) -> AppResult<Vec<Person>> {
        let rows = queries::get_people(&self.client).await?;
        Ok(rows.into_iter().map(Person::from).collect())
    }

    async fn fetch_assets(&self) -> AppResult<Vec<Asset>> {
        let rows = queries::get_assets(&self.client).await?;
        Ok(rows.into_iter().map(Asset::from).collect())
    }

    async fn fetch_person_mentions(&self) -> AppResult<Vec<Mention>> {
        let rows = queries::get_mentions(&self.client, MentionTable::Person).await?;
        rows.into_iter().map(Mention::try_from).collect()
    }

    async fn fetch_asset_mentions(&self) -> AppResult<Vec<Mention>> {
        let rows = queries::get_mentions(&self.client, MentionTable::Asset).await?;
        rows.into_iter().map(Mention::try_from).collect()
    }

    async fn fetch_relationships(
        &self,
        min_correlation: f64,
        min_co_mentions: u32,
    ) -> AppResult<Vec<Relationship>> {
        let rows = queries::get_relationships(&self.client, min_correlation, min_co_mentions).await?;
        Ok(rows.into_iter().map(Relationship::from).collect())
    }

    async fn update_person_scores(&self, scores: &[(EntityId, u8)]) -> AppResult<()> {
        queries::update_scores(&self.client, ScoreTable::People, scores).await
    }

    async fn append_influence_logs(&self, entries: &[InfluenceLogEntry]) -> AppResult<()> {
        queries::insert_influence_logs(&self.client, entries).await
    }

    async fn update_asset_scores(&self, scores: &[(EntityId, u8)]) -> AppResult<()> {
        queries::update_scores(&self.client, ScoreTable::Assets, scores).await
    }

    async fn upsert_relationship(&self, relationship: &Relationship) -> AppResult<()> {
        queries::upsert_relationship(&self.client, relationship).await
    }

    async fn health_check(&self) -> AppResult<()> {
        self.client.query("SELECT 1").execute().await?;
        Ok(())
    }
}
