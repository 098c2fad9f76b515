use clickhouse::Client;
use std::time::Instant;

use super::models::{AssetRow, InfluenceLogRow, MentionRow, PersonRow, RelationshipRow};
use crate::error::AppResult;
use influence_core::{EntityId, InfluenceLogEntry, Relationship};

pub async fn get_people(client: &Client) -> AppResult<Vec<PersonRow>> {
    let start = Instant::now();
    tracing::debug!(query = "get_people", "Executing database query");

    let query = r#"
        SELECT id, name, influence_score
        FROM people
        ORDER BY id
    "#;

    let rows: Vec<PersonRow> = client.query(query).fetch_all().await?;

    tracing::debug!(
        query = "get_people",
        duration_ms = %start.elapsed().as_millis(),
        row_count = %rows.len(),
        "Database query completed"
    );

    Ok(rows)
}

pub async fn get_assets(client: &Client) -> AppResult<Vec<AssetRow>> {
    let start = Instant::now();
    tracing::debug!(query = "get_assets", "Executing database query");

    let query = r#"
        SELECT id, symbol, name, influence_score
        FROM assets
        ORDER BY id
    "#;

    let rows: Vec<AssetRow> = client.query(query).fetch_all().await?;

    tracing::debug!(
        query = "get_assets",
        duration_ms = %start.elapsed().as_millis(),
        row_count = %rows.len(),
        "Database query completed"
    );

    Ok(rows)
}

/// Which mention table to read
#[derive(Debug, Clone, Copy)]
pub enum MentionTable {
    Person,
    Asset,
}

impl MentionTable {
    fn table(&self) -> &'static str {
        match self {
            MentionTable::Person => "person_mentions",
            MentionTable::Asset => "asset_mentions",
        }
    }

    fn entity_column(&self) -> &'static str {
        match self {
            MentionTable::Person => "person_id",
            MentionTable::Asset => "asset_id",
        }
    }
}

pub async fn get_mentions(client: &Client, source: MentionTable) -> AppResult<Vec<MentionRow>> {
    let start = Instant::now();
    tracing::debug!(table = %source.table(), query = "get_mentions", "Executing database query");

    // join_use_nulls turns unmatched article columns into NULL instead of defaults
    let query = format!(
        r#"
        SELECT
            m.{entity} AS entity_id,
            m.article_id AS article_id,
            m.mention_count AS mention_count,
            toUnixTimestamp64Milli(m.created_at) AS created_at,
            a.id AS joined_article_id,
            a.sentiment_score AS sentiment_score,
            toUnixTimestamp64Milli(a.published_at) AS published_at,
            toUnixTimestamp64Milli(a.crawled_at) AS crawled_at
        FROM {table} AS m
        LEFT JOIN news_articles AS a ON a.id = m.article_id
        ORDER BY m.article_id, entity_id
        SETTINGS join_use_nulls = 1
        "#,
        entity = source.entity_column(),
        table = source.table(),
    );

    let rows: Vec<MentionRow> = client.query(&query).fetch_all().await?;

    tracing::debug!(
        table = %source.table(),
        query = "get_mentions",
        duration_ms = %start.elapsed().as_millis(),
        row_count = %rows.len(),
        "Database query completed"
    );

    Ok(rows)
}

pub async fn get_relationships(
    client: &Client,
    min_correlation: f64,
    min_co_mentions: u32,
) -> AppResult<Vec<RelationshipRow>> {
    let start = Instant::now();
    tracing::debug!(
        min_correlation = %min_correlation,
        min_co_mentions = %min_co_mentions,
        query = "get_relationships",
        "Executing database query"
    );

    let query = r#"
        SELECT
            person_id,
            asset_id,
            correlation_score,
            influence_strength,
            co_mention_count,
            toUnixTimestamp64Milli(last_co_mention_at) AS last_co_mention_at
        FROM person_asset_relationships FINAL
        WHERE correlation_score >= ? AND co_mention_count >= ?
        ORDER BY person_id, asset_id
    "#;

    let rows: Vec<RelationshipRow> = client
        .query(query)
        .bind(min_correlation)
        .bind(min_co_mentions)
        .fetch_all()
        .await?;

    tracing::debug!(
        query = "get_relationships",
        duration_ms = %start.elapsed().as_millis(),
        row_count = %rows.len(),
        "Database query completed"
    );

    Ok(rows)
}

/// Which entity table a score batch targets
#[derive(Debug, Clone, Copy)]
pub enum ScoreTable {
    People,
    Assets,
}

impl ScoreTable {
    fn table(&self) -> &'static str {
        match self {
            ScoreTable::People => "people",
            ScoreTable::Assets => "assets",
        }
    }
}

/// One mutation for the whole batch: `transform` maps each id to its new
/// score, rows outside the batch are left alone.
pub async fn update_scores(
    client: &Client,
    target: ScoreTable,
    scores: &[(EntityId, u8)],
) -> AppResult<()> {
    if scores.is_empty() {
        return Ok(());
    }

    let start = Instant::now();
    tracing::debug!(
        table = %target.table(),
        batch_size = %scores.len(),
        query = "update_scores",
        "Executing database update"
    );

    let (ids, values): (Vec<&str>, Vec<u8>) =
        scores.iter().map(|(id, score)| (id.as_str(), *score)).unzip();

    let query = format!(
        r#"
        ALTER TABLE {table}
        UPDATE
            influence_score = transform(id, ?, ?, influence_score),
            updated_at = now64(3)
        WHERE has(?, id)
        "#,
        table = target.table(),
    );

    client
        .query(&query)
        .bind(&ids)
        .bind(&values)
        .bind(&ids)
        .execute()
        .await?;

    tracing::debug!(
        table = %target.table(),
        query = "update_scores",
        duration_ms = %start.elapsed().as_millis(),
        "Database update completed"
    );

    Ok(())
}

pub async fn insert_influence_logs(client: &Client, entries: &[InfluenceLogEntry]) -> AppResult<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let start = Instant::now();
    tracing::debug!(batch_size = %entries.len(), query = "insert_influence_logs", "Executing database insert");

    let mut insert = client.insert::<InfluenceLogRow>("influence_logs")?;
    for entry in entries {
        insert.write(&InfluenceLogRow::from(entry)).await?;
    }
    insert.end().await?;

    tracing::debug!(
        query = "insert_influence_logs",
        duration_ms = %start.elapsed().as_millis(),
        "Database insert completed"
    );

    Ok(())
}

/// ReplacingMergeTree keyed by (person_id, asset_id); the latest `updated_at` wins.
pub async fn upsert_relationship(client: &Client, relationship: &Relationship) -> AppResult<()> {
    let start = Instant::now();
    tracing::debug!(
        person_id = %relationship.person_id,
        asset_id = %relationship.asset_id,
        query = "upsert_relationship",
        "Executing database insert"
    );

    let query = r#"
        INSERT INTO person_asset_relationships (
            person_id, asset_id, correlation_score, influence_strength,
            co_mention_count, last_co_mention_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, fromUnixTimestamp64Milli(?), now64(3))
    "#;

    client
        .query(query)
        .bind(&relationship.person_id)
        .bind(&relationship.asset_id)
        .bind(relationship.correlation_score)
        .bind(relationship.influence_strength)
        .bind(relationship.co_mention_count)
        .bind(relationship.last_co_mention_at.map(|t| t.timestamp_millis()))
        .execute()
        .await?;

    tracing::debug!(
        person_id = %relationship.person_id,
        asset_id = %relationship.asset_id,
        query = "upsert_relationship",
        duration_ms = %start.elapsed().as_millis(),
        "Database insert completed"
    );

    Ok(())
}
