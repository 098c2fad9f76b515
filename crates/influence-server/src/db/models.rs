use chrono::{DateTime, Utc};
use clickhouse::Row;
use influence_core::{ArticleRef, Asset, InfluenceLogEntry, Mention, Person, Relationship};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Timestamps travel as epoch milliseconds (`toUnixTimestamp64Milli`)
fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct PersonRow {
    pub id: String,
    pub name: String,
    pub influence_score: u8,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            influence_score: row.influence_score,
        }
    }
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct AssetRow {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub influence_score: u8,
}

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        Self {
            id: row.id,
            symbol: row.symbol,
            name: row.name,
            influence_score: row.influence_score,
        }
    }
}

/// A person or asset mention left-joined with its article
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct MentionRow {
    pub entity_id: String,
    pub article_id: String,
    pub mention_count: u32,
    pub created_at: i64,
    /// NULL when the article row is missing
    pub joined_article_id: Option<String>,
    pub sentiment_score: Option<f64>,
    pub published_at: Option<i64>,
    pub crawled_at: Option<i64>,
}

impl TryFrom<MentionRow> for Mention {
    type Error = AppError;

    fn try_from(row: MentionRow) -> Result<Self, Self::Error> {
        let created_at = from_millis(row.created_at).ok_or_else(|| {
            AppError::Store(format!(
                "mention {}/{} has out-of-range created_at {}",
                row.entity_id, row.article_id, row.created_at
            ))
        })?;

        let article = row.joined_article_id.map(|id| ArticleRef {
            id,
            sentiment_score: row.sentiment_score,
            published_at: row.published_at.and_then(from_millis),
            crawled_at: row.crawled_at.and_then(from_millis),
        });

        Ok(Self {
            entity_id: row.entity_id,
            article_id: row.article_id,
            mention_count: row.mention_count,
            created_at,
            article,
        })
    }
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub person_id: String,
    pub asset_id: String,
    pub correlation_score: f64,
    pub influence_strength: u8,
    pub co_mention_count: u32,
    pub last_co_mention_at: Option<i64>,
}

impl From<RelationshipRow> for Relationship {
    fn from(row: RelationshipRow) -> Self {
        Self {
            person_id: row.person_id,
            asset_id: row.asset_id,
            correlation_score: row.correlation_score,
            influence_strength: row.influence_strength,
            co_mention_count: row.co_mention_count,
            last_co_mention_at: row.last_co_mention_at.and_then(from_millis),
        }
    }
}

/// `logged_at` is a DateTime64(3) column, written as epoch millis
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct InfluenceLogRow {
    pub person_id: String,
    pub influence_score: u8,
    pub logged_at: i64,
}

impl From<&InfluenceLogEntry> for InfluenceLogRow {
    fn from(entry: &InfluenceLogEntry) -> Self {
        Self {
            person_id: entry.person_id.clone(),
            influence_score: entry.influence_score,
            logged_at: entry.logged_at.timestamp_millis(),
        }
    }
}
