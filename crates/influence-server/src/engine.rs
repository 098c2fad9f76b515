//! Batch scoring run
//!
//! A run is one full pass over the current mention corpus: snapshot, entity
//! scores, co-mentions, asset similarity, propagation, relationship writes.
//! Runs are serialized. A trigger that arrives while a run is in flight is
//! rejected, not queued.
//!
//! Reads are fatal on failure. Writes are independent per record or per
//! batch: a failed write is logged, counted and skipped. Entity scores and
//! score logs are written in batches of `write_batch_size`; a failed batch
//! counts every member as a failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use influence_core::{
    aggregate_mentions, build_asset_similarity, collect_co_mentions, materialize_relationships,
    propagate_indirect, score_population, Asset, Baseline, EntityId, EntityKind,
    InfluenceLogEntry, Mention, PermanentSet, Person, Relationship, ScoringParams,
};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::InfluenceStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Reference time for decay
    pub as_of: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub people_updated: usize,
    pub assets_updated: usize,
    /// Size of the co-mention map after propagation
    pub relationships_processed: usize,
    pub relationships_written: usize,
    pub relationships_skipped_permanent: usize,
    pub similarity_edges: usize,
    pub propagated_contributions: usize,
    pub write_failures: usize,
}

/// Everything a run reads, taken before the first write
struct Snapshot {
    permanent: PermanentSet,
    seeds: Vec<Relationship>,
    people: Vec<Person>,
    assets: Vec<Asset>,
    person_mentions: Vec<Mention>,
    asset_mentions: Vec<Mention>,
}

pub const DEFAULT_WRITE_BATCH_SIZE: usize = 500;

pub struct InfluenceEngine {
    store: Arc<dyn InfluenceStore>,
    params: ScoringParams,
    write_batch_size: usize,
    run_lock: Mutex<()>,
    last_run: RwLock<Option<RunSummary>>,
}

impl InfluenceEngine {
    pub fn new(store: Arc<dyn InfluenceStore>, params: ScoringParams) -> AppResult<Self> {
        params.validate()?;
        Ok(Self {
            store,
            params,
            write_batch_size: DEFAULT_WRITE_BATCH_SIZE,
            run_lock: Mutex::new(()),
            last_run: RwLock::new(None),
        })
    }

    /// Entities per score update and log insert. Zero is treated as one.
    pub fn with_write_batch_size(mut self, size: usize) -> Self {
        self.write_batch_size = size.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn InfluenceStore> {
        &self.store
    }

    pub async fn last_run(&self) -> Option<RunSummary> {
        self.last_run.read().await.clone()
    }

    /// Recompute everything as of now.
    pub async fn run(&self) -> AppResult<RunSummary> {
        self.run_at(Utc::now()).await
    }

    /// Recompute everything as of `now`, the reference time for decay.
    pub async fn run_at(&self, now: DateTime<Utc>) -> AppResult<RunSummary> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| AppError::RunInProgress)?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("influence_run", run_id = %run_id);
        let summary = self.execute(run_id, now).instrument(span).await?;

        *self.last_run.write().await = Some(summary.clone());
        Ok(summary)
    }

    #[cfg(test)]
    pub(crate) fn hold_run_lock(
        &self,
    ) -> Result<tokio::sync::MutexGuard<'_, ()>, tokio::sync::TryLockError> {
        self.run_lock.try_lock()
    }

    async fn execute(&self, run_id: Uuid, now: DateTime<Utc>) -> AppResult<RunSummary> {
        let start = Instant::now();
        let started_at = Utc::now();
        tracing::info!(now = %now, "Starting influence run");

        let snapshot = self.snapshot().await?;

        let mut summary = RunSummary {
            run_id,
            as_of: now,
            started_at,
            ..Default::default()
        };

        let mut baseline = Baseline::new(&self.params.baseline);
        let person_scores = self
            .write_person_scores(&snapshot, now, &mut baseline, &mut summary)
            .await;
        self.write_asset_scores(&snapshot, now, &mut baseline, &mut summary)
            .await;
        self.write_relationships(&snapshot, &person_scores, now, &mut summary)
            .await;

        summary.finished_at = Utc::now();

        tracing::info!(
            duration_ms = %start.elapsed().as_millis(),
            people_updated = %summary.people_updated,
            assets_updated = %summary.assets_updated,
            relationships_written = %summary.relationships_written,
            write_failures = %summary.write_failures,
            "Influence run completed"
        );

        Ok(summary)
    }

    async fn snapshot(&self) -> AppResult<Snapshot> {
        let start = Instant::now();

        let stored_permanent = self
            .store
            .fetch_relationships(
                self.params.permanent_min_correlation,
                self.params.permanent_min_co_mentions,
            )
            .await
            .map_err(|e| fetch_failed("permanent relationships", e))?;
        let permanent = PermanentSet::from_relationships(&stored_permanent, &self.params);

        let seeds = self
            .store
            .fetch_relationships(self.params.propagation_seed_threshold, 0)
            .await
            .map_err(|e| fetch_failed("propagation seeds", e))?;

        let people = self
            .store
            .fetch_people()
            .await
            .map_err(|e| fetch_failed("people", e))?;
        let assets = self
            .store
            .fetch_assets()
            .await
            .map_err(|e| fetch_failed("assets", e))?;
        let person_mentions = self
            .store
            .fetch_person_mentions()
            .await
            .map_err(|e| fetch_failed("person mentions", e))?;
        let asset_mentions = self
            .store
            .fetch_asset_mentions()
            .await
            .map_err(|e| fetch_failed("asset mentions", e))?;

        tracing::info!(
            duration_ms = %start.elapsed().as_millis(),
            permanent = %permanent.len(),
            seeds = %seeds.len(),
            people = %people.len(),
            assets = %assets.len(),
            person_mentions = %person_mentions.len(),
            asset_mentions = %asset_mentions.len(),
            "Snapshot loaded"
        );

        Ok(Snapshot {
            permanent,
            seeds,
            people,
            assets,
            person_mentions,
            asset_mentions,
        })
    }

    /// Returns the scores computed this run, whether or not each write landed.
    async fn write_person_scores(
        &self,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
        baseline: &mut Baseline,
        summary: &mut RunSummary,
    ) -> HashMap<EntityId, u8> {
        let stats = aggregate_mentions(&snapshot.person_mentions, now, &self.params);
        let ids: Vec<&str> = snapshot.people.iter().map(|p| p.id.as_str()).collect();
        let scored = score_population(&ids, &stats, EntityKind::Person, &self.params, baseline);

        let baseline_count = scored.iter().filter(|s| s.baseline_applied).count();

        let scores: Vec<(EntityId, u8)> = scored.iter().map(|s| (s.id.clone(), s.score)).collect();
        let written = self
            .write_score_batches(EntityKind::Person, &scores, summary)
            .await;
        summary.people_updated = written;

        let entries: Vec<InfluenceLogEntry> = scored
            .iter()
            .map(|s| InfluenceLogEntry {
                person_id: s.id.clone(),
                influence_score: s.score,
                logged_at: now,
            })
            .collect();
        for batch in entries.chunks(self.write_batch_size) {
            if let Err(e) = self.store.append_influence_logs(batch).await {
                tracing::warn!(batch_size = %batch.len(), error = %e, "Failed to append influence logs");
                summary.write_failures += batch.len();
            }
        }

        tracing::info!(
            people = %scored.len(),
            with_mentions = %stats.len(),
            baseline_applied = %baseline_count,
            "Person scores written"
        );

        scored.into_iter().map(|s| (s.id, s.score)).collect()
    }

    async fn write_asset_scores(
        &self,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
        baseline: &mut Baseline,
        summary: &mut RunSummary,
    ) {
        let stats = aggregate_mentions(&snapshot.asset_mentions, now, &self.params);
        let ids: Vec<&str> = snapshot.assets.iter().map(|a| a.id.as_str()).collect();
        let scored = score_population(&ids, &stats, EntityKind::Asset, &self.params, baseline);

        let scores: Vec<(EntityId, u8)> = scored.iter().map(|s| (s.id.clone(), s.score)).collect();
        let written = self
            .write_score_batches(EntityKind::Asset, &scores, summary)
            .await;
        summary.assets_updated = written;

        tracing::info!(
            assets = %scored.len(),
            with_mentions = %stats.len(),
            "Asset scores written"
        );
    }

    /// Returns how many scores landed.
    async fn write_score_batches(
        &self,
        kind: EntityKind,
        scores: &[(EntityId, u8)],
        summary: &mut RunSummary,
    ) -> usize {
        let mut written = 0;

        for batch in scores.chunks(self.write_batch_size) {
            let result = match kind {
                EntityKind::Person => self.store.update_person_scores(batch).await,
                EntityKind::Asset => self.store.update_asset_scores(batch).await,
            };
            match result {
                Ok(()) => written += batch.len(),
                Err(e) => {
                    tracing::warn!(
                        kind = %kind,
                        batch_size = %batch.len(),
                        error = %e,
                        "Failed to update score batch"
                    );
                    summary.write_failures += batch.len();
                }
            }
        }

        written
    }

    async fn write_relationships(
        &self,
        snapshot: &Snapshot,
        person_scores: &HashMap<EntityId, u8>,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) {
        let mut co_mentions = collect_co_mentions(
            &snapshot.person_mentions,
            &snapshot.asset_mentions,
            now,
            &self.params,
        );
        let direct_pairs = co_mentions.len();

        let similarity = build_asset_similarity(&snapshot.asset_mentions, &self.params);
        let contributions =
            propagate_indirect(&mut co_mentions, &snapshot.seeds, &similarity, &self.params);

        tracing::info!(
            direct_pairs = %direct_pairs,
            similarity_edges = %similarity.edge_count(),
            propagated = %contributions,
            total_pairs = %co_mentions.len(),
            "Relationship graph built"
        );

        let materialized = materialize_relationships(
            &co_mentions,
            person_scores,
            &snapshot.permanent,
            &self.params,
        );

        summary.relationships_processed = co_mentions.len();
        summary.relationships_skipped_permanent = materialized.skipped_permanent;
        summary.similarity_edges = similarity.edge_count();
        summary.propagated_contributions = contributions;

        for relationship in &materialized.updates {
            match self.store.upsert_relationship(relationship).await {
                Ok(()) => summary.relationships_written += 1,
                Err(e) => {
                    tracing::warn!(
                        person_id = %relationship.person_id,
                        asset_id = %relationship.asset_id,
                        error = %e,
                        "Failed to upsert relationship"
                    );
                    summary.write_failures += 1;
                }
            }
        }

        tracing::info!(
            written = %summary.relationships_written,
            skipped_permanent = %materialized.skipped_permanent,
            skipped_trivial = %materialized.skipped_trivial,
            max_weight = %materialized.max_weight,
            "Relationships written"
        );
    }
}

fn fetch_failed(what: &'static str, source: AppError) -> AppError {
    tracing::error!(what = %what, error = %source, "Required read failed, aborting run");
    AppError::fetch(what, source)
}
