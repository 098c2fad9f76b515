use axum::{
    extract::{Query, State},
    Json,
};
use std::time::Instant;

use super::dto::*;
use crate::error::{AppError, AppResult};
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let start = Instant::now();
    println!("[REQUEST] GET /health");
    tracing::info!("Processing health check request");

    let db_status = match state.engine.store().health_check().await {
        Ok(_) => {
            tracing::debug!("Database health check passed");
            "connected"
        }
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status.to_string(),
        last_run_at: state.engine.last_run().await.map(|run| run.finished_at),
    };

    let duration = start.elapsed().as_millis();
    println!("[RESPONSE] GET /health -> 200 OK ({}ms) db={}", duration, db_status);
    tracing::info!(
        duration_ms = %duration,
        db_status = %db_status,
        "Health check completed"
    );

    Ok(Json(response))
}

pub async fn compute(
    State(state): State<AppState>,
    Query(query): Query<ComputeQuery>,
) -> AppResult<Json<RunResponse>> {
    let start = Instant::now();
    println!("[REQUEST] POST /api/v1/influence/compute");
    tracing::info!(as_of = ?query.as_of, "Processing compute request");

    let result = match query.as_of {
        Some(as_of) => state.engine.run_at(as_of).await,
        None => state.engine.run().await,
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            let duration = start.elapsed().as_millis();
            println!("[RESPONSE] POST /api/v1/influence/compute -> error ({}ms) {}", duration, e);
            return Err(e);
        }
    };

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] POST /api/v1/influence/compute -> 200 OK ({}ms) people={} assets={} relationships={} failures={}",
        duration,
        summary.people_updated,
        summary.assets_updated,
        summary.relationships_written,
        summary.write_failures
    );
    tracing::info!(
        run_id = %summary.run_id,
        duration_ms = %duration,
        "Compute request completed"
    );

    Ok(Json(summary.into()))
}

pub async fn latest_run(State(state): State<AppState>) -> AppResult<Json<RunResponse>> {
    println!("[REQUEST] GET /api/v1/influence/runs/latest");
    tracing::info!("Processing latest run request");

    let summary = state
        .engine
        .last_run()
        .await
        .ok_or_else(|| AppError::NotFound("no scoring run has completed".to_string()))?;

    println!(
        "[RESPONSE] GET /api/v1/influence/runs/latest -> 200 OK run_id={}",
        summary.run_id
    );
    tracing::debug!(run_id = %summary.run_id, "Latest run found");

    Ok(Json(summary.into()))
}
