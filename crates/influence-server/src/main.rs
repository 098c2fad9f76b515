mod api;
mod config;
mod db;
mod engine;
mod error;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::db::Database;
use crate::engine::InfluenceEngine;
use crate::store::InfluenceStore;

pub use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InfluenceEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "influence=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    println!("================================================");
    println!("        INFLUENCE SCORING - Starting Up         ");
    println!("================================================");

    // Load configuration
    let config = AppConfig::load().map_err(|e| AppError::Config(e.to_string()))?;

    println!("[CONFIG] Server: {}:{}", config.server.host, config.server.port);
    println!("[CONFIG] Database: {} ({})", config.database.url, config.database.database);
    println!("[CONFIG] Write batch size: {}", config.database.write_batch_size);
    println!(
        "[CONFIG] Decay: half-life {}d, floor {} after {}d",
        config.scoring.half_life_days, config.scoring.stale_floor, config.scoring.max_decay_days
    );
    println!(
        "[CONFIG] Permanent links: correlation >= {}, co-mentions >= {}",
        config.scoring.permanent_min_correlation, config.scoring.permanent_min_co_mentions
    );
    println!("[CONFIG] Baseline: {:?}", config.scoring.baseline);

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting influence scoring server"
    );

    // Initialize database
    println!("[DB] Initializing ClickHouse connection...");
    let db = Database::new(&config.database);

    match db.health_check().await {
        Ok(_) => {
            println!("[DB] ClickHouse connected successfully");
            tracing::info!("Connected to ClickHouse");
        }
        Err(e) => {
            println!("[DB] WARNING: ClickHouse not available - {}", e);
            tracing::warn!(error = %e, "ClickHouse not available, runs will fail until it is reachable");
        }
    }

    let engine = InfluenceEngine::new(Arc::new(db), config.scoring.clone())
        .map_err(|e| anyhow::anyhow!("Invalid scoring parameters: {}", e))?
        .with_write_batch_size(config.database.write_batch_size);
    println!("[ENGINE] Scoring engine ready");

    let state = AppState {
        engine: Arc::new(engine),
    };

    // Build router
    println!("[ROUTER] Setting up API routes...");
    let app = Router::new()
        .merge(api::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    println!("[ROUTER] Routes configured: /health, /api/v1/influence/compute, /api/v1/influence/runs/latest");

    // Start server
    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("================================================");
    println!("  Server listening on http://{}", addr);
    println!("================================================");
    println!();

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
