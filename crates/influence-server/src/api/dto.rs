use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::RunSummary;

// ============================================================================
// GET /health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub last_run_at: Option<DateTime<Utc>>,
}

// ============================================================================
// POST /api/v1/influence/compute
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ComputeQuery {
    /// Reference time for decay. Defaults to the current time.
    pub as_of: Option<DateTime<Utc>>,
}

// ============================================================================
// POST /api/v1/influence/compute, GET /api/v1/influence/runs/latest
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl From<RunSummary> for RunResponse {
    fn from(summary: RunSummary) -> Self {
        Self {
            success: true,
            summary,
        }
    }
}
