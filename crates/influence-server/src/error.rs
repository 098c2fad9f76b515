use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use influence_core::InfluenceError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch {what}: {message}")]
    Fetch { what: &'static str, message: String },

    #[error("A scoring run is already in progress")]
    RunInProgress,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] clickhouse::error::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Scoring error: {0}")]
    Scoring(#[from] InfluenceError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn fetch(what: &'static str, source: AppError) -> Self {
        AppError::Fetch {
            what,
            message: source.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Fetch { what, message } => {
                tracing::error!(what = %what, message = %message, error_code = "DATA_FETCH_ERROR", "Required read failed");
                (StatusCode::BAD_GATEWAY, "DATA_FETCH_ERROR")
            }
            AppError::RunInProgress => {
                tracing::warn!(error_code = "RUN_IN_PROGRESS", "Rejected concurrent scoring run");
                (StatusCode::CONFLICT, "RUN_IN_PROGRESS")
            }
            AppError::NotFound(what) => {
                tracing::info!(what = %what, error_code = "NOT_FOUND", "Resource not found");
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, error_code = "DATABASE_ERROR", "Database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
            AppError::Store(msg) => {
                tracing::error!(message = %msg, error_code = "STORE_ERROR", "Store error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR")
            }
            AppError::Scoring(e) => {
                tracing::error!(error = %e, error_code = "SCORING_ERROR", "Scoring error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "SCORING_ERROR")
            }
            AppError::Config(msg) => {
                tracing::error!(message = %msg, error_code = "CONFIG_ERROR", "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
        };

        tracing::debug!(
            status_code = %status.as_u16(),
            error_code = %code,
            error_message = %self.to_string(),
            "Returning error response"
        );

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
