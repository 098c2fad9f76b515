//! Error types for Influence Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfluenceError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type InfluenceResult<T> = Result<T, InfluenceError>;
