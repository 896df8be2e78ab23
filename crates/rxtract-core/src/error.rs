use thiserror::Error;

use crate::ingest::{ExtractionError, NormalizationError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Unknown extraction strategy: {0}")]
    InvalidStrategy(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
