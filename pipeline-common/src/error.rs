//! Error types for the publishing pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("classifier returned malformed output: {0}")]
    ClassifierMalformed(String),

    #[error("outbound delivery failed: {0}")]
    Delivery(String),

    #[error("round precondition violated: {0}")]
    Precondition(String),

    #[error("configuration error: {0}")]
    Config(String),
}
