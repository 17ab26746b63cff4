use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("model artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model returned a non-finite probability: {0}")]
    InvalidProbability(f64),
}
