//! Error type of the overlay pipeline

use shared::SdkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("triangulation failed: {0}")]
    Triangulation(String),

    #[error("settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings format: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
