use thiserror::Error;

/// Failures reported by the rendering SDK
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SdkError {
    #[error("draw conversion failed: {0}")]
    Conversion(String),

    #[error("entity {0} cannot be measured")]
    Unsupported(String),

    #[error("projection unavailable")]
    Projection,
}
