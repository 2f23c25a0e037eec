//! Error types for face detection.

use landmarks_pipeline::PipelineError;
use thiserror::Error;

/// Result type for face processor operations.
pub type FaceResult<T> = Result<T, FaceError>;

/// Errors reported by a detection backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Detector unavailable: {0}")]
    Unavailable(String),

    #[error("Detection failed: {0}")]
    DetectionFailed(String),

    #[error("Detector closed")]
    Closed,

    #[error("Detection cancelled")]
    Cancelled,
}

impl BackendError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }
}

/// Errors from configuring or running the face processor.
#[derive(Debug, Error)]
pub enum FaceError {
    #[error("Invalid detector options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl FaceError {
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions(message.into())
    }
}

impl From<FaceError> for PipelineError {
    fn from(err: FaceError) -> Self {
        match err {
            FaceError::Backend(BackendError::Cancelled) => PipelineError::Cancelled,
            other => PipelineError::processor_init("faces", other.to_string()),
        }
    }
}
