//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics exporter failed: {0}")]
    MetricsFailed(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] landmarks_pipeline::PipelineError),

    #[error("Face processor error: {0}")]
    Face(#[from] landmarks_faces::FaceError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn metrics_failed(msg: impl Into<String>) -> Self {
        Self::MetricsFailed(msg.into())
    }
}
