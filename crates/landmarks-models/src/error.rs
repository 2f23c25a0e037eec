//! Model validation errors.

use thiserror::Error;

/// Result type for model construction.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when building model values from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i32),

    #[error("Frame size must be non-zero, got {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },
}
