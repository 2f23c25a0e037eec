//! Error types for pipeline operations.

use thiserror::Error;

use crate::session::SessionState;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur while running a frame pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Frame source closed")]
    SourceClosed,

    #[error("Processor '{processor}' failed to initialize: {message}")]
    ProcessorInit { processor: String, message: String },

    #[error("Processor '{processor}' failed: {message}")]
    ProcessingFailed { processor: String, message: String },

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("Cannot {operation} a session in state {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a source acquisition error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable(message.into())
    }

    /// Create a processor initialization error.
    pub fn processor_init(processor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessorInit {
            processor: processor.into(),
            message: message.into(),
        }
    }

    /// Create a per-processor failure.
    pub fn processing_failed(processor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessingFailed {
            processor: processor.into(),
            message: message.into(),
        }
    }

    /// Create a malformed frame error.
    pub fn malformed_frame(message: impl Into<String>) -> Self {
        Self::MalformedFrame(message.into())
    }

    /// Cancellation is a control-flow signal, not a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }

    /// Errors that abort `start` rather than a single frame.
    pub fn is_resource_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::SourceUnavailable(_) | PipelineError::ProcessorInit { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(PipelineError::Cancelled.is_cancellation());
        assert!(!PipelineError::Timeout(5).is_cancellation());
        assert!(PipelineError::source_unavailable("camera 2").is_resource_failure());
        assert!(PipelineError::processor_init("faces", "no model").is_resource_failure());
        assert!(!PipelineError::processing_failed("faces", "boom").is_resource_failure());
    }

    #[test]
    fn test_error_messages() {
        let err = PipelineError::processing_failed("faces", "backend crashed");
        assert_eq!(err.to_string(), "Processor 'faces' failed: backend crashed");
        let err = PipelineError::InvalidState {
            operation: "start",
            state: SessionState::Running,
        };
        assert_eq!(err.to_string(), "Cannot start a session in state running");
    }
}
