//! Structured session logging.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Logger carrying the session id and source name on every event.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    source: String,
}

impl SessionLogger {
    pub fn new(session_id: &Uuid, source: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            source: source.to_string(),
        }
    }

    /// Log a lifecycle transition.
    pub fn log_transition(&self, from: &str, to: &str) {
        info!(
            session_id = %self.session_id,
            source = %self.source,
            "Session state: {} -> {}", from, to
        );
    }

    pub fn log_info(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            source = %self.source,
            "Session: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            session_id = %self.session_id,
            source = %self.source,
            "Session warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            session_id = %self.session_id,
            source = %self.source,
            "Session error: {}", message
        );
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Span for work done on behalf of this session.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            source = %self.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_logger_fields() {
        let id = Uuid::new_v4();
        let logger = SessionLogger::new(&id, "camera-2");
        assert_eq!(logger.session_id(), id.to_string());
        assert_eq!(logger.source(), "camera-2");
    }
}
