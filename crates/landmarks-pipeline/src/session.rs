//! Pipeline session lifecycle.
//!
//! A session binds a frame source and a set of processors to a runner for
//! the lifetime of one capture session:
//!
//! ```text
//! Idle -> Starting -> Running -> Stopping -> Stopped
//!            |                                  ^
//!            +---------- acquire failure -------+
//! ```
//!
//! `start` is allowed again from `Stopped` with fresh processors.

use std::fmt;
use std::sync::Arc;

use rusttype::Font;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::admission::{frame_gate, Admission};
use crate::config::RunnerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::SessionLogger;
use crate::metrics;
use crate::processor::{FrameProcessor, ProcessorSet};
use crate::publisher::{SnapshotObserver, SnapshotPublisher};
use crate::runner::{cancelled, PipelineRunner};
use crate::source::FrameSource;

/// Lifecycle state of a [`PipelineSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl SessionState {
    /// Whether `start` is accepted in this state.
    pub fn can_start(&self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Stopped)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Running => "running",
            SessionState::Stopping => "stopping",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

struct ActiveSession {
    cancel_tx: watch::Sender<bool>,
    pump: JoinHandle<Box<dyn FrameSource>>,
    runner: JoinHandle<()>,
    processors: Arc<Mutex<ProcessorSet>>,
    logger: SessionLogger,
}

/// Owns the running pipeline for one capture session.
pub struct PipelineSession {
    id: Uuid,
    config: RunnerConfig,
    publisher: SnapshotPublisher,
    state_tx: watch::Sender<SessionState>,
    active: Option<ActiveSession>,
    font: Option<Arc<Font<'static>>>,
}

impl PipelineSession {
    pub fn new(config: RunnerConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            id: Uuid::new_v4(),
            config,
            publisher: SnapshotPublisher::new(),
            state_tx,
            active: None,
            font: None,
        }
    }

    /// Font used for overlay text.
    pub fn with_font(mut self, font: Option<Arc<Font<'static>>>) -> Self {
        self.font = font;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Receiver tracking state transitions.
    pub fn state_watch(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn publisher(&self) -> &SnapshotPublisher {
        &self.publisher
    }

    /// Observe published snapshots.
    pub fn snapshots(&self) -> SnapshotObserver {
        self.publisher.subscribe()
    }

    /// Acquire `source`, initialize `processors` and start processing frames.
    ///
    /// On failure every processor is released, the session ends `Stopped`
    /// and the error is returned.
    pub async fn start(
        &mut self,
        mut source: Box<dyn FrameSource>,
        processors: Vec<Box<dyn FrameProcessor>>,
    ) -> PipelineResult<()> {
        let state = self.state();
        if !state.can_start() {
            return Err(PipelineError::InvalidState {
                operation: "start",
                state,
            });
        }

        let logger = SessionLogger::new(&self.id, source.name());
        self.transition(&logger, SessionState::Starting);
        let mut processors = ProcessorSet::new(processors);

        if let Err(e) = source.acquire().await {
            logger.log_error(&format!("Frame source acquisition failed: {}", e));
            processors.release_all().await;
            source.release().await;
            self.transition(&logger, SessionState::Stopped);
            return Err(e);
        }

        if let Err(e) = processors.initialize_all().await {
            logger.log_error(&format!("Processor initialization failed: {}", e));
            processors.release_all().await;
            source.release().await;
            self.transition(&logger, SessionState::Stopped);
            return Err(e);
        }

        logger.log_info(&format!(
            "Source acquired, processors ready: [{}]",
            processors.names().join(", ")
        ));

        let processors = Arc::new(Mutex::new(processors));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (gate, frames) = frame_gate(self.config.admission);

        let runner = PipelineRunner::new(processors.clone(), self.config.clone(), self.publisher.clone())
            .with_font(self.font.clone());
        let runner_task = tokio::spawn({
            let cancel = cancel_rx.clone();
            async move { runner.run(frames, cancel).await }.instrument(logger.create_span())
        });

        let pump_task = tokio::spawn({
            let mut cancel = cancel_rx;
            async move {
                loop {
                    let frame = tokio::select! {
                        biased;
                        _ = cancelled(&mut cancel) => break,
                        frame = source.next_frame() => frame,
                    };
                    let Some(frame) = frame else {
                        debug!("Frame source ended");
                        break;
                    };
                    let admission = tokio::select! {
                        biased;
                        _ = cancelled(&mut cancel) => break,
                        admission = gate.offer(frame) => admission,
                    };
                    if admission == Admission::Closed {
                        break;
                    }
                }
                source
            }
            .instrument(logger.create_span())
        });

        self.active = Some(ActiveSession {
            cancel_tx,
            pump: pump_task,
            runner: runner_task,
            processors,
            logger: logger.clone(),
        });
        metrics::adjust_active_sessions(1.0);
        self.transition(&logger, SessionState::Running);
        Ok(())
    }

    /// Cancel in-flight work, stop reading frames and release every
    /// processor. Calling `stop` again is a no-op.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let logger = active.logger.clone();
        self.transition(&logger, SessionState::Stopping);
        shutdown(active).await;
        metrics::adjust_active_sessions(-1.0);
        self.transition(&logger, SessionState::Stopped);
    }

    fn transition(&self, logger: &SessionLogger, next: SessionState) {
        let previous = self.state_tx.send_replace(next);
        logger.log_transition(&previous.to_string(), &next.to_string());
    }
}

async fn shutdown(active: ActiveSession) {
    active.cancel_tx.send_replace(true);

    match active.pump.await {
        Ok(mut source) => source.release().await,
        Err(e) => active
            .logger
            .log_error(&format!("Frame pump task failed: {}", e)),
    }
    if let Err(e) = active.runner.await {
        active
            .logger
            .log_error(&format!("Runner task failed: {}", e));
    }

    active.processors.lock().await.release_all().await;
}

impl Drop for PipelineSession {
    fn drop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active
            .logger
            .log_warning("Session dropped while running, releasing in background");
        active.cancel_tx.send_replace(true);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    shutdown(active).await;
                    metrics::adjust_active_sessions(-1.0);
                });
            }
            Err(_) => active
                .logger
                .log_error("No runtime available, processors were not released"),
        }
    }
}
