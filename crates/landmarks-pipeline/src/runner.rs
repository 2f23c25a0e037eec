//! Per-frame processor pipeline.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use landmarks_models::Scene;
use rusttype::Font;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, trace, warn, Instrument};

use crate::canvas::RasterCanvas;
use crate::config::RunnerConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::frame::Frame;
use crate::metrics;
use crate::processor::ProcessorSet;
use crate::publisher::SnapshotPublisher;
use crate::snapshot::Snapshot;

/// What happened to a frame handed to the runner.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    Published(Arc<Snapshot>),
    /// Frame could not be processed; nothing was published
    Skipped,
}

impl FrameOutcome {
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            FrameOutcome::Published(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Drives the ordered processor list over frames and publishes one snapshot
/// per processed frame.
#[derive(Clone)]
pub struct PipelineRunner {
    processors: Arc<Mutex<ProcessorSet>>,
    config: RunnerConfig,
    publisher: SnapshotPublisher,
    font: Option<Arc<Font<'static>>>,
}

impl PipelineRunner {
    pub fn new(
        processors: Arc<Mutex<ProcessorSet>>,
        config: RunnerConfig,
        publisher: SnapshotPublisher,
    ) -> Self {
        Self {
            processors,
            config,
            publisher,
            font: None,
        }
    }

    /// Font used for overlay text.
    pub fn with_font(mut self, font: Option<Arc<Font<'static>>>) -> Self {
        self.font = font;
        self
    }

    pub fn publisher(&self) -> &SnapshotPublisher {
        &self.publisher
    }

    /// Consume admitted frames until the queue closes or `cancel` flips.
    ///
    /// Frames are handled strictly one after another, so snapshots are
    /// published in admission order.
    pub async fn run(&self, mut frames: mpsc::Receiver<Frame>, mut cancel: watch::Receiver<bool>) {
        loop {
            let frame = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                frame = frames.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };

            let sequence = frame.sequence();
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => {
                    debug!(sequence, "Frame abandoned on stop");
                    metrics::record_frame_abandoned();
                    break;
                }
                outcome = self.run_frame(frame) => {
                    trace!(sequence, ?outcome, "Frame settled");
                }
            }
        }
        debug!("Runner loop finished");
    }

    /// Process one frame through every processor and publish the result.
    pub async fn run_frame(&self, frame: Frame) -> FrameOutcome {
        let span = tracing::debug_span!("frame", sequence = frame.sequence());
        async {
            let started = Instant::now();
            let outcome = match self.process_frame(&frame).await {
                Ok(snapshot) => {
                    let published = self.publisher.publish(snapshot);
                    metrics::record_frame_latency(frame.captured_at().elapsed().as_secs_f64());
                    FrameOutcome::Published(published)
                }
                Err(e) => {
                    warn!(error = %e, "Skipping frame");
                    metrics::record_frame_malformed();
                    FrameOutcome::Skipped
                }
            };
            metrics::record_frame_duration(started.elapsed().as_secs_f64());
            outcome
        }
        .instrument(span)
        .await
    }

    /// Build the snapshot for `frame`.
    ///
    /// A processor that fails, times out or cancels its own call only loses
    /// its scene. Abandoning the whole frame is left to the session's cancel
    /// signal in [`run`](Self::run).
    async fn process_frame(&self, frame: &Frame) -> PipelineResult<Snapshot> {
        let frame_size = frame.frame_size()?;
        let mut processors = self.processors.lock().await;
        let timeout = self.config.process_timeout;

        let calls = processors.processors_mut().map(|processor| async move {
            let name = processor.name().to_string();
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, processor.process(frame))
                    .await
                    .unwrap_or_else(|_| Err(PipelineError::Timeout(limit.as_millis() as u64))),
                None => processor.process(frame).await,
            };
            (name, result)
        });
        let results = join_all(calls).await;

        let mut scenes: Vec<(usize, Scene)> = Vec::new();
        for (index, (name, result)) in results.into_iter().enumerate() {
            match result {
                Ok(Some(scene)) if !scene.is_empty() => {
                    metrics::record_objects_detected(&name, scene.len());
                    scenes.push((index, scene));
                }
                Ok(_) => {}
                Err(PipelineError::Cancelled) => {
                    debug!(processor = %name, "Processor cancelled its call");
                }
                Err(e @ PipelineError::MalformedFrame(_)) => return Err(e),
                Err(PipelineError::Timeout(ms)) => {
                    warn!(processor = %name, timeout_ms = ms, "Processor timed out");
                    metrics::record_processor_timeout(&name);
                }
                Err(e) => {
                    warn!(processor = %name, error = %e, "Processor failed");
                    metrics::record_processor_failure(&name);
                }
            }
        }

        let overlay = if self.config.visualization_enabled {
            let mut canvas = RasterCanvas::new(frame_size).with_font(self.font.clone());
            for (index, scene) in &scenes {
                if let Some(processor) = processors.processor(*index) {
                    processor.render_visualization(scene, frame, &mut canvas);
                }
            }
            (canvas.is_touched() || self.config.force_overlay)
                .then(|| Arc::new(canvas.into_image()))
        } else {
            None
        };
        drop(processors);

        Ok(Snapshot {
            frame_sequence: frame.sequence(),
            frame_size,
            rotation: frame.rotation(),
            content: self
                .config
                .content_enabled
                .then(|| frame.image().clone()),
            overlay,
            scenes: scenes.into_iter().map(|(_, scene)| scene).collect(),
            published_at: Utc::now(),
        })
    }
}

/// Resolves once the cancel flag is set or its sender is gone.
pub(crate) async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|flag| *flag).await;
}
