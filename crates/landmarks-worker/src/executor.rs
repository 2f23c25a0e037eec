//! Wires the synthetic camera, face processor and snapshot logger together.

use std::future::Future;

use landmarks_faces::{ColorKeyBackend, FacesProcessor};
use landmarks_pipeline::{load_font, FrameProcessor, FrameSource, PipelineSession};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::observer::{ObserverSummary, SnapshotLogger};
use crate::synthetic::SyntheticCamera;

/// Runs one pipeline session until shutdown or the configured duration.
pub struct WorkerExecutor {
    config: WorkerConfig,
}

impl WorkerExecutor {
    pub fn new(config: WorkerConfig) -> WorkerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run against the synthetic camera.
    pub async fn run<F>(&self, shutdown: F) -> WorkerResult<ObserverSummary>
    where
        F: Future<Output = ()>,
    {
        let camera = SyntheticCamera::new(&self.config)?;
        self.run_with_source(Box::new(camera), shutdown).await
    }

    /// Run against any frame source.
    ///
    /// Returns once `shutdown` resolves or `run_duration` elapses; the session
    /// is stopped and every resource released before returning.
    pub async fn run_with_source<F>(
        &self,
        source: Box<dyn FrameSource>,
        shutdown: F,
    ) -> WorkerResult<ObserverSummary>
    where
        F: Future<Output = ()>,
    {
        let font = self.config.font_path.as_ref().map(load_font).transpose()?;
        if font.is_none() {
            warn!("WORKER_FONT_PATH not set, overlays will not include face info text");
        }
        let processors = self.build_processors()?;

        let mut session = PipelineSession::new(self.config.runner.clone()).with_font(font);
        let session_id = session.id();

        let (stop_tx, stop_rx) = watch::channel(false);
        let logger = SnapshotLogger::new(session.snapshots(), self.config.output_dir.clone());
        let observer = tokio::spawn(logger.run(stop_rx));

        if let Err(e) = session.start(source, processors).await {
            error!(%session_id, error = %e, "Failed to start session");
            stop_tx.send_replace(true);
            let _ = observer.await;
            return Err(e.into());
        }
        info!(%session_id, "Session running");

        let duration = self.config.run_duration;
        let elapsed = async move {
            match duration {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shutdown => info!(%session_id, "Shutdown requested"),
            _ = elapsed => info!(%session_id, "Run duration elapsed"),
        }

        session.stop().await;
        stop_tx.send_replace(true);
        let summary = observer
            .await
            .map_err(|e| WorkerError::TaskFailed(e.to_string()))?;

        info!(
            %session_id,
            snapshots = summary.snapshots,
            with_overlay = summary.with_overlay,
            faces = summary.faces,
            "Session finished"
        );
        Ok(summary)
    }

    fn build_processors(&self) -> WorkerResult<Vec<Box<dyn FrameProcessor>>> {
        let factory = ColorKeyBackend::factory(self.config.key_color, self.config.key_tolerance);
        let faces = FacesProcessor::new(self.config.face.clone(), factory)?;
        Ok(vec![Box::new(faces)])
    }
}
