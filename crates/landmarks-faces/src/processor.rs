//! Face detection frame processor.

use std::sync::Arc;

use async_trait::async_trait;
use landmarks_models::Scene;
use landmarks_pipeline::metrics::record_processor_failure;
use landmarks_pipeline::{Canvas, Frame, FrameProcessor, PipelineError, PipelineResult};
use tracing::{debug, info, warn};

use crate::backend::{BackendFactory, FaceDetectionBackend};
use crate::error::{BackendError, FaceError, FaceResult};
use crate::mapping::to_scene_object;
use crate::options::FaceDetectorOptions;
use crate::visualization::{DefaultFaceVisualization, FaceVisualization};

const PROCESSOR_NAME: &str = "faces";

/// Frame processor producing `face` objects from a detection backend.
pub struct FacesProcessor {
    options: FaceDetectorOptions,
    factory: Arc<dyn BackendFactory>,
    backend: Option<Box<dyn FaceDetectionBackend>>,
    visualization: FaceVisualization,
    released: bool,
}

impl FacesProcessor {
    /// Create a processor. Options are validated here; the backend is only
    /// created on [`initialize`](FrameProcessor::initialize).
    pub fn new(options: FaceDetectorOptions, factory: Arc<dyn BackendFactory>) -> FaceResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            factory,
            backend: None,
            visualization: DefaultFaceVisualization::default().into_hook(),
            released: false,
        })
    }

    /// Replace the default overlay drawing.
    pub fn with_visualization(mut self, visualization: FaceVisualization) -> Self {
        self.visualization = visualization;
        self
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn create_backend(&mut self) -> FaceResult<&mut Box<dyn FaceDetectionBackend>> {
        if self.released {
            return Err(FaceError::Backend(BackendError::Closed));
        }
        if self.backend.is_none() {
            let backend = self.factory.create(&self.options)?;
            info!(
                backend = %backend.name(),
                mode = ?self.options.performance_mode(),
                landmarks = self.options.detect_landmarks,
                classification = self.options.detect_classification,
                tracking = self.options.tracking_enabled,
                min_face_size = self.options.min_face_size,
                "Face detector created"
            );
            self.backend = Some(backend);
        }
        self.backend
            .as_mut()
            .ok_or(FaceError::Backend(BackendError::Closed))
    }
}

#[async_trait]
impl FrameProcessor for FacesProcessor {
    fn name(&self) -> &str {
        PROCESSOR_NAME
    }

    async fn initialize(&mut self) -> PipelineResult<()> {
        self.create_backend().map(|_| ()).map_err(PipelineError::from)
    }

    async fn process(&mut self, frame: &Frame) -> PipelineResult<Option<Scene>> {
        let frame_size = frame.frame_size()?;
        let backend = self
            .create_backend()
            .map_err(|e| PipelineError::processing_failed(PROCESSOR_NAME, e.to_string()))?;

        let faces = match backend.detect(frame.image(), frame.rotation()).await {
            Ok(faces) => faces,
            Err(BackendError::Cancelled) => return Err(PipelineError::Cancelled),
            Err(e) => {
                warn!(sequence = frame.sequence(), error = %e, "Face detection failed");
                record_processor_failure(PROCESSOR_NAME);
                return Ok(None);
            }
        };

        if faces.is_empty() {
            return Ok(None);
        }
        debug!(sequence = frame.sequence(), faces = faces.len(), "Faces detected");
        let objects = faces.iter().map(to_scene_object).collect();
        Ok(Some(Scene::new(frame_size, objects)))
    }

    fn render_visualization(&self, scene: &Scene, _frame: &Frame, canvas: &mut dyn Canvas) {
        (self.visualization)(scene, canvas);
    }

    async fn release(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.close().await;
            debug!(backend = %backend.name(), "Face detector closed");
        }
        self.released = true;
    }
}
