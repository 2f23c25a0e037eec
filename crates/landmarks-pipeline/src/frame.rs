//! Decoded raster frames flowing through the pipeline.

use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use landmarks_models::{FrameSize, Rotation};

use crate::error::{PipelineError, PipelineResult};

/// One decoded raster image from a capture source.
///
/// Cloning is cheap: pixel data is shared behind an `Arc` and never mutated
/// once the frame is created.
#[derive(Debug, Clone)]
pub struct Frame {
    sequence: u64,
    image: Arc<RgbaImage>,
    rotation: Rotation,
    captured_at: Instant,
}

impl Frame {
    pub fn new(sequence: u64, image: impl Into<Arc<RgbaImage>>, rotation: Rotation) -> Self {
        Self {
            sequence,
            image: image.into(),
            rotation,
            captured_at: Instant::now(),
        }
    }

    /// Producer-assigned, monotonically increasing frame number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// Validated pixel extent of the frame.
    pub fn frame_size(&self) -> PipelineResult<FrameSize> {
        let (width, height) = self.image.dimensions();
        FrameSize::new(width, height).map_err(|e| {
            PipelineError::malformed_frame(format!("frame #{}: {}", self.sequence, e))
        })
    }
}
