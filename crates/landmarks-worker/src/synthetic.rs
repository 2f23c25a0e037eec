//! Synthetic camera producing frames with moving key-colored markers.

use std::time::Duration;

use async_trait::async_trait;
use landmarks_models::{BoundingBox, FrameSize, Rotation};
use landmarks_pipeline::{
    CameraInfo, CameraSelection, Canvas, Color, Frame, FrameSource, LensFacing, Paint,
    PipelineResult, RasterCanvas,
};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

const BACKGROUND: Color = Color::rgb(32, 32, 40);

/// Devices the synthetic camera pretends to enumerate.
pub fn synthetic_cameras() -> Vec<CameraInfo> {
    vec![
        CameraInfo::new("0", "Synthetic back camera", LensFacing::Back),
        CameraInfo::new("1", "Synthetic front camera", LensFacing::Front),
        CameraInfo::new("2", "Synthetic USB camera", LensFacing::External),
    ]
}

/// Frame source drawing moving markers at a fixed frame rate.
pub struct SyntheticCamera {
    cameras: Vec<CameraInfo>,
    selection: CameraSelection,
    selected: Option<CameraInfo>,
    size: FrameSize,
    frame_interval: Duration,
    markers: u32,
    key: Color,
    max_frames: Option<u64>,
    ticker: Option<Interval>,
    sequence: u64,
}

impl SyntheticCamera {
    pub fn new(config: &WorkerConfig) -> WorkerResult<Self> {
        let size = FrameSize::new(config.frame_width, config.frame_height)
            .map_err(|e| WorkerError::config_error(e.to_string()))?;
        Ok(Self {
            cameras: synthetic_cameras(),
            selection: config.camera.clone(),
            selected: None,
            size,
            frame_interval: config.frame_interval(),
            markers: config.markers,
            key: config.key_color,
            max_frames: None,
            ticker: None,
            sequence: 0,
        })
    }

    /// End the stream after `frames` frames.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn selected(&self) -> Option<&CameraInfo> {
        self.selected.as_ref()
    }

    /// Draw frame `sequence`: markers follow independent Lissajous paths.
    pub fn render(&self, sequence: u64) -> image::RgbaImage {
        let mut canvas = RasterCanvas::new(self.size);
        let (w, h) = (self.size.width as f32, self.size.height as f32);
        canvas.draw_rect(&BoundingBox::new(0.0, 0.0, w, h), &Paint::fill(BACKGROUND));

        let side = w.min(h) * 0.25;
        let t = sequence as f32 * self.frame_interval.as_secs_f32();
        for i in 0..self.markers {
            let phase = i as f32 * 2.1;
            let speed = 0.6 + 0.25 * i as f32;
            let x = (w - side) * (0.5 + 0.45 * (t * speed + phase).sin());
            let y = (h - side) * (0.5 + 0.45 * (t * speed * 0.8 + phase).cos());
            canvas.draw_rect(&BoundingBox::new(x, y, side, side), &Paint::fill(self.key));
        }
        canvas.into_image()
    }

    fn rotation(&self) -> Rotation {
        match self.selected.as_ref().map(|c| c.facing) {
            Some(LensFacing::Front) => Rotation::Degrees270,
            Some(LensFacing::Back) => Rotation::Degrees90,
            _ => Rotation::Degrees0,
        }
    }
}

#[async_trait]
impl FrameSource for SyntheticCamera {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn acquire(&mut self) -> PipelineResult<()> {
        let camera = self.selection.select(&self.cameras)?.clone();
        info!(
            camera_id = %camera.id,
            label = %camera.label,
            facing = %camera.facing,
            width = self.size.width,
            height = self.size.height,
            "Synthetic camera opened"
        );
        let mut ticker = interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        self.selected = Some(camera);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Frame> {
        if self.max_frames.is_some_and(|max| self.sequence >= max) {
            return None;
        }
        self.ticker.as_mut()?.tick().await;
        self.sequence += 1;
        Some(Frame::new(self.sequence, self.render(self.sequence), self.rotation()))
    }

    async fn release(&mut self) {
        if let Some(camera) = self.selected.take() {
            debug!(camera_id = %camera.id, frames = self.sequence, "Synthetic camera closed");
        }
        self.ticker = None;
    }
}
