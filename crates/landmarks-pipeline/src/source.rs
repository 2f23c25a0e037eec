//! Frame sources and camera selection.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use landmarks_models::Rotation;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::frame::Frame;

/// A live supplier of decoded frames.
#[async_trait]
pub trait FrameSource: Send {
    fn name(&self) -> &str;

    /// Open the underlying device or stream.
    async fn acquire(&mut self) -> PipelineResult<()>;

    /// Wait for the next frame. `None` ends the stream.
    async fn next_frame(&mut self) -> Option<Frame>;

    /// Close the underlying device or stream.
    async fn release(&mut self) {}
}

/// Which way a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensFacing {
    Front,
    Back,
    External,
}

impl fmt::Display for LensFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LensFacing::Front => write!(f, "front"),
            LensFacing::Back => write!(f, "back"),
            LensFacing::External => write!(f, "external"),
        }
    }
}

/// An enumerated capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    pub id: String,
    pub label: String,
    pub facing: LensFacing,
}

impl CameraInfo {
    pub fn new(id: impl Into<String>, label: impl Into<String>, facing: LensFacing) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            facing,
        }
    }
}

/// Policy for picking a camera from the enumerated device list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CameraSelection {
    /// First enumerated camera
    #[default]
    First,
    /// Camera with this exact id
    ById(String),
    /// First camera facing this way
    Facing(LensFacing),
}

impl CameraSelection {
    /// Parse `first`, `front`, `back`, `external`, or treat anything else as an id.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "" | "first" => CameraSelection::First,
            "front" => CameraSelection::Facing(LensFacing::Front),
            "back" => CameraSelection::Facing(LensFacing::Back),
            "external" => CameraSelection::Facing(LensFacing::External),
            _ => CameraSelection::ById(value.trim().to_string()),
        }
    }

    pub fn select<'a>(&self, cameras: &'a [CameraInfo]) -> PipelineResult<&'a CameraInfo> {
        let found = match self {
            CameraSelection::First => cameras.first(),
            CameraSelection::ById(id) => cameras.iter().find(|c| &c.id == id),
            CameraSelection::Facing(facing) => cameras.iter().find(|c| c.facing == *facing),
        };
        found.ok_or_else(|| {
            PipelineError::source_unavailable(format!(
                "no camera matches {:?} among {} device(s)",
                self,
                cameras.len()
            ))
        })
    }
}

/// Push side of a [`ChannelFrameSource`]. Assigns sequence numbers.
#[derive(Debug, Clone)]
pub struct FrameSender {
    tx: mpsc::Sender<Frame>,
    next_sequence: Arc<AtomicU64>,
}

impl FrameSender {
    /// Push a frame, waiting for buffer space.
    pub async fn send(&self, image: impl Into<Arc<RgbaImage>>, rotation: Rotation) -> PipelineResult<u64> {
        let frame = self.frame(image, rotation);
        let sequence = frame.sequence();
        self.tx
            .send(frame)
            .await
            .map_err(|_| PipelineError::SourceClosed)?;
        Ok(sequence)
    }

    /// Push a frame without waiting. Returns `Ok(None)` when the buffer is full.
    pub fn try_send(
        &self,
        image: impl Into<Arc<RgbaImage>>,
        rotation: Rotation,
    ) -> PipelineResult<Option<u64>> {
        let frame = self.frame(image, rotation);
        let sequence = frame.sequence();
        match self.tx.try_send(frame) {
            Ok(()) => Ok(Some(sequence)),
            Err(mpsc::error::TrySendError::Full(_)) => Ok(None),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PipelineError::SourceClosed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn frame(&self, image: impl Into<Arc<RgbaImage>>, rotation: Rotation) -> Frame {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Frame::new(sequence, image, rotation)
    }
}

/// Frame source fed from callbacks through a [`FrameSender`].
pub struct ChannelFrameSource {
    name: String,
    rx: Option<mpsc::Receiver<Frame>>,
    acquired: bool,
}

/// Create a push-style source with room for `capacity` buffered frames.
pub fn channel_source(name: impl Into<String>, capacity: usize) -> (FrameSender, ChannelFrameSource) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        FrameSender {
            tx,
            next_sequence: Arc::new(AtomicU64::new(0)),
        },
        ChannelFrameSource {
            name: name.into(),
            rx: Some(rx),
            acquired: false,
        },
    )
}

#[async_trait]
impl FrameSource for ChannelFrameSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn acquire(&mut self) -> PipelineResult<()> {
        if self.rx.is_none() {
            return Err(PipelineError::source_unavailable(format!(
                "{} was already released",
                self.name
            )));
        }
        self.acquired = true;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Frame> {
        if !self.acquired {
            return None;
        }
        self.rx.as_mut()?.recv().await
    }

    async fn release(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            debug!(source = %self.name, "Channel source released");
        }
        self.acquired = false;
    }
}
