//! Real-time frame analysis pipeline.
//!
//! Frames from a [`FrameSource`] pass through an ordered list of
//! [`FrameProcessor`]s. Each processor may produce a
//! [`Scene`](landmarks_models::Scene) and draw it onto a shared overlay; the
//! [`PipelineRunner`] publishes one [`Snapshot`] per frame through a
//! single-slot [`SnapshotPublisher`]. A [`PipelineSession`] owns the whole
//! arrangement for one capture session and releases every processor on stop.

pub mod admission;
pub mod canvas;
pub mod config;
pub mod error;
pub mod frame;
pub mod logging;
pub mod metrics;
pub mod processor;
pub mod publisher;
pub mod runner;
pub mod session;
pub mod snapshot;
pub mod source;

pub use admission::{frame_gate, Admission, FrameGate};
pub use canvas::{load_font, Canvas, Color, DrawOp, Paint, PaintStyle, RasterCanvas, RecordingCanvas};
pub use config::{AdmissionPolicy, RunnerConfig};
pub use error::{PipelineError, PipelineResult};
pub use frame::Frame;
pub use logging::SessionLogger;
pub use processor::{FrameProcessor, ProcessorSet};
pub use publisher::{SnapshotObserver, SnapshotPublisher};
pub use runner::{FrameOutcome, PipelineRunner};
pub use session::{PipelineSession, SessionState};
pub use snapshot::Snapshot;
pub use source::{
    channel_source, CameraInfo, CameraSelection, ChannelFrameSource, FrameSender, FrameSource,
    LensFacing,
};
