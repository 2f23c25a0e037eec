use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use landmarks_models::{FrameSize, Rotation, Scene};

/// The externally observable result of one processed frame.
///
/// Immutable once published; a newer snapshot supersedes it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Sequence number of the frame this snapshot was built from
    pub frame_sequence: u64,
    pub frame_size: FrameSize,
    pub rotation: Rotation,
    /// The camera frame, `None` when content is disabled
    pub content: Option<Arc<RgbaImage>>,
    /// Composited visualization, `None` when no processor drew
    pub overlay: Option<Arc<RgbaImage>>,
    /// Non-empty scenes in processor order
    pub scenes: Vec<Scene>,
    pub published_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Total objects across all scenes.
    pub fn object_count(&self) -> usize {
        self.scenes.iter().map(Scene::len).sum()
    }
}
