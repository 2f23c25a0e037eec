use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, FrameSize};
use crate::landmark::Landmark;
use crate::param::ObjectParam;

/// One detected entity in a frame.
///
/// A new frame yields entirely new objects; identity across frames is
/// expressed only by equal `tracking_id`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Entity kind (e.g. "face")
    pub type_id: String,
    /// Producer-assigned identity, empty when tracking is disabled
    pub tracking_id: String,
    /// Bounding box in frame pixel coordinates
    pub bounding: BoundingBox,
    pub landmarks: Vec<Landmark>,
    pub params: Vec<ObjectParam>,
}

impl Object {
    pub fn new(
        type_id: impl Into<String>,
        tracking_id: impl Into<String>,
        bounding: BoundingBox,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            tracking_id: tracking_id.into(),
            bounding,
            landmarks: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn with_landmarks(mut self, landmarks: Vec<Landmark>) -> Self {
        self.landmarks = landmarks;
        self
    }

    pub fn with_params(mut self, params: Vec<ObjectParam>) -> Self {
        self.params = params;
        self
    }

    /// Find a param by type id. Param lists are small, so this is a scan.
    pub fn param(&self, type_id: &str) -> Option<&ObjectParam> {
        self.params.iter().find(|p| p.type_id == type_id)
    }

    /// Find a landmark by type id.
    pub fn landmark(&self, type_id: &str) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.type_id == type_id)
    }

    /// Whether the producer assigned a tracking identity.
    pub fn is_tracked(&self) -> bool {
        !self.tracking_id.is_empty()
    }

    /// Copy of this object with its bounding box clipped to the frame.
    pub(crate) fn clipped_to(mut self, frame: FrameSize) -> Self {
        self.bounding = self.bounding.clip_to(frame);
        self
    }
}
