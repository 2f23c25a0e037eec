use serde::{Deserialize, Serialize};

use crate::geometry::Point3D;

/// A named point of interest within a detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Semantic kind of the landmark (e.g. an eye corner or a joint)
    pub type_id: String,
    /// Location in frame pixel coordinates
    pub location: Point3D,
    /// Producer-defined confidence in [0, 1]
    pub score: f32,
}

impl Landmark {
    pub fn new(type_id: impl Into<String>, location: Point3D, score: f32) -> Self {
        Self {
            type_id: type_id.into(),
            location,
            score,
        }
    }
}
