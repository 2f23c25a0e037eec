//! Frame rotation metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, ModelResult};

/// Clockwise rotation that must be applied to a frame to display it upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Degrees0,
    Degrees90,
    Degrees180,
    Degrees270,
}

impl Rotation {
    /// All supported rotations.
    pub const ALL: &'static [Rotation] = &[
        Rotation::Degrees0,
        Rotation::Degrees90,
        Rotation::Degrees180,
        Rotation::Degrees270,
    ];

    /// Parse a rotation from degrees. Negative and >360 values are normalised.
    pub fn from_degrees(degrees: i32) -> ModelResult<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Degrees0),
            90 => Ok(Rotation::Degrees90),
            180 => Ok(Rotation::Degrees180),
            270 => Ok(Rotation::Degrees270),
            _ => Err(ModelError::InvalidRotation(degrees)),
        }
    }

    /// Rotation in degrees.
    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::Degrees0 => 0,
            Rotation::Degrees90 => 90,
            Rotation::Degrees180 => 180,
            Rotation::Degrees270 => 270,
        }
    }

    /// Returns true when width and height swap after applying the rotation.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Rotation::Degrees90 | Rotation::Degrees270)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}
