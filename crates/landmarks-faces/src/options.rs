//! Face detector configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FaceError, FaceResult};

/// Detector speed/accuracy trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMode {
    Fast,
    Accurate,
}

/// Options passed to the detection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetectorOptions {
    /// Prefer accuracy over speed
    pub accurate: bool,
    /// Extract facial landmarks
    pub detect_landmarks: bool,
    /// Compute smile and eye-open probabilities
    pub detect_classification: bool,
    /// Assign tracking ids across frames
    pub tracking_enabled: bool,
    /// Smallest face width to detect, as a fraction of the frame width, in (0, 1]
    pub min_face_size: f32,
}

impl Default for FaceDetectorOptions {
    fn default() -> Self {
        Self {
            accurate: true,
            detect_landmarks: true,
            detect_classification: true,
            tracking_enabled: true,
            min_face_size: 0.15,
        }
    }
}

impl FaceDetectorOptions {
    /// Create options from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            accurate: env_parse("LANDMARKS_FACE_ACCURATE").unwrap_or(defaults.accurate),
            detect_landmarks: env_parse("LANDMARKS_FACE_LANDMARKS")
                .unwrap_or(defaults.detect_landmarks),
            detect_classification: env_parse("LANDMARKS_FACE_CLASSIFICATION")
                .unwrap_or(defaults.detect_classification),
            tracking_enabled: env_parse("LANDMARKS_FACE_TRACKING")
                .unwrap_or(defaults.tracking_enabled),
            min_face_size: env_parse("LANDMARKS_FACE_MIN_SIZE").unwrap_or(defaults.min_face_size),
        }
    }

    pub fn validate(&self) -> FaceResult<()> {
        if !(self.min_face_size > 0.0 && self.min_face_size <= 1.0) {
            return Err(FaceError::invalid_options(format!(
                "min_face_size must be in (0, 1], got {}",
                self.min_face_size
            )));
        }
        Ok(())
    }

    pub fn performance_mode(&self) -> PerformanceMode {
        if self.accurate {
            PerformanceMode::Accurate
        } else {
            PerformanceMode::Fast
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
