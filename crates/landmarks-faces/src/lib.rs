//! Face detection for the landmarks pipeline.
//!
//! [`FacesProcessor`] drives a [`FaceDetectionBackend`] over each frame and
//! maps every raw detection to a `face` object with landmarks, head rotation
//! angles and thresholded smile/eye-open classifications.

pub mod backend;
pub mod backends;
pub mod error;
pub mod mapping;
pub mod options;
pub mod processor;
pub mod tracker;
pub mod visualization;

pub use backend::{BackendFactory, FaceDetectionBackend, FaceLandmarkKind, RawFace, RawLandmark};
pub use backends::ColorKeyBackend;
pub use error::{BackendError, FaceError, FaceResult};
pub use mapping::{landmark_type_id, to_scene_object, type_ids, CLASSIFICATION_THRESHOLD};
pub use options::{FaceDetectorOptions, PerformanceMode};
pub use processor::FacesProcessor;
pub use tracker::IouTracker;
pub use visualization::{face_info_line, DefaultFaceVisualization, FaceVisualization};
