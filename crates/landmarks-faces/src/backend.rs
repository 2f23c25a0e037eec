//! Detection backend boundary.
//!
//! The face processor does not detect anything itself; it drives a
//! [`FaceDetectionBackend`] created by a [`BackendFactory`] from the
//! processor's [`FaceDetectorOptions`].

use async_trait::async_trait;
use image::RgbaImage;
use landmarks_models::{BoundingBox, Rotation};

use crate::error::BackendError;
use crate::options::FaceDetectorOptions;

/// Facial landmark kinds a backend may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceLandmarkKind {
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftCheek,
    RightCheek,
    NoseBase,
    MouthLeft,
    MouthRight,
    MouthBottom,
}

impl FaceLandmarkKind {
    pub const ALL: [FaceLandmarkKind; 10] = [
        FaceLandmarkKind::LeftEye,
        FaceLandmarkKind::RightEye,
        FaceLandmarkKind::LeftEar,
        FaceLandmarkKind::RightEar,
        FaceLandmarkKind::LeftCheek,
        FaceLandmarkKind::RightCheek,
        FaceLandmarkKind::NoseBase,
        FaceLandmarkKind::MouthLeft,
        FaceLandmarkKind::MouthRight,
        FaceLandmarkKind::MouthBottom,
    ];

    /// Stable snake_case name, used as the landmark key suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceLandmarkKind::LeftEye => "left_eye",
            FaceLandmarkKind::RightEye => "right_eye",
            FaceLandmarkKind::LeftEar => "left_ear",
            FaceLandmarkKind::RightEar => "right_ear",
            FaceLandmarkKind::LeftCheek => "left_cheek",
            FaceLandmarkKind::RightCheek => "right_cheek",
            FaceLandmarkKind::NoseBase => "nose_base",
            FaceLandmarkKind::MouthLeft => "mouth_left",
            FaceLandmarkKind::MouthRight => "mouth_right",
            FaceLandmarkKind::MouthBottom => "mouth_bottom",
        }
    }
}

/// A landmark position as reported by the backend, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLandmark {
    pub kind: FaceLandmarkKind,
    pub x: f32,
    pub y: f32,
}

/// One face as reported by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFace {
    pub bounding: BoundingBox,
    /// Present only when tracking is enabled
    pub tracking_id: Option<i32>,
    /// Head rotation in degrees
    pub head_euler_angle_x: f32,
    pub head_euler_angle_y: f32,
    pub head_euler_angle_z: f32,
    pub smiling_probability: Option<f32>,
    pub left_eye_open_probability: Option<f32>,
    pub right_eye_open_probability: Option<f32>,
    pub landmarks: Vec<RawLandmark>,
}

/// An external face detector instance.
#[async_trait]
pub trait FaceDetectionBackend: Send {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Detect faces in `image`, which was captured with `rotation`.
    async fn detect(
        &mut self,
        image: &RgbaImage,
        rotation: Rotation,
    ) -> Result<Vec<RawFace>, BackendError>;

    /// Free the detector. Called at most once.
    async fn close(&mut self);
}

/// Creates backend instances from detector options.
pub trait BackendFactory: Send + Sync {
    fn create(
        &self,
        options: &FaceDetectorOptions,
    ) -> Result<Box<dyn FaceDetectionBackend>, BackendError>;
}

impl<F> BackendFactory for F
where
    F: Fn(&FaceDetectorOptions) -> Result<Box<dyn FaceDetectionBackend>, BackendError>
        + Send
        + Sync,
{
    fn create(
        &self,
        options: &FaceDetectorOptions,
    ) -> Result<Box<dyn FaceDetectionBackend>, BackendError> {
        self(options)
    }
}
