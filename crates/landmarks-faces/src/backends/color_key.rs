//! Color-key face backend.
//!
//! Treats every connected blob of a key color as a face. Used by the demo
//! worker and in tests where a real detector is not available. Landmarks and
//! classification probabilities are derived from blob geometry.

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use landmarks_models::{BoundingBox, Rotation};
use landmarks_pipeline::Color;
use tracing::{debug, trace};

use crate::backend::{BackendFactory, FaceDetectionBackend, FaceLandmarkKind, RawFace, RawLandmark};
use crate::error::BackendError;
use crate::options::FaceDetectorOptions;
use crate::tracker::IouTracker;

/// IoU needed to continue a track between frames.
const TRACK_IOU_THRESHOLD: f32 = 0.3;
/// Frames a track survives without a detection.
const TRACK_MAX_GAP: u32 = 5;
/// Head yaw reported for a fully one-sided blob, in degrees.
const MAX_YAW_DEGREES: f32 = 45.0;

struct Blob {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    cells: u32,
    left_cells: u32,
    right_cells: u32,
}

/// Detects blobs of a single key color.
pub struct ColorKeyBackend {
    options: FaceDetectorOptions,
    key: Color,
    tolerance: u8,
    tracker: Option<IouTracker>,
    closed: bool,
}

impl ColorKeyBackend {
    pub fn new(options: FaceDetectorOptions, key: Color, tolerance: u8) -> Self {
        let tracker = options
            .tracking_enabled
            .then(|| IouTracker::new(TRACK_IOU_THRESHOLD, TRACK_MAX_GAP));
        Self {
            options,
            key,
            tolerance,
            tracker,
            closed: false,
        }
    }

    /// Factory producing a fresh backend per processor.
    pub fn factory(key: Color, tolerance: u8) -> Arc<dyn BackendFactory> {
        Arc::new(
            move |options: &FaceDetectorOptions| -> Result<Box<dyn FaceDetectionBackend>, BackendError> {
                Ok(Box::new(ColorKeyBackend::new(options.clone(), key, tolerance)))
            },
        )
    }

    fn matches(&self, pixel: &image::Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        a > 0
            && r.abs_diff(self.key.r) <= self.tolerance
            && g.abs_diff(self.key.g) <= self.tolerance
            && b.abs_diff(self.key.b) <= self.tolerance
    }

    /// Accurate mode samples every pixel, fast mode every other one.
    fn step(&self) -> u32 {
        if self.options.accurate {
            1
        } else {
            2
        }
    }

    fn find_blobs(&self, image: &RgbaImage) -> Vec<Blob> {
        let step = self.step();
        let grid_w = image.width().div_ceil(step);
        let grid_h = image.height().div_ceil(step);
        let index = |gx: u32, gy: u32| (gy * grid_w + gx) as usize;

        let mut mask = vec![false; (grid_w * grid_h) as usize];
        for gy in 0..grid_h {
            for gx in 0..grid_w {
                mask[index(gx, gy)] = self.matches(image.get_pixel(gx * step, gy * step));
            }
        }

        let mut blobs = Vec::new();
        let mut stack = Vec::new();
        for start_y in 0..grid_h {
            for start_x in 0..grid_w {
                if !mask[index(start_x, start_y)] {
                    continue;
                }
                mask[index(start_x, start_y)] = false;
                stack.push((start_x, start_y));
                let mut cells = Vec::new();

                while let Some((x, y)) = stack.pop() {
                    cells.push((x, y));
                    let neighbours = [
                        (x.wrapping_sub(1), y),
                        (x + 1, y),
                        (x, y.wrapping_sub(1)),
                        (x, y + 1),
                    ];
                    for (nx, ny) in neighbours {
                        if nx < grid_w && ny < grid_h && mask[index(nx, ny)] {
                            mask[index(nx, ny)] = false;
                            stack.push((nx, ny));
                        }
                    }
                }
                blobs.push(blob_from_cells(&cells));
            }
        }
        blobs
    }

    fn bounds(&self, blob: &Blob) -> BoundingBox {
        let step = self.step() as f32;
        BoundingBox::new(
            blob.min_x as f32 * step,
            blob.min_y as f32 * step,
            (blob.max_x - blob.min_x + 1) as f32 * step,
            (blob.max_y - blob.min_y + 1) as f32 * step,
        )
    }

    fn to_raw_face(&self, blob: &Blob, track_id: Option<i32>) -> RawFace {
        let bounding = self.bounds(blob);

        let halves = (blob.left_cells + blob.right_cells).max(1) as f32;
        let asymmetry = (blob.right_cells as f32 - blob.left_cells as f32) / halves;

        let mut face = RawFace {
            bounding,
            tracking_id: track_id,
            head_euler_angle_y: asymmetry * MAX_YAW_DEGREES,
            ..RawFace::default()
        };

        if self.options.detect_classification {
            let box_cells = ((blob.max_x - blob.min_x + 1) * (blob.max_y - blob.min_y + 1)) as f32;
            let half = (blob.cells as f32 / 2.0).max(1.0);
            face.smiling_probability = Some((blob.cells as f32 / box_cells).clamp(0.0, 1.0));
            face.left_eye_open_probability = Some((blob.left_cells as f32 / half).clamp(0.0, 1.0));
            face.right_eye_open_probability =
                Some((blob.right_cells as f32 / half).clamp(0.0, 1.0));
        }

        if self.options.detect_landmarks {
            face.landmarks = FaceLandmarkKind::ALL
                .iter()
                .map(|&kind| {
                    let (fx, fy) = landmark_anchor(kind);
                    RawLandmark {
                        kind,
                        x: bounding.x + fx * bounding.width,
                        y: bounding.y + fy * bounding.height,
                    }
                })
                .collect();
        }
        face
    }
}

fn blob_from_cells(cells: &[(u32, u32)]) -> Blob {
    let min_x = cells.iter().map(|c| c.0).min().unwrap_or(0);
    let max_x = cells.iter().map(|c| c.0).max().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.1).min().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.1).max().unwrap_or(0);
    let mid_x2 = min_x + max_x;
    let left_cells = cells.iter().filter(|c| c.0 * 2 < mid_x2).count() as u32;
    let right_cells = cells.iter().filter(|c| c.0 * 2 > mid_x2).count() as u32;
    Blob {
        min_x,
        min_y,
        max_x,
        max_y,
        cells: cells.len() as u32,
        left_cells,
        right_cells,
    }
}

/// Landmark position relative to the face box.
fn landmark_anchor(kind: FaceLandmarkKind) -> (f32, f32) {
    match kind {
        FaceLandmarkKind::LeftEye => (0.3, 0.35),
        FaceLandmarkKind::RightEye => (0.7, 0.35),
        FaceLandmarkKind::LeftEar => (0.05, 0.45),
        FaceLandmarkKind::RightEar => (0.95, 0.45),
        FaceLandmarkKind::LeftCheek => (0.25, 0.6),
        FaceLandmarkKind::RightCheek => (0.75, 0.6),
        FaceLandmarkKind::NoseBase => (0.5, 0.6),
        FaceLandmarkKind::MouthLeft => (0.35, 0.78),
        FaceLandmarkKind::MouthRight => (0.65, 0.78),
        FaceLandmarkKind::MouthBottom => (0.5, 0.85),
    }
}

#[async_trait]
impl FaceDetectionBackend for ColorKeyBackend {
    fn name(&self) -> &str {
        "color-key"
    }

    async fn detect(
        &mut self,
        image: &RgbaImage,
        rotation: Rotation,
    ) -> Result<Vec<RawFace>, BackendError> {
        if self.closed {
            return Err(BackendError::Closed);
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(BackendError::detection_failed("empty image"));
        }
        trace!(%rotation, "Color-key detection");

        let min_width = image.width() as f32 * self.options.min_face_size;
        let mut blobs: Vec<Blob> = self
            .find_blobs(image)
            .into_iter()
            .filter(|b| self.bounds(b).width >= min_width)
            .collect();
        blobs.sort_by_key(|b| (b.min_y, b.min_x));

        let boxes: Vec<BoundingBox> = blobs.iter().map(|b| self.bounds(b)).collect();
        let ids: Vec<Option<i32>> = match self.tracker.as_mut() {
            Some(tracker) => tracker.update(&boxes).into_iter().map(Some).collect(),
            None => vec![None; boxes.len()],
        };

        Ok(blobs
            .iter()
            .zip(ids)
            .map(|(blob, id)| self.to_raw_face(blob, id))
            .collect())
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.tracker = None;
            debug!("Color-key backend closed");
        }
    }
}
