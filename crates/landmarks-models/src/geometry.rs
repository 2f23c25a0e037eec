//! Frame geometry primitives.
//!
//! All coordinates are in source-frame pixel space with the origin at the
//! top-left corner.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Pixel extent of a source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Create a frame size, rejecting empty extents.
    pub fn new(width: u32, height: u32) -> ModelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ModelError::InvalidFrameSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels in the frame.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A point of interest. Components the producer cannot supply are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// A point without depth information.
    pub fn planar(x: f32, y: f32) -> Self {
        Self { x, y, z: f32::NAN }
    }

    /// Whether the producer reported a depth component.
    #[inline]
    pub fn has_depth(&self) -> bool {
        !self.z.is_nan()
    }
}

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: f32,
    /// Top edge y-coordinate
    pub y: f32,
    /// Box width
    pub width: f32,
    /// Box height
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box from its edges.
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> f32 {
        self.y + self.height
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// True when the box covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// True when every component is a finite number.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Whether the box lies entirely inside the frame.
    pub fn is_within(&self, frame: FrameSize) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x2() <= frame.width as f32
            && self.y2() <= frame.height as f32
    }

    /// Intersect the box with the frame extent.
    ///
    /// A box entirely outside the frame collapses to a zero-sized box on the
    /// nearest frame edge. A box with any non-finite component collapses to a
    /// zero-sized box at the origin.
    pub fn clip_to(&self, frame: FrameSize) -> BoundingBox {
        if !self.is_finite() {
            return BoundingBox::default();
        }

        let max_x = frame.width as f32;
        let max_y = frame.height as f32;

        let left = self.x.clamp(0.0, max_x);
        let top = self.y.clamp(0.0, max_y);
        let right = self.x2().clamp(left, max_x);
        let bottom = self.y2().clamp(top, max_y);

        BoundingBox::from_edges(left, top, right, bottom)
    }

    /// Compute Intersection over Union with another box.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}
