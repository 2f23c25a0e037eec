//! Shared data models for the landmarks vision pipeline.
//!
//! This crate provides Serde-serializable value types for:
//! - Frame geometry (points, bounding boxes, frame sizes)
//! - Frame rotation metadata
//! - The scene graph produced by frame processors: scenes, objects,
//!   landmarks and typed object parameters

pub mod error;
pub mod geometry;
pub mod landmark;
pub mod object;
pub mod param;
pub mod rotation;
pub mod scene;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use geometry::{BoundingBox, FrameSize, Point3D};
pub use landmark::Landmark;
pub use object::Object;
pub use param::{ObjectParam, ParamValue};
pub use rotation::Rotation;
pub use scene::Scene;
