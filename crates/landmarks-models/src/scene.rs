use serde::{Deserialize, Serialize};

use crate::geometry::FrameSize;
use crate::object::Object;

/// Per-frame result of one frame processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Dimensions of the frame the scene was computed from
    pub frame_size: FrameSize,
    pub objects: Vec<Object>,
}

impl Scene {
    /// Build a scene, clipping every bounding box to the frame extent.
    pub fn new(frame_size: FrameSize, objects: Vec<Object>) -> Self {
        let objects = objects
            .into_iter()
            .map(|object| object.clipped_to(frame_size))
            .collect();
        Self {
            frame_size,
            objects,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Objects of the given entity kind, in detection order.
    pub fn objects_of_type<'a>(&'a self, type_id: &'a str) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects.iter().filter(move |o| o.type_id == type_id)
    }

    /// Find an object by tracking id.
    pub fn find_tracked(&self, tracking_id: &str) -> Option<&Object> {
        if tracking_id.is_empty() {
            return None;
        }
        self.objects.iter().find(|o| o.tracking_id == tracking_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    #[test]
    fn test_scene_clips_objects() {
        let frame = FrameSize::new(100, 100).unwrap();
        let scene = Scene::new(
            frame,
            vec![
                Object::new("face", "1", BoundingBox::new(-10.0, 90.0, 30.0, 30.0)),
                Object::new("hand", "2", BoundingBox::new(10.0, 10.0, 20.0, 20.0)),
            ],
        );

        assert_eq!(scene.len(), 2);
        assert!(scene.objects.iter().all(|o| o.bounding.is_within(frame)));
        assert_eq!(
            scene.objects[0].bounding,
            BoundingBox::from_edges(0.0, 90.0, 20.0, 100.0)
        );
        assert_eq!(scene.objects_of_type("face").count(), 1);
        assert_eq!(scene.find_tracked("2").map(|o| o.type_id.as_str()), Some("hand"));
        assert!(scene.find_tracked("").is_none());
    }

    #[test]
    fn test_scene_with_nan_box_does_not_panic() {
        let frame = FrameSize::new(100, 100).unwrap();
        let scene = Scene::new(
            frame,
            vec![Object::new("face", "", BoundingBox::new(f32::NAN, 10.0, 20.0, 20.0))],
        );
        assert_eq!(scene.len(), 1);
        assert!(scene.objects[0].bounding.is_empty());
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::new(FrameSize::new(10, 10).unwrap(), Vec::new());
        assert!(scene.is_empty());
    }
}
