//! Default face overlay.

use std::fmt::Write as _;
use std::sync::Arc;

use landmarks_models::{Object, Scene};
use landmarks_pipeline::{Canvas, Color, Paint};

use crate::mapping::type_ids;

/// Custom visualization hook replacing the default face drawing.
pub type FaceVisualization = Arc<dyn Fn(&Scene, &mut dyn Canvas) + Send + Sync>;

/// Draws bounding boxes, landmark discs and an info line for every face.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultFaceVisualization {
    pub bounding_box: Paint,
    pub landmark_fill: Paint,
    pub landmark_stroke: Paint,
    pub landmark_radius: f32,
    pub text: Paint,
    /// Gap between the info line baseline and the top of the box
    pub text_offset: f32,
}

impl Default for DefaultFaceVisualization {
    fn default() -> Self {
        Self {
            bounding_box: Paint::stroke(Color::GREEN, 6.0),
            landmark_fill: Paint::fill(Color::RED),
            landmark_stroke: Paint::stroke(Color::WHITE, 2.0),
            landmark_radius: 12.0,
            text: Paint::text(Color::WHITE, 36.0),
            text_offset: 10.0,
        }
    }
}

impl DefaultFaceVisualization {
    pub fn render(&self, scene: &Scene, canvas: &mut dyn Canvas) {
        for face in scene.objects_of_type(type_ids::FACE) {
            canvas.draw_rect(&face.bounding, &self.bounding_box);

            for landmark in &face.landmarks {
                let center = (landmark.location.x, landmark.location.y);
                canvas.draw_circle(center, self.landmark_radius, &self.landmark_fill);
                canvas.draw_circle(center, self.landmark_radius, &self.landmark_stroke);
            }

            let info = face_info_line(face);
            canvas.draw_text(
                &info,
                (face.bounding.x, face.bounding.y - self.text_offset),
                &self.text,
            );
        }
    }

    pub fn into_hook(self) -> FaceVisualization {
        Arc::new(move |scene, canvas| self.render(scene, canvas))
    }
}

/// Info line drawn above a face: tracking id then each present probability
/// as a percentage.
pub fn face_info_line(face: &Object) -> String {
    let mut info = format!("ID: {} ", face.tracking_id);
    let channels = [
        ("Smile", type_ids::FACE_SMILING),
        ("L.Eye", type_ids::FACE_LEFT_EYE_OPEN),
        ("R.Eye", type_ids::FACE_RIGHT_EYE_OPEN),
    ];
    for (label, type_id) in channels {
        if let Some(score) = face.param(type_id).and_then(|p| p.score) {
            let _ = write!(info, "{}: {:.1}% ", label, score * 100.0);
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmarks_models::{BoundingBox, FrameSize, Landmark, ObjectParam, Point3D};
    use landmarks_pipeline::{DrawOp, RecordingCanvas};

    fn face() -> Object {
        Object::new("face", "7", BoundingBox::new(20.0, 40.0, 50.0, 60.0))
            .with_params(vec![
                ObjectParam::scored(type_ids::FACE_SMILING, true, 0.82),
                ObjectParam::scored(type_ids::FACE_RIGHT_EYE_OPEN, false, 0.42),
            ])
            .with_landmarks(vec![Landmark::new(
                "face_landmark_left_eye",
                Point3D::planar(30.0, 55.0),
                1.0,
            )])
    }

    #[test]
    fn test_info_line_skips_missing_channels() {
        assert_eq!(face_info_line(&face()), "ID: 7 Smile: 82.0% R.Eye: 42.0% ");
    }

    #[test]
    fn test_info_line_without_classification() {
        let bare = Object::new("face", "", BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(face_info_line(&bare), "ID:  ");
    }

    #[test]
    fn test_render_draws_faces_only() {
        let size = FrameSize::new(200, 200).unwrap();
        let scene = Scene::new(
            size,
            vec![
                face(),
                Object::new("hand", "1", BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
            ],
        );
        let mut canvas = RecordingCanvas::new(size);
        DefaultFaceVisualization::default().render(&scene, &mut canvas);

        let ops = canvas.ops();
        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[0], DrawOp::Rect { rect, .. } if rect.x == 20.0));
        assert!(matches!(ops[1], DrawOp::Circle { radius, .. } if radius == 12.0));
        match &ops[3] {
            DrawOp::Text { text, origin, .. } => {
                assert!(text.starts_with("ID: 7"));
                assert_eq!(*origin, (20.0, 30.0));
            }
            other => panic!("expected text, got {:?}", other),
        }
    }
}
