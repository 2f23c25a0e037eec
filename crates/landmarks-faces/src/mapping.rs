//! Raw backend faces to scene objects.

use landmarks_models::{Landmark, Object, ObjectParam, Point3D};

use crate::backend::{FaceLandmarkKind, RawFace};

/// Type ids used for face objects, params and landmarks.
pub mod type_ids {
    pub const FACE: &str = "face";
    pub const FACE_ANGLE_X: &str = "face_angle_x";
    pub const FACE_ANGLE_Y: &str = "face_angle_y";
    pub const FACE_ANGLE_Z: &str = "face_angle_z";
    pub const FACE_SMILING: &str = "face_smiling";
    pub const FACE_LEFT_EYE_OPEN: &str = "face_left_eye_open";
    pub const FACE_RIGHT_EYE_OPEN: &str = "face_right_eye_open";
    pub const FACE_LANDMARK_PREFIX: &str = "face_landmark_";
}

/// Probabilities strictly above this map to `true`.
pub const CLASSIFICATION_THRESHOLD: f32 = 0.5;

/// Landmark key for a landmark kind, e.g. `face_landmark_nose_base`.
pub fn landmark_type_id(kind: FaceLandmarkKind) -> String {
    format!("{}{}", type_ids::FACE_LANDMARK_PREFIX, kind.as_str())
}

/// Map one backend face to a `face` object.
///
/// The bounding box is copied as reported; clipping to the frame happens
/// when the scene is built.
pub fn to_scene_object(face: &RawFace) -> Object {
    let tracking_id = face
        .tracking_id
        .map(|id| id.to_string())
        .unwrap_or_default();

    let landmarks = face
        .landmarks
        .iter()
        .map(|raw| Landmark::new(landmark_type_id(raw.kind), Point3D::planar(raw.x, raw.y), 1.0))
        .collect();

    let mut params = vec![
        ObjectParam::new(type_ids::FACE_ANGLE_X, face.head_euler_angle_x),
        ObjectParam::new(type_ids::FACE_ANGLE_Y, face.head_euler_angle_y),
        ObjectParam::new(type_ids::FACE_ANGLE_Z, face.head_euler_angle_z),
    ];
    let classifications = [
        (type_ids::FACE_SMILING, face.smiling_probability),
        (type_ids::FACE_LEFT_EYE_OPEN, face.left_eye_open_probability),
        (type_ids::FACE_RIGHT_EYE_OPEN, face.right_eye_open_probability),
    ];
    params.extend(
        classifications
            .into_iter()
            .filter_map(|(type_id, probability)| probability.map(|p| classified(type_id, p))),
    );

    Object::new(type_ids::FACE, tracking_id, face.bounding)
        .with_landmarks(landmarks)
        .with_params(params)
}

fn classified(type_id: &str, probability: f32) -> ObjectParam {
    ObjectParam::scored(type_id, probability > CLASSIFICATION_THRESHOLD, probability)
}
