//! Typed, named facts attached to detected objects.

use serde::{Deserialize, Serialize};

/// Payload carried by an [`ObjectParam`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    /// No payload; only the score matters.
    #[default]
    Unit,
    Bool(bool),
    Float(f32),
    Int(i64),
    Text(String),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, ParamValue::Unit)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<()> for ParamValue {
    fn from(_: ()) -> Self {
        ParamValue::Unit
    }
}

/// A typed, named scalar fact about an object.
///
/// Used both for continuous measurements (head rotation angle) and for
/// classifications thresholded from a probability, in which case `score`
/// holds the raw probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectParam {
    pub type_id: String,
    pub value: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl ObjectParam {
    /// Create an unscored param.
    pub fn new(type_id: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            type_id: type_id.into(),
            value: value.into(),
            score: None,
        }
    }

    /// Create a param carrying a confidence score.
    pub fn scored(type_id: impl Into<String>, value: impl Into<ParamValue>, score: f32) -> Self {
        Self {
            type_id: type_id.into(),
            value: value.into(),
            score: Some(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(ParamValue::from(true).as_bool(), Some(true));
        assert_eq!(ParamValue::from(1.5f32).as_f32(), Some(1.5));
        assert_eq!(ParamValue::from(3i64).as_f32(), Some(3.0));
        assert_eq!(ParamValue::from("left").as_str(), Some("left"));
        assert!(ParamValue::from(()).is_unit());
        assert_eq!(ParamValue::Unit.as_bool(), None);
    }

    #[test]
    fn test_serde_shape() {
        let param = ObjectParam::scored("face_smiling", true, 0.82);
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["type_id"], "face_smiling");
        assert_eq!(json["value"]["kind"], "bool");
        assert_eq!(json["value"]["value"], true);

        let unscored = serde_json::to_value(ObjectParam::new("face_angle_x", 1.0f32)).unwrap();
        assert!(unscored.get("score").is_none());
    }
}
