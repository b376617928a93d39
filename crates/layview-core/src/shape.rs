use serde::{Deserialize, Serialize};

use crate::decompose::Decomposition;
use crate::geometry::Rect;

/// Kind of layout segment. Purely descriptive; geometry ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Highway,
    Intake,
    Delivery,
}

/// Position and size of a shape in authoring units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeProperties {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ShapeProperties {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Zero or negative extents cannot be subdivided.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// One rectangular layout element as it appears in an uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    /// Opaque payload carried through untouched.
    #[serde(default)]
    pub parameters: serde_json::Value,
    pub properties: ShapeProperties,
}

impl Shape {
    pub fn new(name: &str, shape_type: ShapeType, properties: ShapeProperties) -> Self {
        Self {
            name: name.to_string(),
            shape_type,
            parameters: serde_json::Value::Null,
            properties,
        }
    }

    /// Bounding rectangle after applying a render scale.
    pub fn scaled_rect(&self, scale: f64) -> Rect {
        self.properties.rect().scaled(scale)
    }

    /// Lazily decompose this shape into draw commands at the given render scale.
    pub fn decompose(&self, scale: f64) -> Decomposition<'_> {
        Decomposition::new(&self.name, self.scaled_rect(scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_deserialize() {
        let json = r#"{
            "name": "hw_1",
            "type": "highway",
            "parameters": {"lanes": 2},
            "properties": {"x": 10, "y": 20, "width": 400, "height": 100}
        }"#;
        let shape: Shape = serde_json::from_str(json).unwrap();
        assert_eq!(shape.name, "hw_1");
        assert_eq!(shape.shape_type, ShapeType::Highway);
        assert_eq!(shape.parameters["lanes"], 2);
        assert!((shape.properties.width - 400.0).abs() < 1e-10);
    }

    #[test]
    fn test_parameters_default_to_null() {
        let json = r#"{"name": "d", "type": "delivery",
            "properties": {"x": 0, "y": 0, "width": 1, "height": 1}}"#;
        let shape: Shape = serde_json::from_str(json).unwrap();
        assert!(shape.parameters.is_null());
    }

    #[test]
    fn test_scaled_rect() {
        let shape = Shape::new(
            "a",
            ShapeType::Intake,
            ShapeProperties { x: 100.0, y: 50.0, width: 1000.0, height: 200.0 },
        );
        let r = shape.scaled_rect(0.1);
        assert!((r.x - 10.0).abs() < 1e-10);
        assert!((r.y - 5.0).abs() < 1e-10);
        assert!((r.width - 100.0).abs() < 1e-10);
        assert!((r.height - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_degenerate_properties() {
        let p = ShapeProperties { x: 0.0, y: 0.0, width: 0.0, height: 5.0 };
        assert!(p.is_degenerate());
        let p = ShapeProperties { x: 0.0, y: f64::NAN, width: 1.0, height: 5.0 };
        assert!(!p.is_finite());
    }
}
