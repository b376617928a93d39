use serde::{Deserialize, Serialize};

use layview_core::{Color, Paint, Primitive};

use crate::backend::RendererKind;

/// A 2D primitive as held in a backend's display list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    pub name: String,
    /// World-space geometry (scaled authoring units).
    pub primitive: Primitive,
    pub paint: Paint,
}

/// Mesh an instance is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshKind {
    /// Unit cube centred on the origin.
    Box,
    /// Unit-radius, unit-height cylinder centred on the origin.
    Cylinder,
}

/// One entry of the instanced transform buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceData {
    pub mesh: MeshKind,
    /// Column-major model matrix.
    pub transform: [f32; 16],
    /// Index into [`RenderFrame::palette`].
    pub material: usize,
}

/// A polyline in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStrip {
    pub points: Vec<[f32; 3]>,
    pub color: Color,
}

/// Complete render frame data handed to a frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderFrame {
    pub kind: RendererKind,
    pub viewport: super::Viewport,
    pub background: Option<Color>,
    pub object_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<RenderItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<InstanceData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<LineStrip>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<Color>,
    /// Column-major world-to-clip matrix, for 3D frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_projection: Option<[f32; 16]>,
}

impl RenderFrame {
    pub fn empty(kind: RendererKind, viewport: super::Viewport) -> Self {
        Self {
            kind,
            viewport,
            background: None,
            object_count: 0,
            items: Vec::new(),
            instances: Vec::new(),
            lines: Vec::new(),
            palette: Vec::new(),
            view_projection: None,
        }
    }

    /// Serialize for a frontend.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Viewport;

    #[test]
    fn test_empty_frame_omits_unused_buffers() {
        let frame = RenderFrame::empty(RendererKind::Sprite, Viewport::new(10.0, 10.0));
        let json: serde_json::Value = serde_json::from_str(&frame.to_json(false).unwrap()).unwrap();
        assert_eq!(json["kind"], "sprite");
        assert!(json.get("items").is_none());
        assert!(json.get("view_projection").is_none());
    }
}
