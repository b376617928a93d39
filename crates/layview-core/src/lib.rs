//! # layview core
//!
//! Shape and layout model, the backend-agnostic shape decomposition,
//! coordinate transforms between the authoring plane and 3D world space,
//! and the spatial index renderers use for bounds and hit testing.

pub mod decompose;
pub mod geometry;
pub mod layout;
pub mod shape;
pub mod spatial;
pub mod transform;

pub use decompose::{CellLayout, Decomposition, Direction, DrawCommand, Primitive};
pub use geometry::{BBox, Color, Paint, Point, Rect, Stroke};
pub use layout::{Layout, LayoutError};
pub use shape::{Shape, ShapeProperties, ShapeType};
pub use spatial::{SpatialEntry, SpatialIndex};

/// Render scale applied to authoring coordinates by the 2D backends.
pub const RENDER_SCALE_2D: f64 = 0.1;
/// Render scale from authoring coordinates to 3D world units.
pub const RENDER_SCALE_3D: f64 = 0.005;
