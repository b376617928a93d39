use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::geometry::BBox;
use crate::shape::Shape;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Layout data has no 'shapes' array")]
    MissingShapes,

    #[error("Malformed shape at index {index}: {source}")]
    InvalidShape {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Shape '{name}' has non-finite geometry")]
    NonFiniteGeometry { name: String },
}

/// The `additionalData` section of an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LayoutData {
    shapes: Vec<serde_json::Value>,
}

/// An ordered set of shapes loaded from one document.
///
/// Shape order is draw order. Deserializing runs the same validation as
/// [`Layout::new`] but keeps the stored id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LayoutRecord")]
pub struct Layout {
    /// Identifies the upload this layout came from.
    pub id: Uuid,
    shapes: Vec<Shape>,
}

#[derive(Deserialize)]
struct LayoutRecord {
    id: Uuid,
    shapes: Vec<Shape>,
}

impl TryFrom<LayoutRecord> for Layout {
    type Error = LayoutError;

    fn try_from(record: LayoutRecord) -> Result<Self, Self::Error> {
        validate(&record.shapes)?;
        Ok(Self {
            id: record.id,
            shapes: record.shapes,
        })
    }
}

fn validate(shapes: &[Shape]) -> Result<(), LayoutError> {
    if let Some(bad) = shapes.iter().find(|s| !s.properties.is_finite()) {
        return Err(LayoutError::NonFiniteGeometry {
            name: bad.name.clone(),
        });
    }
    let degenerate = shapes.iter().filter(|s| s.properties.is_degenerate()).count();
    if degenerate > 0 {
        log::warn!("{} shape(s) have zero or negative extent", degenerate);
    }
    Ok(())
}

impl Layout {
    pub fn new(shapes: Vec<Shape>) -> Result<Self, LayoutError> {
        validate(&shapes)?;
        Ok(Self {
            id: Uuid::new_v4(),
            shapes,
        })
    }

    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            shapes: Vec::new(),
        }
    }

    /// Build a layout from an already parsed `additionalData` value.
    pub fn from_additional_data(data: serde_json::Value) -> Result<Self, LayoutError> {
        let data: LayoutData =
            serde_json::from_value(data).map_err(|_| LayoutError::MissingShapes)?;
        let shapes = data
            .shapes
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<Shape>(value)
                    .map_err(|source| LayoutError::InvalidShape { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let layout = Self::new(shapes)?;
        log::debug!("layout {} built with {} shapes", layout.id, layout.len());
        Ok(layout)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn find_shape(&self, name: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.name == name)
    }

    /// Bounding box of every shape at the given render scale.
    pub fn bounds(&self, scale: f64) -> Option<BBox> {
        BBox::union_all(self.shapes.iter().map(|s| s.scaled_rect(scale).bbox()))
    }
}
