//! Shape decomposition.
//!
//! A shape is drawn as its stroked bounding rectangle followed by a row (or
//! column) of evenly spaced cells along its longer side. Each cell gets two
//! concentric markers at its centre. [`Decomposition`] yields that sequence
//! lazily as backend-agnostic [`DrawCommand`]s, so every renderer draws
//! identical geometry and only differs in how it stores a primitive.

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Color, Paint, Point, Rect, Stroke};

/// Nominal cell length along the major axis.
pub const CELL_SIZE: f64 = 100.0;
/// Most cells a single shape is split into. Longer shapes draw their outline only.
pub const MAX_CELLS: usize = 10_000;
/// Gap between cells and around the cell row.
pub const PADDING: f64 = 20.0;
pub const MARKER_RADIUS: f64 = 40.0;
pub const INNER_MARKER_RADIUS: f64 = 30.0;
pub const OUTLINE_WIDTH: f64 = 2.0;
pub const INNER_MARKER_STROKE_WIDTH: f64 = 2.0;

pub const OUTLINE_COLOR: Color = Color::BLACK;
pub const CELL_COLOR: Color = Color::from_hex(0x8877ed);
pub const MARKER_COLOR: Color = Color::from_hex(0xff5c87);
pub const INNER_MARKER_COLOR: Color = Color::WHITE;

/// Orientation of the cell row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    /// Horizontal only when strictly wider than tall.
    pub fn of(rect: &Rect) -> Self {
        if rect.width > rect.height {
            Direction::Horizontal
        } else {
            Direction::Vertical
        }
    }
}

/// How the major axis of a rectangle is split into cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellLayout {
    pub direction: Direction,
    pub count: usize,
    pub cell_size: f64,
}

impl CellLayout {
    /// `None` when the major axis is too short for a single cell, would need
    /// more than [`MAX_CELLS`] cells, or is not a positive finite number.
    pub fn for_rect(rect: &Rect) -> Option<Self> {
        let direction = Direction::of(rect);
        let major_length = match direction {
            Direction::Horizontal => rect.width,
            Direction::Vertical => rect.height,
        };
        if !major_length.is_finite() || major_length < CELL_SIZE {
            return None;
        }
        let cells = (major_length / CELL_SIZE).floor();
        if cells > MAX_CELLS as f64 {
            log::warn!(
                "major axis {} needs {} cells, more than {}; drawing outline only",
                major_length,
                cells,
                MAX_CELLS
            );
            return None;
        }
        let count = cells as usize;
        if count == 0 {
            return None;
        }
        let cell_size =
            ((major_length - PADDING * (count as f64 + 1.0)) / count as f64).max(0.0);
        Some(Self {
            direction,
            count,
            cell_size,
        })
    }

    /// Rectangle of cell `index` inside `rect`.
    ///
    /// The minor extent is clamped to zero when the rectangle is thinner than
    /// twice the padding.
    pub fn cell(&self, rect: &Rect, index: usize) -> Rect {
        let i = index as f64;
        let along = (i + 1.0) * PADDING + i * self.cell_size;
        match self.direction {
            Direction::Horizontal => Rect::new(
                rect.x + along,
                rect.y + PADDING,
                self.cell_size,
                (rect.height - PADDING * 2.0).max(0.0),
            ),
            Direction::Vertical => Rect::new(
                rect.x + PADDING,
                rect.y + along,
                (rect.width - PADDING * 2.0).max(0.0),
                self.cell_size,
            ),
        }
    }
}

/// Geometry of a single draw command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Rect(Rect),
    Circle { center: Point, radius: f64 },
    Line { points: Vec<Point> },
}

impl Primitive {
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Primitive::Rect(r) => Some(r.bbox()),
            Primitive::Circle { center, radius } => {
                let r = radius.abs();
                Some(BBox::new(
                    center.translate(-r, -r),
                    center.translate(r, r),
                ))
            }
            Primitive::Line { points } => BBox::from_points(points),
        }
    }
}

/// One primitive to draw, in scaled authoring coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    /// Unique within a layout; sub-elements derive from the shape name.
    pub name: String,
    /// Position of this command in its shape's sequence.
    pub sequence: usize,
    pub primitive: Primitive,
    pub paint: Paint,
}

impl DrawCommand {
    pub fn bbox(&self) -> Option<BBox> {
        self.primitive.bbox()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Outline,
    Cell { index: usize },
    Marker { index: usize },
    InnerMarker { index: usize },
    Done,
}

/// Lazy draw-command sequence for one shape.
#[derive(Debug, Clone)]
pub struct Decomposition<'a> {
    name: &'a str,
    rect: Rect,
    cells: Option<CellLayout>,
    current: Option<Rect>,
    step: Step,
    sequence: usize,
}

impl<'a> Decomposition<'a> {
    pub fn new(name: &'a str, rect: Rect) -> Self {
        let cells = CellLayout::for_rect(&rect);
        if cells.is_none() {
            log::debug!("shape '{}' is too small to subdivide, outline only", name);
        }
        Self {
            name,
            rect,
            cells,
            current: None,
            step: Step::Outline,
            sequence: 0,
        }
    }

    pub fn cell_layout(&self) -> Option<CellLayout> {
        self.cells
    }

    /// Total number of commands this decomposition yields.
    pub fn command_count(&self) -> usize {
        self.cells
            .map_or(0, |c| c.count.saturating_mul(3))
            .saturating_add(1)
    }

    fn next_cell_step(&self, index: usize) -> Step {
        match self.cells {
            Some(cells) if index < cells.count => Step::Cell { index },
            _ => Step::Done,
        }
    }

    fn command(&mut self, name: String, primitive: Primitive, paint: Paint) -> DrawCommand {
        let sequence = self.sequence;
        self.sequence += 1;
        DrawCommand {
            name,
            sequence,
            primitive,
            paint,
        }
    }
}

impl Iterator for Decomposition<'_> {
    type Item = DrawCommand;

    fn next(&mut self) -> Option<DrawCommand> {
        match self.step {
            Step::Outline => {
                self.step = self.next_cell_step(0);
                Some(self.command(
                    self.name.to_string(),
                    Primitive::Rect(self.rect),
                    Paint::outline(OUTLINE_COLOR, OUTLINE_WIDTH),
                ))
            }
            Step::Cell { index } => {
                let cells = self.cells?;
                let cell = cells.cell(&self.rect, index);
                self.current = Some(cell);
                self.step = Step::Marker { index };
                Some(self.command(
                    format!("{}_{}", self.name, index),
                    Primitive::Rect(cell),
                    Paint::filled(CELL_COLOR),
                ))
            }
            Step::Marker { index } => {
                let center = self.current?.center();
                self.step = Step::InnerMarker { index };
                Some(self.command(
                    format!("{}_{}_dot", self.name, index),
                    Primitive::Circle {
                        center,
                        radius: MARKER_RADIUS,
                    },
                    Paint::filled(MARKER_COLOR),
                ))
            }
            Step::InnerMarker { index } => {
                let center = self.current?.center();
                self.step = self.next_cell_step(index + 1);
                Some(self.command(
                    format!("{}_{}_dot2", self.name, index),
                    Primitive::Circle {
                        center,
                        radius: INNER_MARKER_RADIUS,
                    },
                    Paint {
                        fill: None,
                        stroke: Some(Stroke {
                            color: INNER_MARKER_COLOR,
                            width: INNER_MARKER_STROKE_WIDTH,
                        }),
                        interactive: false,
                    },
                ))
            }
            Step::Done => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.command_count().saturating_sub(self.sequence);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Decomposition<'_> {}
