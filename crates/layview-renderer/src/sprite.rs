//! Graphics-object backend.
//!
//! Every primitive becomes a named [`Graphics`] object holding a short list of
//! fill/stroke drawing operations. Objects are looked up by name and hit
//! tested through an R-tree. Wheel zoom is clamped to the configured limits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use layview_core::{
    BBox, Color, DrawCommand, Layout, Paint, Point, Primitive, Rect, SpatialEntry, SpatialIndex,
    Stroke, RENDER_SCALE_2D,
};

use crate::backend::{emit_layout, PrimitiveSink, RenderError, Renderer, RendererKind};
use crate::config::RendererConfig;
use crate::input::InputEvent;
use crate::render_data::{RenderFrame, RenderItem};
use crate::viewport::{Viewport, ViewportController};

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GraphicsOp {
    LineStyle { width: f64, color: Color },
    BeginFill { color: Color },
    DrawRect { rect: Rect },
    DrawCircle { center: Point, radius: f64 },
    DrawPolyline { points: Vec<Point> },
    EndFill,
}

/// A named display object built from drawing operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graphics {
    pub name: String,
    pub ops: Vec<GraphicsOp>,
    pub interactive: bool,
}

impl Graphics {
    fn from_command(command: DrawCommand) -> Self {
        let mut ops = Vec::with_capacity(4);
        if let Some(stroke) = command.paint.stroke {
            ops.push(GraphicsOp::LineStyle {
                width: stroke.width,
                color: stroke.color,
            });
        }
        if let Some(color) = command.paint.fill {
            ops.push(GraphicsOp::BeginFill { color });
        }
        ops.push(match command.primitive {
            Primitive::Rect(rect) => GraphicsOp::DrawRect { rect },
            Primitive::Circle { center, radius } => GraphicsOp::DrawCircle { center, radius },
            Primitive::Line { points } => GraphicsOp::DrawPolyline { points },
        });
        if command.paint.fill.is_some() {
            ops.push(GraphicsOp::EndFill);
        }
        Self {
            name: command.name,
            ops,
            interactive: command.paint.interactive,
        }
    }

    /// Replays the operations back into a primitive and its paint.
    pub fn to_item(&self) -> Option<RenderItem> {
        let mut paint = Paint {
            fill: None,
            stroke: None,
            interactive: self.interactive,
        };
        let mut primitive = None;
        for op in &self.ops {
            match op {
                GraphicsOp::LineStyle { width, color } => {
                    paint.stroke = Some(Stroke {
                        color: *color,
                        width: *width,
                    })
                }
                GraphicsOp::BeginFill { color } => paint.fill = Some(*color),
                GraphicsOp::DrawRect { rect } => primitive = Some(Primitive::Rect(*rect)),
                GraphicsOp::DrawCircle { center, radius } => {
                    primitive = Some(Primitive::Circle {
                        center: *center,
                        radius: *radius,
                    })
                }
                GraphicsOp::DrawPolyline { points } => {
                    primitive = Some(Primitive::Line {
                        points: points.clone(),
                    })
                }
                GraphicsOp::EndFill => {}
            }
        }
        primitive.map(|primitive| RenderItem {
            name: self.name.clone(),
            primitive,
            paint,
        })
    }

    pub fn bounds(&self) -> Option<BBox> {
        BBox::union_all(self.ops.iter().filter_map(|op| match op {
            GraphicsOp::DrawRect { rect } => Some(rect.bbox()),
            GraphicsOp::DrawCircle { center, radius } => Primitive::Circle {
                center: *center,
                radius: *radius,
            }
            .bbox(),
            GraphicsOp::DrawPolyline { points } => BBox::from_points(points),
            _ => None,
        }))
    }
}

#[derive(Debug, Default)]
struct Container {
    children: Vec<Graphics>,
    by_name: HashMap<String, usize>,
    index: SpatialIndex,
}

impl PrimitiveSink for Container {
    fn emit(&mut self, command: DrawCommand) -> Result<(), RenderError> {
        let graphics = Graphics::from_command(command);
        let slot = self.children.len();
        if let Some(bbox) = graphics.bounds() {
            self.index.insert(SpatialEntry { index: slot, bbox });
        }
        if self.by_name.insert(graphics.name.clone(), slot).is_some() {
            log::warn!("sprite: name '{}' reused, lookups return the newest", graphics.name);
        }
        self.children.push(graphics);
        Ok(())
    }
}

#[derive(Debug)]
struct Application {
    controller: ViewportController,
    container: Container,
    background: Color,
}

/// The graphics-object renderer.
#[derive(Debug)]
pub struct SpriteRenderer {
    app: Option<Application>,
}

impl SpriteRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        if !config.canvas.is_usable() {
            return Err(RenderError::BackendUnavailable {
                kind: RendererKind::Sprite,
                reason: format!(
                    "cannot create a {}x{} application view",
                    config.canvas.width, config.canvas.height
                ),
            });
        }
        let controller =
            ViewportController::new(Viewport::with_size(config.canvas), config.zoom_step)
                .with_limits(config.sprite_zoom_limits);
        Ok(Self {
            app: Some(Application {
                controller,
                container: Container::default(),
                background: config.sprite_background,
            }),
        })
    }

    /// Look up a display object by its name.
    pub fn child_by_name(&self, name: &str) -> Option<&Graphics> {
        let container = &self.app.as_ref()?.container;
        container.by_name.get(name).map(|&i| &container.children[i])
    }

    pub fn children(&self) -> &[Graphics] {
        match &self.app {
            Some(app) => &app.container.children,
            None => &[],
        }
    }

    fn app_mut(&mut self) -> Result<&mut Application, RenderError> {
        self.app.as_mut().ok_or(RenderError::Disposed(RendererKind::Sprite))
    }
}

impl Renderer for SpriteRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Sprite
    }

    fn render_layout(&mut self, layout: &Layout) -> Result<(), RenderError> {
        let app = self.app_mut()?;
        let emitted = emit_layout(&mut app.container, layout, RENDER_SCALE_2D)?;
        log::info!("sprite: rendered {} graphics for layout {}", emitted, layout.id);
        self.zoom_fit()
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        let app = self.app_mut()?;
        app.container = Container::default();
        log::info!("sprite: cleared");
        Ok(())
    }

    fn zoom_fit(&mut self) -> Result<(), RenderError> {
        let app = self.app_mut()?;
        match app.container.index.bounds() {
            Some(bbox) if app.controller.viewport_mut().fit_bbox(&bbox) => {
                log::info!("sprite: fit to scale {:.4}", app.controller.viewport().scale);
            }
            _ => log::warn!("sprite: nothing to fit"),
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if self.app.take().is_some() {
            log::info!("sprite: application destroyed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.app.is_none()
    }

    fn viewport(&self) -> &Viewport {
        match &self.app {
            Some(app) => app.controller.viewport(),
            None => &Viewport::DETACHED,
        }
    }

    fn handle_input(&mut self, event: &InputEvent) -> Result<bool, RenderError> {
        Ok(self.app_mut()?.controller.handle(event))
    }

    fn object_count(&self) -> usize {
        self.children().len()
    }

    fn hit_test(&self, screen: Point) -> Vec<String> {
        let Some(app) = &self.app else {
            return Vec::new();
        };
        let world = app.controller.viewport().screen_to_world(screen);
        let mut hits: Vec<usize> = app
            .container
            .index
            .query_point(&world)
            .into_iter()
            .map(|entry| entry.index)
            .filter(|&i| app.container.children[i].interactive)
            .collect();
        hits.sort_unstable_by(|a, b| b.cmp(a));
        hits.into_iter()
            .map(|i| app.container.children[i].name.clone())
            .collect()
    }

    fn frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::empty(RendererKind::Sprite, *self.viewport());
        if let Some(app) = &self.app {
            frame.background = Some(app.background);
            frame.object_count = app.container.children.len();
            frame.items = app
                .container
                .children
                .iter()
                .filter_map(Graphics::to_item)
                .collect();
        }
        frame
    }
}
