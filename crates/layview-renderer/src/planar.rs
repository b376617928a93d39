//! Retained-mode 2D scene graph backend.
//!
//! A stage owns a single content layer of nodes; the stage itself is
//! draggable and zooms towards the cursor without limits.

use serde::{Deserialize, Serialize};

use layview_core::{BBox, Color, DrawCommand, Layout, Paint, Point, Primitive, RENDER_SCALE_2D};

use crate::backend::{emit_layout, PrimitiveSink, RenderError, Renderer, RendererKind};
use crate::config::RendererConfig;
use crate::input::InputEvent;
use crate::render_data::{RenderFrame, RenderItem};
use crate::viewport::{Viewport, ViewportController};

/// A scene graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub name: String,
    pub shape: Primitive,
    pub paint: Paint,
    /// Whether the node receives pointer events.
    pub listening: bool,
}

impl Node {
    pub fn bbox(&self) -> Option<BBox> {
        self.shape.bbox()
    }

    pub fn contains(&self, p: &Point) -> bool {
        match &self.shape {
            Primitive::Rect(r) => r.contains_point(p),
            Primitive::Circle { center, radius } => center.distance_to(p) <= radius.abs(),
            Primitive::Line { .. } => false,
        }
    }
}

#[derive(Debug, Default)]
struct ContentLayer {
    nodes: Vec<Node>,
    next_id: usize,
}

impl PrimitiveSink for ContentLayer {
    fn emit(&mut self, command: DrawCommand) -> Result<(), RenderError> {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push(Node {
            id,
            name: command.name,
            shape: command.primitive,
            listening: command.paint.interactive,
            paint: command.paint,
        });
        Ok(())
    }
}

#[derive(Debug)]
struct Stage {
    controller: ViewportController,
    layer: ContentLayer,
    background: Option<Color>,
}

/// The 2D scene graph renderer.
#[derive(Debug)]
pub struct PlanarRenderer {
    stage: Option<Stage>,
}

impl PlanarRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        if !config.canvas.is_usable() {
            return Err(RenderError::BackendUnavailable {
                kind: RendererKind::Planar,
                reason: format!(
                    "invalid stage size {}x{}",
                    config.canvas.width, config.canvas.height
                ),
            });
        }
        let viewport = Viewport::with_size(config.canvas);
        Ok(Self {
            stage: Some(Stage {
                controller: ViewportController::new(viewport, config.zoom_step),
                layer: ContentLayer::default(),
                background: config.planar_background,
            }),
        })
    }

    /// Nodes of the content layer in draw order.
    pub fn nodes(&self) -> &[Node] {
        match &self.stage {
            Some(stage) => &stage.layer.nodes,
            None => &[],
        }
    }

    fn stage_mut(&mut self) -> Result<&mut Stage, RenderError> {
        self.stage.as_mut().ok_or(RenderError::Disposed(RendererKind::Planar))
    }
}

impl Renderer for PlanarRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Planar
    }

    fn render_layout(&mut self, layout: &Layout) -> Result<(), RenderError> {
        let stage = self.stage_mut()?;
        let emitted = emit_layout(&mut stage.layer, layout, RENDER_SCALE_2D)?;
        log::info!(
            "planar: rendered layout {} ({} shapes, {} nodes)",
            layout.id,
            layout.len(),
            emitted
        );
        self.zoom_fit()
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        let stage = self.stage_mut()?;
        stage.layer = ContentLayer::default();
        log::info!("planar: cleared");
        Ok(())
    }

    fn zoom_fit(&mut self) -> Result<(), RenderError> {
        let stage = self.stage_mut()?;
        let bounds = BBox::union_all(stage.layer.nodes.iter().filter_map(Node::bbox));
        match bounds {
            Some(bbox) if stage.controller.viewport_mut().fit_bbox(&bbox) => {
                log::info!("planar: fit to scale {:.4}", stage.controller.viewport().scale);
            }
            _ => log::warn!("planar: nothing to fit"),
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if self.stage.take().is_some() {
            log::info!("planar: disposed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.stage.is_none()
    }

    fn viewport(&self) -> &Viewport {
        match &self.stage {
            Some(stage) => stage.controller.viewport(),
            None => &Viewport::DETACHED,
        }
    }

    fn handle_input(&mut self, event: &InputEvent) -> Result<bool, RenderError> {
        Ok(self.stage_mut()?.controller.handle(event))
    }

    fn object_count(&self) -> usize {
        self.nodes().len()
    }

    fn hit_test(&self, screen: Point) -> Vec<String> {
        let world = self.viewport().screen_to_world(screen);
        self.nodes()
            .iter()
            .rev()
            .filter(|n| n.listening && n.contains(&world))
            .map(|n| n.name.clone())
            .collect()
    }

    fn frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::empty(RendererKind::Planar, *self.viewport());
        if let Some(stage) = &self.stage {
            frame.background = stage.background;
            frame.object_count = stage.layer.nodes.len();
            frame.items = stage
                .layer
                .nodes
                .iter()
                .map(|n| RenderItem {
                    name: n.name.clone(),
                    primitive: n.shape.clone(),
                    paint: n.paint,
                })
                .collect();
        }
        frame
    }
}
