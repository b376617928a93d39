//! Instanced 3D scene backend.
//!
//! Shapes are decomposed in the 2D render space like the other backends, then
//! lifted onto the world ground plane. Rectangles become thin box instances
//! and markers thin cylinder instances in a shared [`InstanceArena`]. Every
//! primitive sits [`ELEVATION_STEP`] above the one drawn before it. The view is
//! a top-down orthographic camera driven by the same pan/zoom viewport as the
//! 2D backends, with world `x`/`z` on the screen axes.

pub mod arena;
pub mod clock;

use glam::{DVec3, Mat4, Quat, Vec3};

use layview_core::transform::to_world_3d;
use layview_core::{
    BBox, Color, DrawCommand, Layout, Point, Primitive, SpatialEntry, SpatialIndex,
    RENDER_SCALE_2D, RENDER_SCALE_3D,
};

use crate::backend::{command_count, emit_layout, PrimitiveSink, RenderError, Renderer, RendererKind};
use crate::config::RendererConfig;
use crate::input::InputEvent;
use crate::render_data::{LineStrip, MeshKind, RenderFrame};
use crate::viewport::{Viewport, ViewportController};

pub use arena::{InstanceArena, InstanceSlot, Palette};
pub use clock::{FrameClock, TickCallback};

/// From 2D render space to world units.
pub const WORLD_FACTOR: f64 = RENDER_SCALE_3D / RENDER_SCALE_2D;
/// Height added per drawn primitive.
pub const ELEVATION_STEP: f64 = 0.001;
pub const SLAB_THICKNESS: f64 = 0.0005;
pub const MARKER_THICKNESS: f64 = 0.001;
pub const GRID_SIZE: f64 = 2000.0;
pub const GRID_DIVISIONS: usize = 100;
const GRID_COLOR: Color = Color::from_hex(0xc8c8c8);
const GROUND_COLOR: Color = Color::from_hex(0xe6e6e6);
/// Ground plane top sits just under the grid.
const GROUND_DEPTH: f64 = -0.01;
const CAMERA_HEIGHT: f32 = 1000.0;

fn to_world(p: Point) -> DVec3 {
    to_world_3d(Point::new(p.x * WORLD_FACTOR, p.y * WORLD_FACTOR))
}

fn world_bbox(bbox: &BBox) -> BBox {
    BBox::new(
        Point::new(bbox.min.x * WORLD_FACTOR, bbox.min.y * WORLD_FACTOR),
        Point::new(bbox.max.x * WORLD_FACTOR, bbox.max.y * WORLD_FACTOR),
    )
}

fn ground_plane(material: usize) -> InstanceSlot {
    InstanceSlot {
        mesh: MeshKind::Box,
        transform: Mat4::from_scale_rotation_translation(
            Vec3::new(GRID_SIZE as f32, SLAB_THICKNESS as f32, GRID_SIZE as f32),
            Quat::IDENTITY,
            Vec3::new(0.0, (GROUND_DEPTH - SLAB_THICKNESS / 2.0) as f32, 0.0),
        ),
        material,
    }
}

fn grid_lines() -> Vec<LineStrip> {
    let half = GRID_SIZE / 2.0;
    let step = GRID_SIZE / GRID_DIVISIONS as f64;
    (0..=GRID_DIVISIONS)
        .flat_map(|i| {
            let t = (-half + step * i as f64) as f32;
            let h = half as f32;
            [
                LineStrip {
                    points: vec![[t, 0.0, -h], [t, 0.0, h]],
                    color: GRID_COLOR,
                },
                LineStrip {
                    points: vec![[-h, 0.0, t], [h, 0.0, t]],
                    color: GRID_COLOR,
                },
            ]
        })
        .collect()
}

#[derive(Debug)]
struct SceneContent {
    arena: InstanceArena,
    palette: Palette,
    /// Primitive bounds on the world ground plane (`x`, `z`).
    index: SpatialIndex,
    /// Names in draw order; instances first take their slot from the arena.
    names: Vec<String>,
    interactive: Vec<bool>,
    lines: Vec<LineStrip>,
}

impl SceneContent {
    fn elevation(&self) -> f64 {
        self.names.len() as f64 * ELEVATION_STEP
    }

    fn record(&mut self, command: &DrawCommand) {
        let slot = self.names.len();
        if let Some(bbox) = command.bbox() {
            self.index.insert(SpatialEntry {
                index: slot,
                bbox: world_bbox(&bbox),
            });
        }
        self.names.push(command.name.clone());
        self.interactive.push(command.paint.interactive);
    }

    fn reset(&mut self) {
        self.arena.reset();
        self.index.clear();
        self.names.clear();
        self.interactive.clear();
        self.lines.clear();
    }
}

impl PrimitiveSink for SceneContent {
    fn emit(&mut self, command: DrawCommand) -> Result<(), RenderError> {
        let elevation = self.elevation();
        let color = command.paint.primary_color();
        match &command.primitive {
            Primitive::Rect(rect) => {
                let (w, h) = (rect.width * WORLD_FACTOR, rect.height * WORLD_FACTOR);
                let center = to_world(rect.center());
                let transform = Mat4::from_scale_rotation_translation(
                    Vec3::new(w.abs() as f32, SLAB_THICKNESS as f32, h.abs() as f32),
                    Quat::IDENTITY,
                    DVec3::new(center.x, elevation, center.z).as_vec3(),
                );
                let material = self.palette.material(color);
                self.arena.push(InstanceSlot {
                    mesh: MeshKind::Box,
                    transform,
                    material,
                })?;
            }
            Primitive::Circle { center, radius } => {
                let r = (radius.abs() * WORLD_FACTOR) as f32;
                let c = to_world(*center);
                let transform = Mat4::from_scale_rotation_translation(
                    Vec3::new(r, MARKER_THICKNESS as f32, r),
                    Quat::IDENTITY,
                    DVec3::new(c.x, elevation, c.z).as_vec3(),
                );
                let material = self.palette.material(color);
                self.arena.push(InstanceSlot {
                    mesh: MeshKind::Cylinder,
                    transform,
                    material,
                })?;
            }
            Primitive::Line { points } => {
                self.lines.push(LineStrip {
                    points: points
                        .iter()
                        .map(|p| {
                            let w = to_world(*p);
                            [w.x as f32, elevation as f32, w.z as f32]
                        })
                        .collect(),
                    color,
                });
            }
        }
        self.record(&command);
        Ok(())
    }
}

struct SceneState {
    controller: ViewportController,
    content: SceneContent,
    /// Decorations, kept across `clear`.
    ground: InstanceSlot,
    grid: Vec<LineStrip>,
    background: Color,
    clock: FrameClock,
    redraws: u64,
}

impl std::fmt::Debug for SceneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneState")
            .field("viewport", self.controller.viewport())
            .field("objects", &self.content.names.len())
            .field("clock", &self.clock)
            .field("redraws", &self.redraws)
            .finish()
    }
}

impl SceneState {
    fn redraw(&mut self) {
        self.redraws += 1;
    }
}

/// The instanced 3D renderer.
#[derive(Debug)]
pub struct SceneRenderer {
    state: Option<SceneState>,
}

impl SceneRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        if !config.canvas.is_usable() {
            return Err(RenderError::BackendUnavailable {
                kind: RendererKind::Scene,
                reason: format!(
                    "no drawing surface for a {}x{} canvas",
                    config.canvas.width, config.canvas.height
                ),
            });
        }
        let mut palette = Palette::default();
        let ground = ground_plane(palette.material(GROUND_COLOR));
        Ok(Self {
            state: Some(SceneState {
                controller: ViewportController::new(
                    Viewport::with_size(config.canvas),
                    config.zoom_step,
                ),
                content: SceneContent {
                    arena: InstanceArena::new(config.arena),
                    palette,
                    index: SpatialIndex::new(),
                    names: Vec::new(),
                    interactive: Vec::new(),
                    lines: Vec::new(),
                },
                ground,
                grid: grid_lines(),
                background: config.scene_background,
                clock: FrameClock::default(),
                redraws: 0,
            }),
        })
    }

    fn state_mut(&mut self) -> Result<&mut SceneState, RenderError> {
        self.state.as_mut().ok_or(RenderError::Disposed(RendererKind::Scene))
    }

    /// Run `callback` on every [`Renderer::tick`], after those registered before it.
    pub fn register_tick_callback(&mut self, callback: TickCallback) -> Result<(), RenderError> {
        self.state_mut()?.clock.register(callback);
        Ok(())
    }

    pub fn arena(&self) -> Option<&InstanceArena> {
        self.state.as_ref().map(|s| &s.content.arena)
    }

    /// Number of frames drawn so far.
    pub fn redraws(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.redraws)
    }

    /// World-to-clip matrix of the top-down camera.
    pub fn view_projection(&self) -> Mat4 {
        let visible = self.viewport().visible_bounds();
        let eye = Vec3::new(0.0, CAMERA_HEIGHT, 0.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::NEG_Z);
        // Looking down with -Z as up, view-space y is world -z.
        let projection = Mat4::orthographic_rh(
            visible.min.x as f32,
            visible.max.x as f32,
            -visible.max.y as f32,
            -visible.min.y as f32,
            0.1,
            CAMERA_HEIGHT * 2.0,
        );
        projection * view
    }
}

impl Renderer for SceneRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Scene
    }

    fn render_layout(&mut self, layout: &Layout) -> Result<(), RenderError> {
        let state = self.state_mut()?;
        // Reserve up front so a rejected layout leaves the scene untouched.
        state
            .content
            .arena
            .reserve(command_count(layout, RENDER_SCALE_2D))?;
        let emitted = emit_layout(&mut state.content, layout, RENDER_SCALE_2D)?;
        state.redraw();
        log::info!(
            "scene: rendered layout {} ({} instances in arena)",
            layout.id,
            state.content.arena.cursor()
        );
        log::debug!("scene: {} primitives emitted", emitted);
        self.zoom_fit()
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        let state = self.state_mut()?;
        state.content.reset();
        state.redraw();
        log::info!("scene: cleared");
        Ok(())
    }

    fn zoom_fit(&mut self) -> Result<(), RenderError> {
        let state = self.state_mut()?;
        match state.content.index.bounds() {
            Some(bbox) if state.controller.viewport_mut().fit_bbox(&bbox) => {
                state.redraw();
                log::info!("scene: fit to scale {:.4}", state.controller.viewport().scale);
            }
            _ => log::warn!("scene: nothing to fit"),
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(state) = self.state.take() {
            log::info!(
                "scene: disposed after {} frames ({} arena slots released)",
                state.clock.frames(),
                state.content.arena.capacity()
            );
        }
    }

    fn is_disposed(&self) -> bool {
        self.state.is_none()
    }

    fn viewport(&self) -> &Viewport {
        match &self.state {
            Some(state) => state.controller.viewport(),
            None => &Viewport::DETACHED,
        }
    }

    fn handle_input(&mut self, event: &InputEvent) -> Result<bool, RenderError> {
        let state = self.state_mut()?;
        let changed = state.controller.handle(event);
        if changed {
            state.redraw();
        }
        Ok(changed)
    }

    fn object_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.content.names.len())
    }

    fn hit_test(&self, screen: Point) -> Vec<String> {
        let Some(state) = &self.state else {
            return Vec::new();
        };
        let world = state.controller.viewport().screen_to_world(screen);
        let content = &state.content;
        let mut hits: Vec<usize> = content
            .index
            .query_point(&world)
            .into_iter()
            .map(|entry| entry.index)
            .filter(|&i| content.interactive[i])
            .collect();
        hits.sort_unstable_by(|a, b| b.cmp(a));
        hits.into_iter().map(|i| content.names[i].clone()).collect()
    }

    fn frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::empty(RendererKind::Scene, *self.viewport());
        let Some(state) = &self.state else {
            return frame;
        };
        let content = &state.content;
        frame.background = Some(state.background);
        frame.object_count = content.names.len();
        frame.instances = std::iter::once(&state.ground)
            .chain(content.arena.live())
            .map(InstanceSlot::to_data)
            .collect();
        frame.palette = content.palette.colors().to_vec();
        frame.lines = state.grid.iter().chain(&content.lines).cloned().collect();
        frame.view_projection = Some(self.view_projection().to_cols_array());
        frame
    }

    fn tick(&mut self, dt: f64) -> Result<(), RenderError> {
        let state = self.state_mut()?;
        state.clock.tick(dt);
        state.redraw();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArenaConfig, OverflowPolicy};
    use layview_core::transform::to_authoring_2d;
    use layview_core::{Shape, ShapeProperties, ShapeType};
    use std::cell::Cell;
    use std::rc::Rc;

    fn layout(width: f64, height: f64) -> Layout {
        Layout::new(vec![Shape::new(
            "d",
            ShapeType::Delivery,
            ShapeProperties { x: 100.0, y: 200.0, width, height },
        )])
        .unwrap()
    }

    #[test]
    fn test_instances_follow_decomposition() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.render_layout(&layout(3000.0, 800.0)).unwrap();
        assert_eq!(r.object_count(), 10);

        let arena = r.arena().unwrap();
        assert_eq!(arena.cursor(), 10);
        let outline = arena.get(0).unwrap();
        assert_eq!(outline.mesh, MeshKind::Box);
        let (scale, _, translation) = outline.transform.to_scale_rotation_translation();
        // 300 x 80 render units at the world factor.
        assert!((scale.x - 15.0).abs() < 1e-4);
        assert!((scale.z - 4.0).abs() < 1e-4);
        let center = to_authoring_2d(translation.as_dvec3());
        assert!((center.x - (10.0 + 150.0) * WORLD_FACTOR).abs() < 1e-4);
        assert!((center.y - (20.0 + 40.0) * WORLD_FACTOR).abs() < 1e-4);
        assert_eq!(arena.get(2).unwrap().mesh, MeshKind::Cylinder);
    }

    #[test]
    fn test_later_primitives_sit_higher() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.render_layout(&layout(3000.0, 800.0)).unwrap();
        let heights: Vec<f32> = r
            .arena()
            .unwrap()
            .live()
            .iter()
            .map(|s| s.transform.w_axis.y)
            .collect();
        assert!(heights.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_reject_policy_keeps_scene_untouched() {
        let mut config = RendererConfig::default();
        config.arena = ArenaConfig { capacity: 12, overflow: OverflowPolicy::Reject };
        let mut r = SceneRenderer::new(&config).unwrap();
        r.render_layout(&layout(3000.0, 800.0)).unwrap();
        let err = r.render_layout(&layout(3000.0, 800.0)).unwrap_err();
        assert_eq!(err, RenderError::ArenaFull { needed: 20, capacity: 12 });
        assert_eq!(r.object_count(), 10);
    }

    #[test]
    fn test_huge_shape_renders_outline_only() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.render_layout(&layout(1e300, 800.0)).unwrap();
        assert_eq!(r.object_count(), 1);
        assert_eq!(r.arena().unwrap().cursor(), 1);
    }

    #[test]
    fn test_grow_policy_accepts_more() {
        let mut config = RendererConfig::default();
        config.arena = ArenaConfig { capacity: 12, overflow: OverflowPolicy::Grow };
        let mut r = SceneRenderer::new(&config).unwrap();
        r.render_layout(&layout(3000.0, 800.0)).unwrap();
        r.render_layout(&layout(3000.0, 800.0)).unwrap();
        assert_eq!(r.object_count(), 20);
        assert!(r.arena().unwrap().capacity() >= 20);
    }

    #[test]
    fn test_palette_shared_between_instances() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.render_layout(&layout(3000.0, 800.0)).unwrap();
        let frame = r.frame();
        // Ground plus outline, cell, marker and inner marker colours.
        assert_eq!(frame.palette.len(), 5);
        assert_eq!(frame.instances.len(), 11);
        assert_eq!(frame.instances[0].material, 0);
        assert_eq!(frame.lines.len(), 2 * (GRID_DIVISIONS + 1));
    }

    #[test]
    fn test_clear_keeps_grid_and_fit_noop() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.render_layout(&layout(3000.0, 800.0)).unwrap();
        let fitted = *r.viewport();
        r.clear().unwrap();
        assert_eq!(r.object_count(), 0);
        r.zoom_fit().unwrap();
        assert_eq!(*r.viewport(), fitted);
        let frame = r.frame();
        assert_eq!(frame.lines.len(), 2 * (GRID_DIVISIONS + 1));
        assert_eq!(frame.instances.len(), 1);
    }

    #[test]
    fn test_fit_in_world_units() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.render_layout(&layout(400.0, 100.0)).unwrap();
        // Outline only: 40 x 10 render units, 2 x 0.5 world units.
        assert_eq!(r.object_count(), 1);
        assert!((r.viewport().scale - 700.0).abs() < 1e-6);
        let top_left = r.viewport().world_to_screen(Point::new(0.5, 1.0));
        assert!(top_left.x.abs() < 1e-6 && top_left.y.abs() < 1e-6);
    }

    #[test]
    fn test_view_projection_maps_visible_corners() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.render_layout(&layout(400.0, 100.0)).unwrap();
        let vp = r.view_projection();
        let top_left = vp.project_point3(Vec3::new(0.5, 0.0, 1.0));
        assert!((top_left.x + 1.0).abs() < 1e-4, "{:?}", top_left);
        assert!((top_left.y - 1.0).abs() < 1e-4, "{:?}", top_left);
    }

    #[test]
    fn test_tick_runs_callbacks() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        let total = Rc::new(Cell::new(0.0));
        let seen = Rc::clone(&total);
        r.register_tick_callback(Box::new(move |dt| seen.set(seen.get() + dt)))
            .unwrap();
        let before = r.redraws();
        r.tick(0.016).unwrap();
        r.tick(0.016).unwrap();
        assert!((total.get() - 0.032).abs() < 1e-12);
        assert_eq!(r.redraws(), before + 2);
    }

    #[test]
    fn test_hit_test_in_world_space() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.render_layout(&layout(3000.0, 800.0)).unwrap();
        let inside = r.viewport().world_to_screen(Point::new(1.0, 1.5));
        assert_eq!(r.hit_test(inside), vec!["d".to_string()]);
    }

    #[test]
    fn test_dispose_releases_state() {
        let mut r = SceneRenderer::new(&RendererConfig::default()).unwrap();
        r.dispose();
        assert!(r.arena().is_none());
        assert_eq!(r.tick(0.1), Err(RenderError::Disposed(RendererKind::Scene)));
        assert!(r.frame().instances.is_empty());
    }
}
