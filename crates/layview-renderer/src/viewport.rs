use serde::{Deserialize, Serialize};

use layview_core::{BBox, Point};

use crate::config::{CanvasSize, ZoomLimits};
use crate::input::{InputEvent, MouseButton};

/// Pan/zoom state of a canvas: `screen = offset + world * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Uniform scale (pixels per world unit).
    pub scale: f64,
    /// Screen position of the world origin.
    pub offset_x: f64,
    pub offset_y: f64,
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
}

impl Viewport {
    /// Reported by a disposed backend, which no longer has a canvas.
    pub const DETACHED: Viewport = Viewport {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
        canvas_width: 0.0,
        canvas_height: 0.0,
    };

    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            canvas_width,
            canvas_height,
        }
    }

    pub fn with_size(size: CanvasSize) -> Self {
        Self::new(size.width, size.height)
    }

    /// Pan the viewport by a delta in screen pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Set the scale while keeping the world point under `anchor` fixed.
    pub fn zoom_to(&mut self, anchor: Point, new_scale: f64) {
        let world = self.screen_to_world(anchor);
        self.scale = new_scale;
        self.offset_x = anchor.x - world.x * new_scale;
        self.offset_y = anchor.y - world.y * new_scale;
    }

    /// Scale so `bbox` fills the canvas along its tighter axis, with its
    /// top-left corner at the canvas origin.
    ///
    /// Returns `false` and leaves the viewport untouched when the box has no
    /// usable extent.
    pub fn fit_bbox(&mut self, bbox: &BBox) -> bool {
        let candidates = [
            (self.canvas_width, bbox.width()),
            (self.canvas_height, bbox.height()),
        ];
        let scale = candidates
            .iter()
            .filter(|(_, extent)| extent.is_finite() && *extent > 0.0)
            .map(|(canvas, extent)| canvas / extent)
            .fold(f64::INFINITY, f64::min);
        if !scale.is_finite() || scale <= 0.0 || !bbox.min.is_finite() {
            return false;
        }
        self.scale = scale;
        self.offset_x = -bbox.min.x * scale;
        self.offset_y = -bbox.min.y * scale;
        true
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.offset_x,
            world.y * self.scale + self.offset_y,
        )
    }

    /// Get the visible region in world coordinates.
    pub fn visible_bounds(&self) -> BBox {
        BBox::new(
            self.screen_to_world(Point::new(0.0, 0.0)),
            self.screen_to_world(Point::new(self.canvas_width, self.canvas_height)),
        )
    }
}

/// Turns wheel and drag input into viewport changes.
#[derive(Debug, Clone)]
pub struct ViewportController {
    viewport: Viewport,
    zoom_step: f64,
    limits: Option<ZoomLimits>,
    /// Last pointer position while a primary-button drag is active.
    drag_anchor: Option<Point>,
}

impl ViewportController {
    pub fn new(viewport: Viewport, zoom_step: f64) -> Self {
        Self {
            viewport,
            zoom_step,
            limits: None,
            drag_anchor: None,
        }
    }

    pub fn with_limits(mut self, limits: ZoomLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Back to the initial identity transform, ending any drag.
    pub fn reset(&mut self) {
        self.viewport = Viewport::new(self.viewport.canvas_width, self.viewport.canvas_height);
        self.drag_anchor = None;
    }

    /// Apply one input event. Returns whether the viewport changed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::Wheel { x, y, delta_y, ctrl } => self.wheel(Point::new(x, y), delta_y, ctrl),
            InputEvent::PointerDown { x, y, button } => {
                if button == MouseButton::Primary {
                    self.drag_anchor = Some(Point::new(x, y));
                }
                false
            }
            InputEvent::PointerMove { x, y } => match self.drag_anchor {
                Some(last) => {
                    self.drag_anchor = Some(Point::new(x, y));
                    self.viewport.pan(x - last.x, y - last.y);
                    x != last.x || y != last.y
                }
                None => false,
            },
            InputEvent::PointerUp { .. } => {
                self.drag_anchor = None;
                false
            }
        }
    }

    /// Positive `delta_y` zooms in, negated for pinch gestures.
    fn wheel(&mut self, pointer: Point, delta_y: f64, ctrl: bool) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let zoom_in = (delta_y > 0.0) != ctrl;
        let old_scale = self.viewport.scale;
        let mut new_scale = if zoom_in {
            old_scale * self.zoom_step
        } else {
            old_scale / self.zoom_step
        };
        if let Some(limits) = self.limits {
            new_scale = limits.clamp(new_scale);
        }
        if new_scale == old_scale {
            return false;
        }
        self.viewport.zoom_to(pointer, new_scale);
        log::trace!("zoom {:.4} -> {:.4} at ({}, {})", old_scale, new_scale, pointer.x, pointer.y);
        true
    }
}
