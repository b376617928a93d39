//! The contract every rendering backend implements.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use layview_core::{DrawCommand, Layout, Point};

use crate::input::InputEvent;
use crate::render_data::RenderFrame;
use crate::viewport::Viewport;

#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    #[error("{kind} backend unavailable: {reason}")]
    BackendUnavailable { kind: RendererKind, reason: String },

    #[error("{0} backend used after dispose")]
    Disposed(RendererKind),

    #[error("Instance arena full: {needed} instances requested, capacity {capacity}")]
    ArenaFull { needed: usize, capacity: usize },
}

/// The available backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Retained 2D scene graph.
    Planar,
    /// Named 2D graphics objects.
    Sprite,
    /// Instanced 3D scene.
    Scene,
}

impl RendererKind {
    pub const ALL: [RendererKind; 3] = [RendererKind::Planar, RendererKind::Sprite, RendererKind::Scene];

    /// The backend after this one when toggling.
    pub fn next(self) -> Self {
        match self {
            RendererKind::Planar => RendererKind::Sprite,
            RendererKind::Sprite => RendererKind::Scene,
            RendererKind::Scene => RendererKind::Planar,
        }
    }
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RendererKind::Planar => "planar",
            RendererKind::Sprite => "sprite",
            RendererKind::Scene => "scene",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planar" => Ok(RendererKind::Planar),
            "sprite" => Ok(RendererKind::Sprite),
            "scene" => Ok(RendererKind::Scene),
            other => Err(format!("unknown renderer '{}'", other)),
        }
    }
}

/// Backend-specific storage of one decomposed primitive.
pub trait PrimitiveSink {
    fn emit(&mut self, command: DrawCommand) -> Result<(), RenderError>;
}

/// Decompose every shape of `layout`, in order, into `sink`.
///
/// Returns the number of commands emitted.
pub fn emit_layout<S: PrimitiveSink + ?Sized>(
    sink: &mut S,
    layout: &Layout,
    scale: f64,
) -> Result<usize, RenderError> {
    let mut emitted = 0;
    for shape in layout.shapes() {
        log::debug!("emitting shape '{}'", shape.name);
        for command in shape.decompose(scale) {
            sink.emit(command)?;
            emitted += 1;
        }
    }
    Ok(emitted)
}

/// Number of commands `layout` decomposes into.
pub fn command_count(layout: &Layout, scale: f64) -> usize {
    layout
        .shapes()
        .iter()
        .map(|s| s.decompose(scale).command_count())
        .fold(0, usize::saturating_add)
}

/// A rendering backend.
///
/// After [`Renderer::dispose`] every fallible method returns
/// [`RenderError::Disposed`].
pub trait Renderer: std::fmt::Debug {
    fn kind(&self) -> RendererKind;

    /// Draw every shape of `layout` on top of what is already shown, then fit
    /// the viewport.
    fn render_layout(&mut self, layout: &Layout) -> Result<(), RenderError>;

    /// Remove every rendered primitive. Background decorations stay.
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Fit all rendered primitives into the canvas. Does nothing when there
    /// is nothing to fit.
    fn zoom_fit(&mut self) -> Result<(), RenderError>;

    /// Release all resources. The renderer must not be used afterwards.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;

    fn viewport(&self) -> &Viewport;

    /// Feed a wheel or pointer event. Returns whether the view changed.
    fn handle_input(&mut self, event: &InputEvent) -> Result<bool, RenderError>;

    /// Number of top-level primitives currently rendered.
    fn object_count(&self) -> usize;

    /// Names of interactive primitives under a canvas position, topmost first.
    fn hit_test(&self, screen: Point) -> Vec<String>;

    fn frame(&self) -> RenderFrame;

    /// Advance the frame clock by `dt` seconds.
    fn tick(&mut self, _dt: f64) -> Result<(), RenderError> {
        Ok(())
    }
}
