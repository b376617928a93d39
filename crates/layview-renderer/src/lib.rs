//! # layview renderer
//!
//! Interchangeable rendering backends for decomposed layouts. Each backend
//! stores the same draw commands its own way:
//!
//! - [`planar`]: a retained scene graph of nodes on a stage.
//! - [`sprite`]: named graphics objects in a container.
//! - [`scene`]: instanced 3D meshes under a top-down camera.
//!
//! All three share the pan/zoom [`Viewport`] and are driven through the
//! [`Renderer`] trait. [`ModeCoordinator`] keeps exactly one of them alive.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod input;
pub mod planar;
pub mod render_data;
pub mod scene;
pub mod sprite;
pub mod viewport;

pub use backend::{command_count, emit_layout, PrimitiveSink, RenderError, Renderer, RendererKind};
pub use config::{ArenaConfig, CanvasSize, OverflowPolicy, RendererConfig, ZoomLimits};
pub use coordinator::{create_renderer, ModeCoordinator};
pub use input::{InputEvent, MouseButton};
pub use planar::PlanarRenderer;
pub use render_data::{InstanceData, LineStrip, MeshKind, RenderFrame, RenderItem};
pub use scene::SceneRenderer;
pub use sprite::SpriteRenderer;
pub use viewport::{Viewport, ViewportController};
