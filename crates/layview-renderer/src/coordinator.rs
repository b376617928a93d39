//! Owns the active backend and switches between them.

use layview_core::Layout;

use crate::backend::{RenderError, Renderer, RendererKind};
use crate::config::RendererConfig;
use crate::planar::PlanarRenderer;
use crate::scene::SceneRenderer;
use crate::sprite::SpriteRenderer;

/// Construct a fresh backend of the given kind.
pub fn create_renderer(
    kind: RendererKind,
    config: &RendererConfig,
) -> Result<Box<dyn Renderer>, RenderError> {
    let renderer: Box<dyn Renderer> = match kind {
        RendererKind::Planar => Box::new(PlanarRenderer::new(config)?),
        RendererKind::Sprite => Box::new(SpriteRenderer::new(config)?),
        RendererKind::Scene => Box::new(SceneRenderer::new(config)?),
    };
    log::info!("created {} renderer", kind);
    Ok(renderer)
}

/// Holds at most one live backend at a time.
///
/// Switching always disposes the previous backend before the next one is
/// created. Layouts are not replayed on a switch; the new backend starts
/// empty.
#[derive(Debug)]
pub struct ModeCoordinator {
    config: RendererConfig,
    mode: RendererKind,
    active: Option<Box<dyn Renderer>>,
}

impl ModeCoordinator {
    /// Start with a live backend of kind `initial`.
    pub fn new(config: RendererConfig, initial: RendererKind) -> Result<Self, RenderError> {
        let active = create_renderer(initial, &config)?;
        Ok(Self {
            config,
            mode: initial,
            active: Some(active),
        })
    }

    /// The selected mode, even when its backend failed to start.
    pub fn mode(&self) -> RendererKind {
        self.mode
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Dispose the current backend and start one of kind `kind`.
    ///
    /// On failure no backend is active until the next successful `select`.
    pub fn select(&mut self, kind: RendererKind) -> Result<(), RenderError> {
        if let Some(mut old) = self.active.take() {
            log::info!("disposing {} renderer", old.kind());
            old.dispose();
        }
        self.mode = kind;
        match create_renderer(kind, &self.config) {
            Ok(renderer) => {
                self.active = Some(renderer);
                Ok(())
            }
            Err(e) => {
                log::error!("failed to start {} renderer: {}", kind, e);
                Err(e)
            }
        }
    }

    /// Switch to the next backend in the cycle. Returns the new mode.
    pub fn toggle(&mut self) -> Result<RendererKind, RenderError> {
        let next = self.mode.next();
        self.select(next)?;
        Ok(next)
    }

    pub fn renderer(&self) -> Option<&dyn Renderer> {
        self.active.as_deref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut (dyn Renderer + 'static)> {
        self.active.as_deref_mut()
    }

    fn active_mut(&mut self) -> Result<&mut (dyn Renderer + 'static), RenderError> {
        let mode = self.mode;
        self.active
            .as_deref_mut()
            .ok_or_else(|| RenderError::BackendUnavailable {
                kind: mode,
                reason: "no active renderer".to_string(),
            })
    }

    /// Render `layout` on the active backend.
    pub fn upload(&mut self, layout: &Layout) -> Result<(), RenderError> {
        self.active_mut()?.render_layout(layout)
    }

    pub fn zoom_fit(&mut self) -> Result<(), RenderError> {
        self.active_mut()?.zoom_fit()
    }

    pub fn clear(&mut self) -> Result<(), RenderError> {
        self.active_mut()?.clear()
    }
}

impl Drop for ModeCoordinator {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasSize;
    use layview_core::{Shape, ShapeProperties, ShapeType};

    fn layout() -> Layout {
        Layout::new(vec![Shape::new(
            "hw",
            ShapeType::Highway,
            ShapeProperties { x: 0.0, y: 0.0, width: 3000.0, height: 600.0 },
        )])
        .unwrap()
    }

    #[test]
    fn test_toggle_cycles_all_backends() {
        let mut c = ModeCoordinator::new(RendererConfig::default(), RendererKind::Planar).unwrap();
        assert_eq!(c.toggle().unwrap(), RendererKind::Sprite);
        assert_eq!(c.renderer().unwrap().kind(), RendererKind::Sprite);
        assert_eq!(c.toggle().unwrap(), RendererKind::Scene);
        assert_eq!(c.toggle().unwrap(), RendererKind::Planar);
        assert_eq!(c.mode(), RendererKind::Planar);
    }

    #[test]
    fn test_switch_starts_empty() {
        let mut c = ModeCoordinator::new(RendererConfig::default(), RendererKind::Sprite).unwrap();
        c.upload(&layout()).unwrap();
        assert_eq!(c.renderer().unwrap().object_count(), 10);
        c.select(RendererKind::Scene).unwrap();
        assert_eq!(c.renderer().unwrap().object_count(), 0);
        c.upload(&layout()).unwrap();
        assert_eq!(c.renderer().unwrap().object_count(), 10);
    }

    #[test]
    fn test_failed_start_leaves_no_backend() {
        let config = RendererConfig {
            canvas: CanvasSize { width: 0.0, height: 900.0 },
            ..RendererConfig::default()
        };
        assert!(ModeCoordinator::new(config.clone(), RendererKind::Planar).is_err());

        let mut c = ModeCoordinator::new(RendererConfig::default(), RendererKind::Planar).unwrap();
        c.config = config;
        let err = c.select(RendererKind::Scene).unwrap_err();
        assert!(matches!(err, RenderError::BackendUnavailable { kind: RendererKind::Scene, .. }));
        assert!(c.renderer().is_none());
        assert_eq!(c.mode(), RendererKind::Scene);
        assert!(matches!(
            c.upload(&layout()),
            Err(RenderError::BackendUnavailable { .. })
        ));
    }

    #[test]
    fn test_clear_and_fit_on_active() {
        let mut c = ModeCoordinator::new(RendererConfig::default(), RendererKind::Planar).unwrap();
        c.upload(&layout()).unwrap();
        c.clear().unwrap();
        assert_eq!(c.renderer().unwrap().object_count(), 0);
        c.zoom_fit().unwrap();
    }
}
