use std::path::Path;

use serde::Serialize;

use layview_core::{Layout, Point};
use layview_io::{document, ViewerSettings};
use layview_renderer::{InputEvent, ModeCoordinator, RenderFrame, RendererKind};

/// Application state shared by the commands below.
pub struct AppState {
    pub coordinator: ModeCoordinator,
    /// Uploaded layouts in upload order, replayed after a mode switch.
    pub layouts: Vec<Layout>,
}

impl AppState {
    pub fn new(settings: &ViewerSettings) -> Result<Self, String> {
        let coordinator = ModeCoordinator::new(settings.renderer.clone(), settings.initial_mode)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            coordinator,
            layouts: Vec::new(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct UploadInfo {
    pub layout_id: String,
    pub shape_count: usize,
    pub object_count: usize,
}

// ── Commands ─────────────────────────────────────────────────────────

/// Parse a document and render it on the active backend.
pub fn upload_document(state: &mut AppState, path: &Path) -> Result<UploadInfo, String> {
    let layout = document::read_file(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    upload_layout(state, layout)
}

pub fn upload_layout(state: &mut AppState, layout: Layout) -> Result<UploadInfo, String> {
    state.coordinator.upload(&layout).map_err(|e| e.to_string())?;
    let info = UploadInfo {
        layout_id: layout.id.to_string(),
        shape_count: layout.len(),
        object_count: object_count(state),
    };
    state.layouts.push(layout);
    Ok(info)
}

/// Draw every uploaded layout again on a freshly started backend.
fn replay(state: &mut AppState) -> Result<(), String> {
    for layout in &state.layouts {
        state.coordinator.upload(layout).map_err(|e| e.to_string())?;
    }
    if !state.layouts.is_empty() {
        log::info!(
            "replayed {} layout(s) on the {} renderer",
            state.layouts.len(),
            state.coordinator.mode()
        );
    }
    Ok(())
}

/// Switch to the next backend and redraw the uploaded layouts on it.
pub fn toggle_mode(state: &mut AppState) -> Result<RendererKind, String> {
    let mode = state.coordinator.toggle().map_err(|e| e.to_string())?;
    replay(state)?;
    Ok(mode)
}

pub fn select_mode(state: &mut AppState, kind: RendererKind) -> Result<(), String> {
    state.coordinator.select(kind).map_err(|e| e.to_string())?;
    replay(state)
}

pub fn zoom_fit(state: &mut AppState) -> Result<(), String> {
    state.coordinator.zoom_fit().map_err(|e| e.to_string())
}

pub fn clear(state: &mut AppState) -> Result<(), String> {
    state.coordinator.clear().map_err(|e| e.to_string())?;
    state.layouts.clear();
    Ok(())
}

/// Feed pointer and wheel events. Returns how many changed the view.
pub fn apply_events(state: &mut AppState, events: &[InputEvent]) -> Result<usize, String> {
    let renderer = state
        .coordinator
        .renderer_mut()
        .ok_or_else(|| "no active renderer".to_string())?;
    let mut changed = 0;
    for event in events {
        if renderer.handle_input(event).map_err(|e| e.to_string())? {
            changed += 1;
        }
    }
    Ok(changed)
}

pub fn hit_test(state: &AppState, x: f64, y: f64) -> Vec<String> {
    state
        .coordinator
        .renderer()
        .map(|r| r.hit_test(Point::new(x, y)))
        .unwrap_or_default()
}

pub fn object_count(state: &AppState) -> usize {
    state.coordinator.renderer().map_or(0, |r| r.object_count())
}

pub fn get_frame(state: &AppState) -> Result<RenderFrame, String> {
    state
        .coordinator
        .renderer()
        .map(|r| r.frame())
        .ok_or_else(|| format!("no active {} renderer", state.coordinator.mode()))
}
