use serde::{Deserialize, Serialize};

use layview_core::Color;

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
        }
    }
}

/// Allowed scale range for wheel zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    /// Normalized so that `min <= max`.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// What the instance arena does once its capacity is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    #[default]
    Grow,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            capacity: 20_000,
            overflow: OverflowPolicy::Grow,
        }
    }
}

/// Settings shared by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub canvas: CanvasSize,
    /// Scale factor per wheel notch.
    pub zoom_step: f64,
    pub sprite_zoom_limits: ZoomLimits,
    pub arena: ArenaConfig,
    pub planar_background: Option<Color>,
    pub sprite_background: Color,
    pub scene_background: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            zoom_step: 1.1,
            sprite_zoom_limits: ZoomLimits::new(0.01, 10.0),
            arena: ArenaConfig::default(),
            planar_background: None,
            sprite_background: Color::from_hex(0x1099bb),
            scene_background: Color::from_hex(0xf0f0f0),
        }
    }
}
