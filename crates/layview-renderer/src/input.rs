use serde::{Deserialize, Serialize};

/// Mouse button that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

/// A pointer or wheel event in canvas pixel coordinates.
///
/// Events are delivered one at a time; each is applied to the viewport as a
/// single read-modify-write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
        /// Set by trackpads for pinch gestures, which invert the wheel direction.
        #[serde(default)]
        ctrl: bool,
    },
    PointerDown {
        x: f64,
        y: f64,
        button: MouseButton,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
}
