//! # layview I/O
//!
//! Reads uploaded layout documents and loads/saves the viewer settings
//! file. Both are plain JSON.

pub mod document;
pub mod settings;

pub use document::DocumentError;
pub use settings::{SettingsError, ViewerSettings};
