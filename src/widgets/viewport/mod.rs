//! Viewport widget - image viewer with pan/zoom/flip
//!
//! Draws the selected layer and the pick overlay with the egui painter.

mod viewport;
mod viewport_ui;
pub mod viewport_events;

pub use viewport::{ViewportMode, ViewportState};
pub use viewport_ui::{ViewportTextures, render};
