//! Preferences: persisted settings, settings window, keyboard shortcuts.

pub mod hotkeys;
pub mod prefs;
pub mod prefs_events;

pub use hotkeys::HotkeyHandler;
pub use prefs::{AppSettings, render_settings_window};
