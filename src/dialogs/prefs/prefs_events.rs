//! Preferences and window-level events.

#[derive(Clone, Debug)]
pub struct ToggleHelpEvent;

#[derive(Clone, Debug)]
pub struct ToggleSettingsEvent;

#[derive(Clone, Debug)]
pub struct ToggleLayerPanelEvent;

#[derive(Clone, Debug)]
pub struct ResetSettingsEvent;

/// Close the main window (menu Quit, Q, Escape).
#[derive(Clone, Debug)]
pub struct QuitEvent;
