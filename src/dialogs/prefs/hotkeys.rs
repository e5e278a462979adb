//! Keyboard shortcuts.
//!
//! Bindings map a key combo string ("Ctrl+Shift+O", "ArrowUp", "F1") to an
//! event factory. Copy and paste are not bound here: egui delivers them as
//! `Event::Copy` / `Event::Paste` and the app handles those directly.

use eframe::egui;
use std::collections::HashMap;

use super::prefs_events::{QuitEvent, ToggleHelpEvent, ToggleLayerPanelEvent, ToggleSettingsEvent};
use crate::core::event_bus::BoxedEvent;
use crate::entities::inspector_events::{OpenFieldEvent, OpenImageEvent, SelectLayerEvent};
use crate::entities::{Direction, LayerKind};
use crate::widgets::viewport::viewport_events::{
    FitViewportEvent, FlipHorizontalEvent, FlipVerticalEvent, ScreenNudgeEvent, Viewport100Event,
};

type EventFactory = fn() -> BoxedEvent;

pub struct HotkeyHandler {
    bindings: HashMap<String, EventFactory>,
}

impl Default for HotkeyHandler {
    fn default() -> Self {
        let mut handler = Self {
            bindings: HashMap::new(),
        };
        handler.setup_default_bindings();
        handler
    }
}

/// "Ctrl+Shift+Alt+Key" with modifiers in that fixed order.
pub fn key_combo(key: egui::Key, modifiers: egui::Modifiers) -> String {
    let mut combo = String::new();
    if modifiers.command || modifiers.ctrl {
        combo.push_str("Ctrl+");
    }
    if modifiers.shift {
        combo.push_str("Shift+");
    }
    if modifiers.alt {
        combo.push_str("Alt+");
    }
    combo.push_str(&format!("{:?}", key));
    combo
}

impl HotkeyHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binding(&mut self, combo: &str, factory: EventFactory) {
        self.bindings.insert(combo.to_string(), factory);
    }

    pub fn remove_binding(&mut self, combo: &str) {
        self.bindings.remove(combo);
    }

    pub fn setup_default_bindings(&mut self) {
        self.add_binding("F1", || Box::new(ToggleHelpEvent));
        self.add_binding("F2", || Box::new(ToggleLayerPanelEvent));
        self.add_binding("F12", || Box::new(ToggleSettingsEvent));
        self.add_binding("Escape", || Box::new(QuitEvent));
        self.add_binding("Q", || Box::new(QuitEvent));

        self.add_binding("Ctrl+O", || Box::new(OpenImageEvent(None)));
        self.add_binding("Ctrl+Shift+O", || Box::new(OpenFieldEvent(None)));

        self.add_binding("H", || Box::new(FlipHorizontalEvent));
        self.add_binding("V", || Box::new(FlipVerticalEvent));
        self.add_binding("F", || Box::new(FitViewportEvent));
        self.add_binding("A", || Box::new(Viewport100Event));

        self.add_binding("Num1", || Box::new(SelectLayerEvent(LayerKind::Image)));
        self.add_binding("Num2", || Box::new(SelectLayerEvent(LayerKind::FieldMagnitude)));
        self.add_binding("Num3", || Box::new(SelectLayerEvent(LayerKind::FieldX)));
        self.add_binding("Num4", || Box::new(SelectLayerEvent(LayerKind::FieldY)));

        self.add_binding("ArrowUp", || Box::new(ScreenNudgeEvent(Direction::Up)));
        self.add_binding("ArrowDown", || Box::new(ScreenNudgeEvent(Direction::Down)));
        self.add_binding("ArrowLeft", || Box::new(ScreenNudgeEvent(Direction::Left)));
        self.add_binding("ArrowRight", || Box::new(ScreenNudgeEvent(Direction::Right)));
    }

    pub fn handle_combo(&self, combo: &str) -> Option<BoxedEvent> {
        self.bindings.get(combo).map(|factory| factory())
    }

    /// Events for every bound key pressed this frame.
    pub fn handle_input(&self, input: &egui::InputState) -> Vec<BoxedEvent> {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => self.handle_combo(&key_combo(*key, *modifiers)),
                _ => None,
            })
            .collect()
    }
}
