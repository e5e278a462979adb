use eframe::egui;

use crate::entities::inspector::{DEFAULT_PATCH_RADIUS, MAX_PATCH_RADIUS};
use crate::entities::{Interpretation, LayerKind};

/// Application settings, persisted through eframe storage.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AppSettings {
    // Inspection
    pub patch_radius: u32,
    pub interpretation: Interpretation,
    pub selected_layer: LayerKind,

    // UI
    pub show_help: bool,
    pub show_layer_panel: bool,
    pub dark_mode: bool,
    pub font_size: f32,
    /// Overlay alpha multiplier (0..1)
    pub overlay_opacity: f32,

    // Last directories used by the open dialogs
    pub last_image_dir: Option<std::path::PathBuf>,
    pub last_field_dir: Option<std::path::PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            patch_radius: DEFAULT_PATCH_RADIUS,
            interpretation: Interpretation::Absolute,
            selected_layer: LayerKind::Image,
            show_help: false,
            show_layer_panel: true,
            dark_mode: true,
            font_size: 13.0,
            overlay_opacity: 1.0,
            last_image_dir: None,
            last_field_dir: None,
        }
    }
}

/// Render settings window. Changes apply live; the app diffs the settings.
pub fn render_settings_window(ctx: &egui::Context, show: &mut bool, settings: &mut AppSettings) {
    egui::Window::new("Preferences")
        .open(show)
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.heading("Inspection");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Patch radius:");
                ui.add(
                    egui::DragValue::new(&mut settings.patch_radius)
                        .range(1..=MAX_PATCH_RADIUS)
                        .suffix(" px"),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Field values are:");
                ui.radio_value(&mut settings.interpretation, Interpretation::Absolute, "Absolute");
                ui.radio_value(&mut settings.interpretation, Interpretation::Offset, "Offset");
            });
            ui.add_space(12.0);

            ui.heading("Appearance");
            ui.add_space(8.0);
            ui.label("Font Size:");
            ui.add(
                egui::Slider::new(&mut settings.font_size, 10.0..=18.0)
                    .suffix(" px")
                    .step_by(0.5),
            );
            ui.label("Overlay opacity:");
            ui.add(egui::Slider::new(&mut settings.overlay_opacity, 0.1..=1.0));
            ui.checkbox(&mut settings.dark_mode, "Dark Mode");
            ui.checkbox(&mut settings.show_layer_panel, "Show layer panel");
            ui.add_space(12.0);

            if ui.button("Reset to defaults").clicked() {
                *settings = AppSettings::default();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: AppSettings = serde_json::from_str(r#"{"patch_radius": 3, "interpretation": "Offset"}"#).unwrap();
        assert_eq!(s.patch_radius, 3);
        assert_eq!(s.interpretation, Interpretation::Offset);
        assert_eq!(s.selected_layer, LayerKind::Image);
        assert!(s.dark_mode);
    }

    #[test]
    fn settings_survive_json() {
        let mut s = AppSettings::default();
        s.selected_layer = LayerKind::FieldY;
        s.last_field_dir = Some("/data/fields".into());
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<AppSettings>(&json).unwrap(), s);
    }
}
