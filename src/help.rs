//! Help overlay shown over the viewport (F1 or Help menu).

use eframe::egui;

/// Single help entry (key binding + description)
#[derive(Clone, Debug)]
pub struct HelpEntry {
    pub key: &'static str,
    pub desc: &'static str,
}

impl HelpEntry {
    pub const fn new(key: &'static str, desc: &'static str) -> Self {
        Self { key, desc }
    }
}

pub const INTRO: &str = "Click on a pixel. The surrounding region will be outlined, \
and the best matching region will be outlined.";

/// Global hotkeys
pub const GLOBAL_HELP: &[HelpEntry] = &[
    HelpEntry::new("F1", "Toggle this help"),
    HelpEntry::new("F2", "Toggle layer panel"),
    HelpEntry::new("F12", "Toggle Preferences"),
    HelpEntry::new("Ctrl+O", "Open image"),
    HelpEntry::new("Ctrl+Shift+O", "Open NN field"),
    HelpEntry::new("ESC / Q", "Quit"),
];

/// Viewport navigation
pub const VIEWPORT_HELP: &[HelpEntry] = &[
    HelpEntry::new("F", "Fit to View"),
    HelpEntry::new("A", "100% Zoom"),
    HelpEntry::new("H / V", "Flip horizontally / vertically"),
    HelpEntry::new("Mouse Wheel", "Zoom"),
    HelpEntry::new("Middle Drag", "Pan"),
    HelpEntry::new("1..4", "RGB / Magnitude / X / Y layer"),
];

/// Picking
pub const PICK_HELP: &[HelpEntry] = &[
    HelpEntry::new("Left Click", "Pick pixel (red: query, green: match)"),
    HelpEntry::new("Arrows", "Move the last pick by one pixel"),
    HelpEntry::new("Ctrl+C", "Copy \"pick_x pick_y match_x match_y\""),
    HelpEntry::new("Ctrl+V", "Pick at pasted \"x y\""),
    HelpEntry::new("Drop files", "Open images and .mha/.mhd fields"),
];

pub fn all_help_sections() -> Vec<(&'static str, &'static [HelpEntry])> {
    vec![
        ("Global", GLOBAL_HELP),
        ("Viewport", VIEWPORT_HELP),
        ("Pick", PICK_HELP),
    ]
}

/// Render help overlay in the top-left corner of `panel_rect`.
pub fn render_help_overlay(ui: &mut egui::Ui, panel_rect: egui::Rect) {
    let font_id = egui::FontId::proportional(13.0);
    let text_color = egui::Color32::from_rgba_unmultiplied(255, 255, 255, 200);
    let key_color = egui::Color32::from_rgb(255, 200, 100);

    let max_key_len = all_help_sections()
        .iter()
        .flat_map(|(_, entries)| entries.iter())
        .map(|e| e.key.len())
        .max()
        .unwrap_or(10);
    let max_key_width = (max_key_len as f32) * 8.0 + 20.0;

    let overlay_rect = egui::Rect::from_min_size(
        panel_rect.left_top() + egui::vec2(10.0, 10.0),
        egui::vec2(
            (panel_rect.width() - 20.0).max(0.0),
            (panel_rect.height() - 20.0).max(0.0),
        ),
    );

    let mut child = ui.new_child(egui::UiBuilder::new().max_rect(overlay_rect));
    egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 180))
        .inner_margin(12.0)
        .corner_radius(4.0)
        .show(&mut child, |ui| {
            ui.set_max_width(max_key_width + 320.0);
            ui.label(egui::RichText::new(INTRO).font(font_id.clone()).color(text_color));
            for (title, entries) in all_help_sections() {
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(title)
                        .font(font_id.clone())
                        .color(egui::Color32::GRAY),
                );
                for entry in entries {
                    ui.horizontal(|ui| {
                        ui.add_sized(
                            [max_key_width, 18.0],
                            egui::Label::new(
                                egui::RichText::new(entry.key)
                                    .font(font_id.clone())
                                    .color(key_color),
                            ),
                        );
                        ui.label(
                            egui::RichText::new(entry.desc)
                                .font(font_id.clone())
                                .color(text_color),
                        );
                    });
                }
            }
        });
}
