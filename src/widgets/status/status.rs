use eframe::egui;
use std::path::Path;

use crate::entities::{HoverInfo, Inspector};
use crate::widgets::viewport::ViewportState;

/// Status bar component
#[derive(Default)]
pub struct StatusBar {
    pub current_message: String,
}

fn file_label(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "---".to_string())
}

/// "x y: r g b | dx dy" for the pixel under the cursor.
pub fn format_hover(info: &HoverInfo) -> String {
    let mut text = format!("{:>5} {:<5}", info.point.x, info.point.y);
    if let Some([r, g, b]) = info.color {
        text.push_str(&format!(" rgb {:>3} {:>3} {:>3}", r, g, b));
    }
    if let Some(v) = &info.field {
        let values: Vec<String> = v.iter().map(|c| format!("{:.1}", c)).collect();
        text.push_str(&format!(" nnf {}", values.join(" ")));
    }
    text
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.current_message = msg.into();
    }

    /// Render status bar at bottom of screen
    pub fn render(
        &self,
        ctx: &egui::Context,
        inspector: &Inspector,
        viewport_state: &ViewportState,
        hover: Option<&HoverInfo>,
    ) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                // Image
                match inspector.image() {
                    Some(img) => {
                        ui.monospace(file_label(img.path()));
                        ui.monospace(format!("{:>4}x{:<4}", img.width(), img.height()));
                    }
                    None => {
                        ui.monospace("No image");
                    }
                }

                ui.separator();

                // Field
                match inspector.field() {
                    Some(field) => {
                        ui.monospace(file_label(field.path()));
                        ui.monospace(format!(
                            "{}x{} {}c",
                            field.width(),
                            field.height(),
                            field.components()
                        ));
                    }
                    None => {
                        ui.monospace("No NN field");
                    }
                }

                ui.separator();

                ui.monospace(format!("{:>6.1}%", viewport_state.zoom * 100.0));
                if viewport_state.flip_x {
                    ui.monospace("FlipH");
                }
                if viewport_state.flip_y {
                    ui.monospace("FlipV");
                }

                ui.separator();

                ui.monospace(format!(
                    "{} r={}",
                    inspector.interpretation().label(),
                    inspector.patch_radius()
                ));

                if let Some(r) = inspector.last_result() {
                    ui.separator();
                    ui.monospace(format!("Selected: {}  NN: {}", r.pick, r.match_center));
                }

                if let Some(info) = hover {
                    ui.separator();
                    ui.monospace(format_hover(info));
                }

                if !self.current_message.is_empty() {
                    ui.separator();
                    ui.monospace(&self.current_message);
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Point;

    #[test]
    fn hover_text_lists_available_values() {
        let info = HoverInfo {
            point: Point::new(3, 14),
            color: Some([1, 2, 255]),
            field: Some(vec![-2.0, 0.5]),
        };
        assert_eq!(format_hover(&info), "    3 14    rgb   1   2 255 nnf -2.0 0.5");
        let bare = HoverInfo {
            point: Point::new(0, 0),
            color: None,
            field: None,
        };
        assert_eq!(format_hover(&bare), "    0 0    ");
    }

    #[test]
    fn file_label_falls_back() {
        assert_eq!(file_label(None), "---");
        assert_eq!(file_label(Some(Path::new("/a/b/nnf.mha"))), "nnf.mha");
    }
}
