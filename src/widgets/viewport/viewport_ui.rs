//! Viewport widget - UI rendering

use eframe::egui;
use log::{debug, trace};
use std::collections::HashMap;

use super::ViewportState;
use crate::entities::inspector_events::{OpenImageEvent, PickEvent};
use crate::entities::{Inspector, LayerKind, Point, RgbaBuffer};
use crate::widgets::actions::ActionQueue;

pub type ViewportActions = ActionQueue;

/// GPU copies of the display layers, refreshed when the model marks them dirty.
#[derive(Default)]
pub struct ViewportTextures {
    layers: HashMap<LayerKind, egui::TextureHandle>,
    overlay: Option<egui::TextureHandle>,
}

impl ViewportTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload every layer that changed since the previous frame.
    pub fn sync(&mut self, ctx: &egui::Context, inspector: &mut Inspector) {
        let layers = inspector.layers_mut();
        for kind in LayerKind::ALL {
            if let Some(buffer) = layers.take_dirty(kind) {
                let mut slot = self.layers.remove(&kind);
                upload(ctx, kind.label(), buffer, &mut slot);
                if let Some(tex) = slot {
                    self.layers.insert(kind, tex);
                }
            }
        }
        if let Some(buffer) = layers.take_overlay_dirty() {
            upload(ctx, "pick_overlay", buffer, &mut self.overlay);
        }
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&egui::TextureHandle> {
        self.layers.get(&kind)
    }
}

fn upload(
    ctx: &egui::Context,
    name: &str,
    buffer: Option<&RgbaBuffer>,
    slot: &mut Option<egui::TextureHandle>,
) {
    let Some(buffer) = buffer else {
        *slot = None;
        return;
    };
    let image = egui::ColorImage::from_rgba_unmultiplied(
        [buffer.width as usize, buffer.height as usize],
        &buffer.pixels,
    );
    trace!("Uploading {} ({}x{})", name, buffer.width, buffer.height);
    match slot {
        Some(tex) => tex.set(image, egui::TextureOptions::NEAREST),
        None => *slot = Some(ctx.load_texture(name, image, egui::TextureOptions::NEAREST)),
    }
}

/// Render the viewport into the remaining central area.
///
/// Returns queued events and the pixel under the cursor, if any.
pub fn render(
    ui: &mut egui::Ui,
    inspector: &mut Inspector,
    viewport_state: &mut ViewportState,
    textures: &mut ViewportTextures,
    overlay_opacity: f32,
    show_help: bool,
) -> (ViewportActions, Option<Point>) {
    let mut actions = ViewportActions::default();

    let ctx = ui.ctx().clone();
    let panel_rect = ui.max_rect();
    ui.painter()
        .rect_filled(panel_rect, 0.0, egui::Color32::from_gray(24));

    textures.sync(&ctx, inspector);

    let response = ui.interact(
        panel_rect,
        ui.id().with("viewport_interaction"),
        egui::Sense::click_and_drag(),
    );
    viewport_state.set_viewport_size(panel_rect.size());
    let Some((w, h)) = inspector.display_size() else {
        ui.painter().text(
            panel_rect.center(),
            egui::Align2::CENTER_CENTER,
            "Open an image (Ctrl+O) and an NN field (Ctrl+Shift+O), or drop them here",
            egui::FontId::proportional(16.0),
            egui::Color32::GRAY,
        );
        if response.double_clicked() {
            actions.send(OpenImageEvent(None));
        }
        if show_help {
            crate::help::render_help_overlay(ui, panel_rect);
        }
        return (actions, None);
    };
    viewport_state.set_image_size(egui::vec2(w as f32, h as f32));

    handle_viewport_input(&ctx, panel_rect, viewport_state, response.hovered());

    let image_rect = viewport_state
        .image_screen_rect()
        .translate(panel_rect.left_top().to_vec2());
    let uv = viewport_state.uv_rect();
    let painter = ui.painter_at(panel_rect);

    let selected = inspector.selected_layer();
    match textures.layer(selected) {
        Some(tex) => {
            painter.image(tex.id(), image_rect, uv, egui::Color32::WHITE);
        }
        None => {
            painter.rect_stroke(
                image_rect,
                0.0,
                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
                egui::StrokeKind::Inside,
            );
            painter.text(
                image_rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("{}: nothing loaded", selected.label()),
                egui::FontId::proportional(14.0),
                egui::Color32::GRAY,
            );
        }
    }

    if inspector.layers().overlay_visible
        && let Some(tex) = &textures.overlay
    {
        let alpha = (overlay_opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        painter.image(tex.id(), image_rect, uv, egui::Color32::from_white_alpha(alpha));
    }

    let to_local = |pos: egui::Pos2| pos - panel_rect.left_top();

    if response.clicked_by(egui::PointerButton::Primary)
        && let Some(pos) = response.interact_pointer_pos()
    {
        match viewport_state.pixel_at(to_local(pos)) {
            Some(point) => actions.send(PickEvent(point)),
            None => debug!("Click outside the image ignored"),
        }
    }

    let hovered_pixel = response
        .hover_pos()
        .and_then(|pos| viewport_state.pixel_at(to_local(pos)));

    if show_help {
        crate::help::render_help_overlay(ui, panel_rect);
    }

    (actions, hovered_pixel)
}

fn handle_viewport_input(
    ctx: &egui::Context,
    rect: egui::Rect,
    viewport_state: &mut ViewportState,
    is_hovered: bool,
) {
    if !is_hovered {
        return;
    }

    let scroll_delta = ctx.input(|i| i.raw_scroll_delta);
    if scroll_delta.y.abs() > 0.1
        && let Some(cursor_pos) = ctx.input(|i| i.pointer.hover_pos())
        && rect.contains(cursor_pos)
    {
        viewport_state.handle_zoom(scroll_delta.y, cursor_pos - rect.left_top());
        ctx.request_repaint();
    }

    let pointer = ctx.input(|i| i.pointer.clone());
    if pointer.button_down(egui::PointerButton::Middle) {
        let delta = pointer.delta();
        if delta.length() > 0.1 {
            viewport_state.handle_pan(delta);
            ctx.request_repaint();
        }
    }
}
