use eframe::egui;
use log::{debug, info};

use crate::entities::Point;

// Zoom constants
const ZOOM_STEP: f32 = 0.1;
const ZOOM_IN_FACTOR: f32 = 1.0 + ZOOM_STEP;
const ZOOM_OUT_FACTOR: f32 = 1.0 / ZOOM_IN_FACTOR;
const ZOOM_MIN: f32 = 0.01;
const ZOOM_MAX: f32 = 100.0;

/// Viewport mode
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum ViewportMode {
    /// Manual mode - user controls zoom/pan, nothing auto-adjusts
    Manual,
    /// Auto-fit mode - image fits to window, adjusts on resize
    AutoFit,
    /// Auto-100% mode - one image pixel per screen point
    Auto100,
}

/// Viewport state for pan/zoom/flip.
///
/// Screen positions are relative to the viewport's top-left corner, y down.
/// Image positions are pixel coordinates of the unflipped image.
#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct ViewportState {
    pub zoom: f32,
    pub pan: egui::Vec2,
    pub mode: ViewportMode,
    pub flip_x: bool,
    pub flip_y: bool,
    #[serde(skip)]
    pub image_size: egui::Vec2,
    #[serde(skip)]
    pub viewport_size: egui::Vec2,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
            mode: ViewportMode::AutoFit,
            flip_x: false,
            flip_y: false,
            image_size: egui::Vec2::ZERO,
            viewport_size: egui::Vec2::new(800.0, 600.0),
        }
    }
}

impl ViewportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset zoom and pan. Flips are kept.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = egui::Vec2::ZERO;
        self.mode = ViewportMode::AutoFit;
        self.apply_fit();
    }

    /// Update viewport size (called when window resizes)
    pub fn set_viewport_size(&mut self, size: egui::Vec2) {
        if self.viewport_size == size {
            return;
        }
        self.viewport_size = size;
        if self.mode == ViewportMode::AutoFit {
            self.apply_fit();
        }
    }

    /// Update image size (called when new image loads)
    pub fn set_image_size(&mut self, size: egui::Vec2) {
        if self.image_size == size {
            return;
        }
        self.image_size = size;
        if self.mode == ViewportMode::AutoFit {
            self.apply_fit();
        }
    }

    /// Set AutoFit mode and apply fit
    pub fn set_mode_fit(&mut self) {
        info!("Viewport mode: AutoFit");
        self.mode = ViewportMode::AutoFit;
        self.apply_fit();
    }

    /// Set Auto100 mode and apply 100% zoom
    pub fn set_mode_100(&mut self) {
        info!("Viewport mode: Auto100");
        self.mode = ViewportMode::Auto100;
        self.apply_100();
    }

    pub fn toggle_flip_x(&mut self) {
        self.flip_x = !self.flip_x;
        info!("Flip horizontal: {}", self.flip_x);
    }

    pub fn toggle_flip_y(&mut self) {
        self.flip_y = !self.flip_y;
        info!("Flip vertical: {}", self.flip_y);
    }

    fn apply_fit(&mut self) {
        if self.image_size.x <= 0.0 || self.image_size.y <= 0.0 {
            return;
        }
        let scale_x = self.viewport_size.x / self.image_size.x;
        let scale_y = self.viewport_size.y / self.image_size.y;
        self.zoom = scale_x.min(scale_y).clamp(ZOOM_MIN, ZOOM_MAX);
        self.pan = egui::Vec2::ZERO;
    }

    fn apply_100(&mut self) {
        self.zoom = 1.0;
        self.pan = egui::Vec2::ZERO;
    }

    /// Handle zoom with center-on-cursor (switches to Manual mode)
    pub fn handle_zoom(&mut self, zoom_delta: f32, cursor_pos: egui::Vec2) {
        if zoom_delta.abs() < 0.001 {
            return;
        }

        self.mode = ViewportMode::Manual;

        let old_zoom = self.zoom;
        let zoom_factor = if zoom_delta > 0.0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        self.zoom = (self.zoom * zoom_factor).clamp(ZOOM_MIN, ZOOM_MAX);

        // Keep the point under the cursor stationary
        let zoom_ratio = self.zoom / old_zoom;
        let cursor_to_center = cursor_pos - self.viewport_size * 0.5;
        self.pan = cursor_to_center - (cursor_to_center - self.pan) * zoom_ratio;

        debug!(
            "Zoom: {:.2}x, Pan: ({:.1}, {:.1})",
            self.zoom, self.pan.x, self.pan.y
        );
    }

    /// Handle pan (switches to Manual mode)
    pub fn handle_pan(&mut self, delta: egui::Vec2) {
        self.mode = ViewportMode::Manual;
        self.pan += delta;
        debug!("Pan: ({:.1}, {:.1})", self.pan.x, self.pan.y);
    }

    fn center(&self) -> egui::Vec2 {
        self.viewport_size * 0.5 + self.pan
    }

    /// Image bounds in screen space (unaffected by flips).
    pub fn image_screen_rect(&self) -> egui::Rect {
        let half = self.image_size * self.zoom * 0.5;
        let c = self.center();
        egui::Rect::from_min_max((c - half).to_pos2(), (c + half).to_pos2())
    }

    /// Texture coordinates for the image rect, mirrored by the flips.
    pub fn uv_rect(&self) -> egui::Rect {
        let (u0, u1) = if self.flip_x { (1.0, 0.0) } else { (0.0, 1.0) };
        let (v0, v1) = if self.flip_y { (1.0, 0.0) } else { (0.0, 1.0) };
        egui::Rect::from_min_max(egui::pos2(u0, v0), egui::pos2(u1, v1))
    }

    /// Convert image space coordinates (0..image_size) to screen space
    pub fn image_to_screen(&self, image_pos: egui::Vec2) -> egui::Vec2 {
        let mut local = image_pos - self.image_size * 0.5;
        if self.flip_x {
            local.x = -local.x;
        }
        if self.flip_y {
            local.y = -local.y;
        }
        local * self.zoom + self.center()
    }

    /// Convert screen space coordinates to image space (0..image_size).
    /// Returns None if position is outside the image bounds.
    pub fn screen_to_image(&self, screen_pos: egui::Vec2) -> Option<egui::Vec2> {
        if self.zoom <= 0.0 {
            return None;
        }
        let mut local = (screen_pos - self.center()) / self.zoom;
        if self.flip_x {
            local.x = -local.x;
        }
        if self.flip_y {
            local.y = -local.y;
        }
        let image = local + self.image_size * 0.5;

        if image.x >= 0.0
            && image.x < self.image_size.x
            && image.y >= 0.0
            && image.y < self.image_size.y
        {
            Some(image)
        } else {
            None
        }
    }

    /// Pixel under a screen position.
    pub fn pixel_at(&self, screen_pos: egui::Vec2) -> Option<Point> {
        self.screen_to_image(screen_pos)
            .map(|p| Point::new(p.x.floor() as i64, p.y.floor() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(w: f32, h: f32) -> ViewportState {
        let mut vs = ViewportState::new();
        vs.set_viewport_size(egui::vec2(400.0, 200.0));
        vs.set_image_size(egui::vec2(w, h));
        vs
    }

    #[test]
    fn fit_uses_smaller_scale() {
        let vs = state(100.0, 100.0);
        assert_eq!(vs.zoom, 2.0);
        assert_eq!(
            vs.image_screen_rect(),
            egui::Rect::from_min_max(egui::pos2(100.0, 0.0), egui::pos2(300.0, 200.0))
        );
    }

    #[test]
    fn pixel_at_follows_flips() {
        let mut vs = state(100.0, 100.0);
        // Screen (101, 1) is the top-left pixel.
        assert_eq!(vs.pixel_at(egui::vec2(101.0, 1.0)), Some(Point::new(0, 0)));
        vs.toggle_flip_x();
        assert_eq!(vs.pixel_at(egui::vec2(101.0, 1.0)), Some(Point::new(99, 0)));
        vs.toggle_flip_y();
        assert_eq!(vs.pixel_at(egui::vec2(101.0, 1.0)), Some(Point::new(99, 99)));
        assert_eq!(vs.pixel_at(egui::vec2(50.0, 1.0)), None);
    }

    #[test]
    fn image_to_screen_inverts_screen_to_image() {
        let mut vs = state(64.0, 32.0);
        vs.toggle_flip_y();
        vs.handle_pan(egui::vec2(13.0, -7.0));
        let p = egui::vec2(10.5, 20.25);
        let back = vs.screen_to_image(vs.image_to_screen(p)).unwrap();
        assert!((back - p).length() < 1e-3);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut vs = state(100.0, 100.0);
        let cursor = egui::vec2(150.0, 60.0);
        let before = vs.screen_to_image(cursor).unwrap();
        vs.handle_zoom(1.0, cursor);
        assert_eq!(vs.mode, ViewportMode::Manual);
        let after = vs.screen_to_image(cursor).unwrap();
        assert!((after - before).length() < 1e-3);
    }

    #[test]
    fn uv_rect_mirrors() {
        let mut vs = state(10.0, 10.0);
        vs.toggle_flip_x();
        let uv = vs.uv_rect();
        assert_eq!((uv.min.x, uv.max.x), (1.0, 0.0));
        assert_eq!((uv.min.y, uv.max.y), (0.0, 1.0));
    }
}
