//! Display layers.
//!
//! Four base layers share the viewport and exactly one is visible at a time.
//! The pick overlay sits on top of whichever base layer is selected and is
//! shown once a pick succeeded.

use rayon::prelude::*;

use super::color_image::ColorImage;
use super::nn_field::{NnField, ScalarPlane};
use super::overlay::RgbaBuffer;

/// Base layer choice (radio semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum LayerKind {
    #[default]
    Image,
    FieldMagnitude,
    FieldX,
    FieldY,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Image,
        LayerKind::FieldMagnitude,
        LayerKind::FieldX,
        LayerKind::FieldY,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Image => "RGB",
            LayerKind::FieldMagnitude => "NN Field Magnitude",
            LayerKind::FieldX => "NN Field X",
            LayerKind::FieldY => "NN Field Y",
        }
    }

    fn slot(&self) -> usize {
        match self {
            LayerKind::Image => 0,
            LayerKind::FieldMagnitude => 1,
            LayerKind::FieldX => 2,
            LayerKind::FieldY => 3,
        }
    }
}

/// Grayscale RGBA from a scalar plane, stretched over its finite range.
///
/// Constant planes and non-finite values map to black.
pub fn scalar_to_gray(plane: &ScalarPlane) -> RgbaBuffer {
    let (lo, hi) = plane.range().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    let width = plane.width as usize;
    let mut pixels = vec![0u8; plane.data.len() * 4];

    if width > 0 {
        pixels
            .par_chunks_mut(width * 4)
            .zip(plane.data.par_chunks(width))
            .for_each(|(out, row)| {
                for (px, &v) in out.chunks_exact_mut(4).zip(row) {
                    let g = if span > 0.0 && v.is_finite() {
                        (((v - lo) / span) * 255.0).round().clamp(0.0, 255.0) as u8
                    } else {
                        0
                    };
                    px.copy_from_slice(&[g, g, g, 255]);
                }
            });
    }

    RgbaBuffer {
        width: plane.width,
        height: plane.height,
        pixels,
    }
}

/// A layer buffer plus a flag telling the viewport to re-upload it.
#[derive(Debug, Clone, Default)]
pub struct LayerSlot {
    pub buffer: Option<RgbaBuffer>,
    pub dirty: bool,
}

impl LayerSlot {
    fn set(&mut self, buffer: Option<RgbaBuffer>) {
        self.buffer = buffer;
        self.dirty = true;
    }
}

/// All display buffers owned by the inspector.
#[derive(Debug, Clone, Default)]
pub struct DisplayLayers {
    base: [LayerSlot; 4],
    overlay: LayerSlot,
    pub overlay_visible: bool,
}

impl DisplayLayers {
    pub fn set_image(&mut self, image: &ColorImage) {
        self.base[LayerKind::Image.slot()].set(Some(RgbaBuffer {
            width: image.width(),
            height: image.height(),
            pixels: image.to_rgba(),
        }));
    }

    pub fn set_field(&mut self, field: &NnField) {
        self.base[LayerKind::FieldMagnitude.slot()].set(Some(scalar_to_gray(&field.magnitude())));
        self.base[LayerKind::FieldX.slot()].set(field.channel(0).as_ref().map(scalar_to_gray));
        self.base[LayerKind::FieldY.slot()].set(field.channel(1).as_ref().map(scalar_to_gray));
    }

    pub fn set_overlay(&mut self, overlay: RgbaBuffer) {
        self.overlay.set(Some(overlay));
        self.overlay_visible = true;
    }

    pub fn clear_overlay(&mut self) {
        self.overlay.set(None);
        self.overlay_visible = false;
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&RgbaBuffer> {
        self.base[kind.slot()].buffer.as_ref()
    }

    pub fn overlay(&self) -> Option<&RgbaBuffer> {
        self.overlay.buffer.as_ref().filter(|_| self.overlay_visible)
    }

    pub fn is_dirty(&self, kind: LayerKind) -> bool {
        self.base[kind.slot()].dirty
    }

    pub fn overlay_dirty(&self) -> bool {
        self.overlay.dirty
    }

    /// Take the buffer of `kind` for upload if it changed since the last call.
    pub fn take_dirty(&mut self, kind: LayerKind) -> Option<Option<&RgbaBuffer>> {
        let slot = &mut self.base[kind.slot()];
        if !slot.dirty {
            return None;
        }
        slot.dirty = false;
        Some(slot.buffer.as_ref())
    }

    /// Same as `take_dirty` for the overlay.
    pub fn take_overlay_dirty(&mut self) -> Option<Option<&RgbaBuffer>> {
        if !self.overlay.dirty {
            return None;
        }
        self.overlay.dirty = false;
        Some(self.overlay.buffer.as_ref())
    }
}
