//! Inspector state: the loaded buffers, the current pick and the display layers.
//!
//! This is the model behind the main window. It has no egui dependency:
//! widgets turn user input into events, `main_events` calls the methods
//! here, and the viewport reads `layers()` back for display.

use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use std::path::Path;

use super::color_image::ColorImage;
use super::layers::{DisplayLayers, LayerKind};
use super::nn_field::NnField;
use super::overlay;
use super::pick::{self, Interpretation, PickRejection, PickResult};
use super::region::Point;

pub const DEFAULT_PATCH_RADIUS: u32 = 7;
pub const MAX_PATCH_RADIUS: u32 = 256;

/// One-pixel move of the pick, in image space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Mirror the direction along the flipped axes.
    pub fn flipped(self, flip_x: bool, flip_y: bool) -> Self {
        match self {
            Direction::Left if flip_x => Direction::Right,
            Direction::Right if flip_x => Direction::Left,
            Direction::Up if flip_y => Direction::Down,
            Direction::Down if flip_y => Direction::Up,
            other => other,
        }
    }
}

/// What the status bar shows for the pixel under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub point: Point,
    pub color: Option<[u8; 3]>,
    pub field: Option<Vec<f32>>,
}

/// Parse "x y ..." (whitespace or comma separated) into a point.
pub fn parse_pick_text(text: &str) -> Result<Point> {
    let mut nums = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("'{}' is not an integer", s))
        });
    let x = nums.next().ok_or_else(|| anyhow!("no coordinates in '{}'", text.trim()))??;
    let y = nums
        .next()
        .ok_or_else(|| anyhow!("missing y coordinate in '{}'", text.trim()))??;
    Ok(Point::new(x, y))
}

pub struct Inspector {
    image: Option<ColorImage>,
    field: Option<NnField>,
    last_pick: Option<Point>,
    last_result: Option<PickResult>,
    interpretation: Interpretation,
    patch_radius: u32,
    selected_layer: LayerKind,
    layers: DisplayLayers,
}

impl Default for Inspector {
    fn default() -> Self {
        Self {
            image: None,
            field: None,
            last_pick: None,
            last_result: None,
            interpretation: Interpretation::default(),
            patch_radius: DEFAULT_PATCH_RADIUS,
            selected_layer: LayerKind::default(),
            layers: DisplayLayers::default(),
        }
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Loading =====

    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        let image = ColorImage::load(path)?;
        self.set_image(image);
        Ok(())
    }

    pub fn load_field(&mut self, path: &Path) -> Result<()> {
        let field = NnField::load(path)?;
        self.set_field(field);
        Ok(())
    }

    pub fn set_image(&mut self, image: ColorImage) {
        self.layers.set_image(&image);
        self.image = Some(image);
        self.check_sizes();
        self.reset_highlight();
    }

    pub fn set_field(&mut self, field: NnField) {
        self.layers.set_field(&field);
        self.field = Some(field);
        self.check_sizes();
        self.reset_highlight();
    }

    fn check_sizes(&self) {
        if let (Some(img), Some(field)) = (&self.image, &self.field)
            && (img.width(), img.height()) != (field.width(), field.height())
        {
            warn!(
                "Image is {}x{} but NN field is {}x{}",
                img.width(),
                img.height(),
                field.width(),
                field.height()
            );
        }
    }

    /// Drop the overlay. The last pick position is kept so arrows still work.
    fn reset_highlight(&mut self) {
        self.last_result = None;
        self.layers.clear_overlay();
    }

    // ===== Picking =====

    /// Pick `point`: outline its patch and the patch its field vector points at.
    ///
    /// The point becomes `last_pick` even when rejected.
    pub fn pick(&mut self, point: Point) -> Result<PickResult, PickRejection> {
        self.last_pick = Some(point);
        info!("Picked index: {}", point);

        let result = pick::resolve_pick(
            self.image.as_ref().map(|i| i.region()),
            self.field.as_ref(),
            point,
            self.patch_radius,
            self.interpretation,
        );

        match result {
            Ok(r) => {
                info!("Best match center: {}", r.match_center);
                if r.matched_clipped {
                    debug!("Matched patch {} extends past the image", r.matched);
                }
                if let Some(img) = &self.image {
                    self.layers
                        .set_overlay(overlay::render(img.width(), img.height(), &r));
                }
                self.last_result = Some(r);
                Ok(r)
            }
            Err(e) => {
                match e {
                    PickRejection::NoImage | PickRejection::NoField => error!("{}", e),
                    _ => warn!("{}", e),
                }
                Err(e)
            }
        }
    }

    /// Re-pick one pixel away from the last pick.
    pub fn nudge(&mut self, direction: Direction) -> Option<Result<PickResult, PickRejection>> {
        let Some(last) = self.last_pick else {
            error!("You cannot use the arrow keys until a click has been made.");
            return None;
        };
        let (dx, dy) = direction.delta();
        Some(self.pick(last.offset(dx, dy)))
    }

    /// Pick at the coordinates carried by dropped or pasted text.
    pub fn drop_text(&mut self, text: &str) -> Result<Result<PickResult, PickRejection>> {
        info!("Dropped {}", text.trim());
        let point = parse_pick_text(text)?;
        debug!("Last pick set from drop: {}", point);
        Ok(self.pick(point))
    }

    /// "pick_x pick_y match_x match_y" of the last successful pick.
    pub fn drag_payload(&self) -> Option<String> {
        self.last_result.map(|r| {
            format!(
                "{} {} {} {}",
                r.pick.x, r.pick.y, r.match_center.x, r.match_center.y
            )
        })
    }

    /// Re-run the last successful pick with the current parameters.
    /// If it no longer resolves, the highlight is dropped. `last_pick` is kept.
    fn repick(&mut self) {
        let Some(previous) = self.last_result.map(|r| r.pick) else {
            return;
        };
        let last_pick = self.last_pick;
        if let Err(e) = self.pick(previous) {
            warn!("Highlight at {} cleared: {}", previous, e);
            self.reset_highlight();
        }
        self.last_pick = last_pick;
    }

    // ===== Settings =====

    pub fn set_interpretation(&mut self, interpretation: Interpretation) {
        if self.interpretation == interpretation {
            return;
        }
        info!("Interpreting NN field as {}", interpretation.label());
        self.interpretation = interpretation;
        self.repick();
    }

    pub fn set_patch_radius(&mut self, radius: u32) {
        let radius = radius.clamp(1, MAX_PATCH_RADIUS);
        if self.patch_radius == radius {
            return;
        }
        info!("Patch radius: {}", radius);
        self.patch_radius = radius;
        self.repick();
    }

    pub fn select_layer(&mut self, kind: LayerKind) {
        debug!("Selected layer: {}", kind.label());
        self.selected_layer = kind;
    }

    // ===== Accessors =====

    pub fn image(&self) -> Option<&ColorImage> {
        self.image.as_ref()
    }

    pub fn field(&self) -> Option<&NnField> {
        self.field.as_ref()
    }

    pub fn last_pick(&self) -> Option<Point> {
        self.last_pick
    }

    pub fn last_result(&self) -> Option<&PickResult> {
        self.last_result.as_ref()
    }

    pub fn best_match(&self) -> Option<Point> {
        self.last_result.map(|r| r.match_center)
    }

    pub fn interpretation(&self) -> Interpretation {
        self.interpretation
    }

    pub fn patch_radius(&self) -> u32 {
        self.patch_radius
    }

    pub fn selected_layer(&self) -> LayerKind {
        self.selected_layer
    }

    pub fn layers(&self) -> &DisplayLayers {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut DisplayLayers {
        &mut self.layers
    }

    /// Size of what the viewport shows: the image, or the field alone.
    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.image
            .as_ref()
            .map(|i| (i.width(), i.height()))
            .or_else(|| self.field.as_ref().map(|f| (f.width(), f.height())))
    }

    pub fn hover_info(&self, point: Point) -> HoverInfo {
        HoverInfo {
            point,
            color: self.image.as_ref().and_then(|i| i.pixel(point)),
            field: self
                .field
                .as_ref()
                .and_then(|f| f.get(point))
                .map(|v| v.to_vec()),
        }
    }
}
