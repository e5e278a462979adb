//! Shared file dialog helpers for widget UI.

use std::path::Path;

use crate::entities::color_image::IMAGE_EXTS;
use crate::entities::nn_field::FIELD_EXTS;

fn with_start_dir(dialog: rfd::FileDialog, dir: Option<&Path>) -> rfd::FileDialog {
    match dir {
        Some(d) if d.is_dir() => dialog.set_directory(d),
        _ => dialog,
    }
}

/// Create configured file dialog for color images.
pub fn create_image_dialog(title: &str, dir: Option<&Path>) -> rfd::FileDialog {
    let dialog = rfd::FileDialog::new()
        .add_filter("Image Files", IMAGE_EXTS)
        .add_filter("All Files", &["*"])
        .set_title(title);
    with_start_dir(dialog, dir)
}

/// Create configured file dialog for NN fields.
pub fn create_field_dialog(title: &str, dir: Option<&Path>) -> rfd::FileDialog {
    let dialog = rfd::FileDialog::new()
        .add_filter("MetaImage Files", FIELD_EXTS)
        .add_filter("All Files", &["*"])
        .set_title(title);
    with_start_dir(dialog, dir)
}
