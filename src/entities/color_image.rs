//! Source image over which the field is defined.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};

use super::region::{Point, Region};

/// Image extensions accepted by the open dialog and drag-and-drop.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "tga"];

/// 8-bit RGB image.
#[derive(Debug, Clone)]
pub struct ColorImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    path: Option<PathBuf>,
}

impl ColorImage {
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            bail!("RGB buffer has {} bytes, expected {}", rgb.len(), expected);
        }
        Ok(Self {
            width,
            height,
            rgb,
            path: None,
        })
    }

    /// Decode with the `image` crate. Alpha is dropped.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Decoding image {}", path.display());
        let decoded = image::ImageReader::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to detect format of {}", path.display()))?
            .decode()
            .with_context(|| format!("Failed to decode image {}", path.display()))?;

        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        info!("Loaded image {} ({}x{})", path.display(), width, height);
        Ok(Self {
            width,
            height,
            rgb: rgb.into_raw(),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn region(&self) -> Region {
        Region::image(self.width, self.height)
    }

    pub fn pixel(&self, p: Point) -> Option<[u8; 3]> {
        if !self.region().contains(p) {
            return None;
        }
        let i = (p.y as usize * self.width as usize + p.x as usize) * 3;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }

    /// Opaque RGBA copy for texture upload.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.rgb
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect()
    }
}

/// True if `path` has an image extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| IMAGE_EXTS.contains(&s.to_lowercase().as_str()))
        .unwrap_or(false)
}
