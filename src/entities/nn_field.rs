//! Nearest neighbor field buffer.
//!
//! Each pixel stores at least two components: the X and Y of its best
//! match (absolute or offset, see `pick::Interpretation`). Extra components,
//! typically the patch distance, are kept but only shown through `channel`.

use anyhow::{Context, Result, bail};
use log::info;
use std::path::{Path, PathBuf};

use super::metaimage;
use super::region::{Point, Region};

/// Field file extensions understood by `NnField::load`.
pub const FIELD_EXTS: &[&str] = &["mha", "mhd"];

/// Single-channel float image derived from the field.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarPlane {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl ScalarPlane {
    /// Finite min/max, or None when no finite value exists.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[derive(Debug, Clone)]
pub struct NnField {
    width: u32,
    height: u32,
    components: usize,
    data: Vec<f32>,
    path: Option<PathBuf>,
}

impl NnField {
    /// Build from interleaved data. Requires at least two components.
    pub fn new(width: u32, height: u32, components: usize, data: Vec<f32>) -> Result<Self> {
        if components < 2 {
            bail!("NN field needs at least 2 components, got {}", components);
        }
        let expected = width as usize * height as usize * components;
        if data.len() != expected {
            bail!(
                "NN field data has {} values, expected {} ({}x{}x{})",
                data.len(),
                expected,
                width,
                height,
                components
            );
        }
        Ok(Self {
            width,
            height,
            components,
            data,
            path: None,
        })
    }

    /// Load from a MetaImage file.
    pub fn load(path: &Path) -> Result<Self> {
        let image = metaimage::read(path)
            .with_context(|| format!("Failed to read NN field {}", path.display()))?;
        let width = u32::try_from(image.width).context("NN field too wide")?;
        let height = u32::try_from(image.height).context("NN field too tall")?;
        let mut field = Self::new(width, height, image.components, image.data)
            .with_context(|| format!("Invalid NN field {}", path.display()))?;
        field.path = Some(path.to_path_buf());
        info!(
            "Loaded NN field {} ({}x{}, {} components)",
            path.display(),
            width,
            height,
            field.components
        );
        Ok(field)
    }

    #[cfg(test)]
    pub fn save(&self, path: &Path, compress: bool) -> Result<()> {
        let image = metaimage::MetaImage {
            width: self.width as usize,
            height: self.height as usize,
            components: self.components,
            data: self.data.clone(),
        };
        metaimage::write(path, &image, compress)
            .with_context(|| format!("Failed to write NN field {}", path.display()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn region(&self) -> Region {
        Region::image(self.width, self.height)
    }

    /// Field vector at `p`, or None outside the field.
    pub fn get(&self, p: Point) -> Option<&[f32]> {
        if !self.region().contains(p) {
            return None;
        }
        let idx = (p.y as usize * self.width as usize + p.x as usize) * self.components;
        Some(&self.data[idx..idx + self.components])
    }

    /// Component `c` as a plane, or None past the last component.
    pub fn channel(&self, c: usize) -> Option<ScalarPlane> {
        if c >= self.components {
            return None;
        }
        Some(ScalarPlane {
            width: self.width,
            height: self.height,
            data: self
                .data
                .chunks_exact(self.components)
                .map(|px| px[c])
                .collect(),
        })
    }

    /// Euclidean norm of the first two components.
    pub fn magnitude(&self) -> ScalarPlane {
        ScalarPlane {
            width: self.width,
            height: self.height,
            data: self
                .data
                .chunks_exact(self.components)
                .map(|px| px[0].hypot(px[1]))
                .collect(),
        }
    }
}

/// True if `path` has a field extension.
pub fn is_field_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| FIELD_EXTS.contains(&s.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_2x2() -> NnField {
        // (x, y, distance) per pixel
        NnField::new(
            2,
            2,
            3,
            vec![
                3.0, 4.0, 0.5, //
                1.0, 0.0, 0.0, //
                0.0, -2.0, 9.0, //
                6.0, 8.0, 1.0,
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(NnField::new(2, 2, 1, vec![0.0; 4]).is_err());
        assert!(NnField::new(2, 2, 2, vec![0.0; 7]).is_err());
    }

    #[test]
    fn get_is_row_major() {
        let f = field_2x2();
        assert_eq!(f.get(Point::new(1, 0)), Some(&[1.0, 0.0, 0.0][..]));
        assert_eq!(f.get(Point::new(0, 1)), Some(&[0.0, -2.0, 9.0][..]));
        assert_eq!(f.get(Point::new(2, 0)), None);
        assert_eq!(f.get(Point::new(0, -1)), None);
    }

    #[test]
    fn magnitude_ignores_extra_components() {
        let m = field_2x2().magnitude();
        assert_eq!(m.data, vec![5.0, 1.0, 2.0, 10.0]);
        assert_eq!(m.range(), Some((1.0, 10.0)));
    }

    #[test]
    fn channels_split_components() {
        let f = field_2x2();
        assert_eq!(f.channel(0).unwrap().data, vec![3.0, 1.0, 0.0, 6.0]);
        assert_eq!(f.channel(1).unwrap().data, vec![4.0, 0.0, -2.0, 8.0]);
        assert_eq!(f.channel(2).unwrap().data, vec![0.5, 0.0, 9.0, 1.0]);
    }

    #[test]
    fn channel_past_components_is_none() {
        let f = field_2x2();
        assert_eq!(f.channel(3), None);
        assert_eq!(f.channel(usize::MAX), None);
    }

    #[test]
    fn range_skips_non_finite() {
        let p = ScalarPlane {
            width: 3,
            height: 1,
            data: vec![f32::NAN, 2.0, f32::INFINITY],
        };
        assert_eq!(p.range(), Some((2.0, 2.0)));
        let empty = ScalarPlane { width: 1, height: 1, data: vec![f32::NAN] };
        assert_eq!(empty.range(), None);
    }

    #[test]
    fn save_and_load_keeps_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.mha");
        field_2x2().save(&path, false).unwrap();
        let loaded = NnField::load(&path).unwrap();
        assert_eq!(loaded.path(), Some(path.as_path()));
        assert_eq!(loaded.get(Point::new(1, 1)), Some(&[6.0, 8.0, 1.0][..]));
    }

    #[test]
    fn single_component_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scalar.mha");
        let img = metaimage::MetaImage { width: 2, height: 1, components: 1, data: vec![1.0, 2.0] };
        metaimage::write(&path, &img, false).unwrap();
        let err = NnField::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("at least 2 components"));
    }

    #[test]
    fn field_extensions() {
        assert!(is_field_path(Path::new("a/b/nnf.MHA")));
        assert!(is_field_path(Path::new("nnf.mhd")));
        assert!(!is_field_path(Path::new("nnf.png")));
    }
}
