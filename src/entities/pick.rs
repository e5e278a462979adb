//! Pick interpretation: from a clicked pixel to its best match.

use thiserror::Error;

use super::nn_field::NnField;
use super::region::{Point, Region};

/// How a field vector is read.
///
/// Absolute: the vector is the match center itself.
/// Offset: the vector is added to the picked pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Interpretation {
    #[default]
    Absolute,
    Offset,
}

impl Interpretation {
    pub fn label(&self) -> &'static str {
        match self {
            Interpretation::Absolute => "Absolute",
            Interpretation::Offset => "Offset",
        }
    }
}

impl std::str::FromStr for Interpretation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "absolute" | "abs" => Ok(Interpretation::Absolute),
            "offset" | "delta" => Ok(Interpretation::Offset),
            other => Err(format!("unknown interpretation '{}' (absolute|offset)", other)),
        }
    }
}

/// Why a pick produced no highlight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickRejection {
    #[error("Image must be set before clicking!")]
    NoImage,
    #[error("NN field must be set before clicking!")]
    NoField,
    #[error("Picked patch that is not entirely inside image! ({region})")]
    PatchOutsideImage { region: Region },
    #[error("Picked pixel {point} is outside the NN field")]
    OutsideField { point: Point },
}

/// A successful pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickResult {
    pub pick: Point,
    pub query: Region,
    pub match_center: Point,
    pub matched: Region,
    /// Matched region extends past the image and will be drawn clipped.
    pub matched_clipped: bool,
}

/// Field component as a pixel step: truncated toward zero, saturated to the
/// `i32` range, NaN as 0.
fn component(value: &[f32], c: usize) -> i64 {
    let v = value.get(c).copied().unwrap_or(0.0);
    i64::from(v.trunc() as i32)
}

/// Match center for a field vector. Components are truncated toward zero.
pub fn resolve_match_center(pick: Point, value: &[f32], interpretation: Interpretation) -> Point {
    let dx = component(value, 0);
    let dy = component(value, 1);
    match interpretation {
        Interpretation::Absolute => Point::new(dx, dy),
        Interpretation::Offset => pick.offset(dx, dy),
    }
}

/// Validate a pick and compute both patches.
///
/// Checks, in order: image loaded, field loaded, query patch fully inside
/// the image, pick inside the field.
pub fn resolve_pick(
    image: Option<Region>,
    field: Option<&NnField>,
    pick: Point,
    radius: u32,
    interpretation: Interpretation,
) -> Result<PickResult, PickRejection> {
    let image = image.ok_or(PickRejection::NoImage)?;
    let field = field.ok_or(PickRejection::NoField)?;

    let query = Region::around(pick, radius);
    if !query.is_inside(&image) {
        return Err(PickRejection::PatchOutsideImage { region: query });
    }

    let value = field
        .get(pick)
        .ok_or(PickRejection::OutsideField { point: pick })?;
    let match_center = resolve_match_center(pick, value, interpretation);
    let matched = Region::around(match_center, radius);

    Ok(PickResult {
        pick,
        query,
        match_center,
        matched,
        matched_clipped: !matched.is_inside(&image),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_field(w: u32, h: u32, v: [f32; 2]) -> NnField {
        let data = (0..w * h).flat_map(|_| v).collect();
        NnField::new(w, h, 2, data).unwrap()
    }

    #[test]
    fn absolute_uses_vector_directly() {
        let c = resolve_match_center(Point::new(5, 5), &[12.0, 3.0], Interpretation::Absolute);
        assert_eq!(c, Point::new(12, 3));
    }

    #[test]
    fn offset_adds_to_pick() {
        let c = resolve_match_center(Point::new(5, 5), &[-2.0, 7.0], Interpretation::Offset);
        assert_eq!(c, Point::new(3, 12));
    }

    #[test]
    fn fractional_components_truncate_toward_zero() {
        let c = resolve_match_center(Point::new(0, 0), &[2.9, -1.7], Interpretation::Absolute);
        assert_eq!(c, Point::new(2, -1));
    }

    #[test]
    fn preconditions_in_order() {
        let field = uniform_field(40, 40, [20.0, 20.0]);
        let img = Region::image(40, 40);
        let p = Point::new(20, 20);

        assert_eq!(
            resolve_pick(None, Some(&field), p, 7, Interpretation::Absolute),
            Err(PickRejection::NoImage)
        );
        assert_eq!(
            resolve_pick(Some(img), None, p, 7, Interpretation::Absolute),
            Err(PickRejection::NoField)
        );
        assert!(matches!(
            resolve_pick(Some(img), Some(&field), Point::new(3, 20), 7, Interpretation::Absolute),
            Err(PickRejection::PatchOutsideImage { .. })
        ));
    }

    #[test]
    fn field_smaller_than_image_is_reported() {
        let field = uniform_field(10, 10, [5.0, 5.0]);
        let r = resolve_pick(
            Some(Region::image(40, 40)),
            Some(&field),
            Point::new(20, 20),
            3,
            Interpretation::Absolute,
        );
        assert_eq!(r, Err(PickRejection::OutsideField { point: Point::new(20, 20) }));
    }

    #[test]
    fn match_outside_image_is_clipped_not_rejected() {
        let field = uniform_field(40, 40, [30.0, 0.0]);
        let r = resolve_pick(
            Some(Region::image(40, 40)),
            Some(&field),
            Point::new(20, 20),
            7,
            Interpretation::Offset,
        )
        .unwrap();
        assert_eq!(r.match_center, Point::new(50, 20));
        assert!(r.matched_clipped);
        assert_eq!(r.query, Region::around(Point::new(20, 20), 7));
    }

    #[test]
    fn huge_and_non_finite_components_saturate() {
        let c = resolve_match_center(Point::new(5, 5), &[1e30, -1e30], Interpretation::Absolute);
        assert_eq!(c, Point::new(i64::from(i32::MAX), i64::from(i32::MIN)));
        let c = resolve_match_center(Point::new(5, 5), &[f32::NAN, f32::INFINITY], Interpretation::Offset);
        assert_eq!(c, Point::new(5, 5 + i64::from(i32::MAX)));
    }

    #[test]
    fn huge_field_values_give_clipped_match() {
        let field = uniform_field(40, 40, [1e30, 1e30]);
        for interpretation in [Interpretation::Absolute, Interpretation::Offset] {
            let r = resolve_pick(
                Some(Region::image(40, 40)),
                Some(&field),
                Point::new(20, 20),
                7,
                interpretation,
            )
            .unwrap();
            assert!(r.matched_clipped);
            assert_eq!(r.matched.intersection(&Region::image(40, 40)), None);
        }
    }

    #[test]
    fn parses_interpretation_names() {
        assert_eq!("Offset".parse::<Interpretation>(), Ok(Interpretation::Offset));
        assert_eq!("absolute".parse::<Interpretation>(), Ok(Interpretation::Absolute));
        assert!("sideways".parse::<Interpretation>().is_err());
    }
}
