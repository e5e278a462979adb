//! Pixel indices and axis-aligned square patch regions.
//!
//! Indices are signed: a patch around a pixel near the border, or a match
//! center produced by an offset field, can lie partly or fully outside the
//! image. Containment checks decide what happens next.

use std::fmt;

/// Pixel index in image space (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Rectangle given by its top-left index and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Whole image at the origin.
    pub const fn image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Square of side `2 * radius + 1` centered on `center`. Not clamped.
    ///
    /// Coordinates saturate at the `i64` limits.
    pub fn around(center: Point, radius: u32) -> Self {
        let side = radius.saturating_mul(2).saturating_add(1);
        let r = i64::from(radius);
        Self::new(center.x.saturating_sub(r), center.y.saturating_sub(r), side, side)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the last column.
    pub fn right(&self) -> i64 {
        self.x.saturating_add(i64::from(self.width))
    }

    /// One past the last row.
    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(i64::from(self.height))
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// True when every pixel of `self` lies in `outer`. Empty regions are inside anything.
    pub fn is_inside(&self, outer: &Region) -> bool {
        if self.is_empty() {
            return true;
        }
        self.x >= outer.x
            && self.y >= outer.y
            && self.right() <= outer.right()
            && self.bottom() <= outer.bottom()
    }

    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Region::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// Index + size / 2. For a region built by `around` this is the original center.
    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(i64::from(self.width / 2)),
            self.y.saturating_add(i64::from(self.height / 2)),
        )
    }

    /// Boundary pixels, each visited once, clockwise from the top-left corner.
    pub fn outline(&self) -> impl Iterator<Item = Point> + '_ {
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (x0.saturating_add(w - 1), y0.saturating_add(h - 1));

        let top = (0..w).map(move |i| Point::new(x0.saturating_add(i), y0));
        // Remaining edges are empty for degenerate (single row/column) regions.
        let right = (1..h).map(move |j| Point::new(x1, y0.saturating_add(j)));
        let bottom = (1..w)
            .filter(move |_| h > 1)
            .map(move |i| Point::new(x1.saturating_sub(i), y1));
        let left = (1..h - 1)
            .filter(move |_| w > 1)
            .map(move |j| Point::new(x0, y1.saturating_sub(j)));

        let empty = self.is_empty();
        top.chain(right)
            .chain(bottom)
            .chain(left)
            .filter(move |_| !empty)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Index: [{}, {}] Size: [{}, {}]",
            self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn around_builds_odd_square() {
        let r = Region::around(Point::new(10, 20), 7);
        assert_eq!(r, Region::new(3, 13, 15, 15));
        assert_eq!(r.center(), Point::new(10, 20));
    }

    #[test]
    fn around_near_origin_goes_negative() {
        let r = Region::around(Point::new(2, 0), 3);
        assert_eq!((r.x, r.y), (-1, -3));
        assert!(!r.is_inside(&Region::image(100, 100)));
    }

    #[test]
    fn inside_checks_every_edge() {
        let img = Region::image(20, 10);
        assert!(Region::around(Point::new(7, 7), 2).is_inside(&img));
        // Touching the last row/column is still inside.
        assert!(Region::around(Point::new(17, 7), 2).is_inside(&img));
        assert!(!Region::around(Point::new(18, 7), 2).is_inside(&img));
        assert!(!Region::around(Point::new(7, 8), 2).is_inside(&img));
        assert!(Region::new(50, 50, 0, 3).is_inside(&img));
    }

    #[test]
    fn intersection_clips_to_image() {
        let img = Region::image(10, 10);
        let r = Region::around(Point::new(0, 9), 2);
        assert_eq!(r.intersection(&img), Some(Region::new(0, 7, 3, 3)));
        assert_eq!(Region::new(20, 20, 3, 3).intersection(&img), None);
    }

    #[test]
    fn outline_visits_boundary_once() {
        let r = Region::around(Point::new(5, 5), 2);
        let pts: Vec<Point> = r.outline().collect();
        let unique: HashSet<Point> = pts.iter().copied().collect();
        assert_eq!(pts.len(), 16);
        assert_eq!(unique.len(), 16);
        assert!(pts.iter().all(|p| p.x == 3 || p.x == 7 || p.y == 3 || p.y == 7));
        assert!(!unique.contains(&Point::new(5, 5)));
    }

    #[test]
    fn outline_of_degenerate_regions() {
        assert_eq!(Region::around(Point::new(1, 1), 0).outline().count(), 1);
        assert_eq!(Region::new(0, 0, 4, 1).outline().count(), 4);
        assert_eq!(Region::new(0, 0, 1, 4).outline().count(), 4);
        assert_eq!(Region::new(0, 0, 0, 4).outline().count(), 0);
    }

    #[test]
    fn regions_at_coordinate_limits_saturate() {
        let far = Point::new(i64::MAX - 2, i64::MIN + 1);
        let r = Region::around(far, 7);
        assert_eq!((r.x, r.y), (i64::MAX - 9, i64::MIN));
        assert_eq!(r.right(), i64::MAX);
        assert!(!r.is_inside(&Region::image(40, 40)));
        assert_eq!(r.intersection(&Region::image(40, 40)), None);
        assert_eq!(r.outline().count(), 56);
        assert_eq!(Point::new(i64::MAX, 0).offset(5, -5), Point::new(i64::MAX, -5));
        assert_eq!(Region::around(Point::new(0, 0), u32::MAX).width, u32::MAX);
    }
}
