//! Pick overlay rasterisation.
//!
//! The overlay is an RGBA image the size of the source image. It is fully
//! transparent except for the outline and center of the query patch (red)
//! and of the matched patch (green). Green is drawn last and wins where the
//! two overlap. Anything outside the image is clipped.

use super::pick::PickResult;
use super::region::{Point, Region};

pub const QUERY_COLOR: [u8; 3] = [255, 0, 0];
pub const MATCH_COLOR: [u8; 3] = [0, 255, 0];

/// Tightly packed RGBA8 buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    fn index(&self, p: Point) -> Option<usize> {
        Region::image(self.width, self.height)
            .contains(p)
            .then(|| (p.y as usize * self.width as usize + p.x as usize) * 4)
    }

    pub fn get(&self, p: Point) -> Option<[u8; 4]> {
        self.index(p).map(|i| {
            [
                self.pixels[i],
                self.pixels[i + 1],
                self.pixels[i + 2],
                self.pixels[i + 3],
            ]
        })
    }

    /// Paint an opaque pixel. Out-of-bounds writes are dropped.
    pub fn set_opaque(&mut self, p: Point, rgb: [u8; 3]) {
        if let Some(i) = self.index(p) {
            self.pixels[i..i + 3].copy_from_slice(&rgb);
            self.pixels[i + 3] = 255;
        }
    }

    pub fn opaque_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }
}

fn outline_region(buf: &mut RgbaBuffer, region: &Region, rgb: [u8; 3]) {
    for p in region.outline() {
        buf.set_opaque(p, rgb);
    }
    buf.set_opaque(region.center(), rgb);
}

/// Render the overlay for `pick` on a `width` x `height` image.
pub fn render(width: u32, height: u32, pick: &PickResult) -> RgbaBuffer {
    let mut buf = RgbaBuffer::transparent(width, height);
    outline_region(&mut buf, &pick.query, QUERY_COLOR);
    outline_region(&mut buf, &pick.matched, MATCH_COLOR);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick_at(pick: Point, center: Point, radius: u32) -> PickResult {
        let matched = Region::around(center, radius);
        PickResult {
            pick,
            query: Region::around(pick, radius),
            match_center: center,
            matched,
            matched_clipped: !matched.is_inside(&Region::image(20, 20)),
        }
    }

    #[test]
    fn outlines_and_centers_are_opaque() {
        let buf = render(20, 20, &pick_at(Point::new(4, 4), Point::new(14, 14), 2));
        // 16 outline pixels + center, twice.
        assert_eq!(buf.opaque_count(), 34);
        assert_eq!(buf.get(Point::new(2, 2)), Some([255, 0, 0, 255]));
        assert_eq!(buf.get(Point::new(4, 4)), Some([255, 0, 0, 255]));
        assert_eq!(buf.get(Point::new(16, 12)), Some([0, 255, 0, 255]));
        // Interior stays transparent.
        assert_eq!(buf.get(Point::new(3, 4)), Some([0, 0, 0, 0]));
    }

    #[test]
    fn match_wins_on_overlap() {
        let buf = render(20, 20, &pick_at(Point::new(8, 8), Point::new(10, 8), 2));
        // (10, 6) is on both top edges.
        assert_eq!(buf.get(Point::new(10, 6)), Some([0, 255, 0, 255]));
        assert_eq!(buf.get(Point::new(6, 6)), Some([255, 0, 0, 255]));
    }

    #[test]
    fn clipped_match_draws_visible_part_only() {
        let buf = render(20, 20, &pick_at(Point::new(5, 5), Point::new(20, 5), 2));
        // Only the left column of the matched square (x = 18, 19) is visible.
        let green = buf
            .pixels
            .chunks_exact(4)
            .filter(|px| px == &[0, 255, 0, 255])
            .count();
        assert_eq!(green, 5 + 2);
        assert_eq!(buf.get(Point::new(20, 5)), None);
    }

    #[test]
    fn fully_outside_match_leaves_only_query() {
        let buf = render(20, 20, &pick_at(Point::new(5, 5), Point::new(-50, -50), 2));
        assert_eq!(buf.opaque_count(), 17);
    }
}
