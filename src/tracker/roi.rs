use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Crop window inside the full camera frame, in full-frame pixels.
///
/// Detections made inside the crop are shifted by [`offset`](Self::offset)
/// so poses are always reported in full-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionOfInterest {
    /// Left edge x coordinate
    pub x: u32,
    /// Top edge y coordinate
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RegionOfInterest {
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole frame, no cropping.
    #[inline]
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Translation from crop coordinates to full-frame coordinates.
    #[inline]
    pub fn offset(&self) -> Vector2<f64> {
        Vector2::new(self.x as f64, self.y as f64)
    }

    pub fn contains(&self, p: &Point2<f64>) -> bool {
        let x0 = self.x as f64;
        let y0 = self.y as f64;
        p.x >= x0 && p.y >= y0 && p.x < x0 + self.width as f64 && p.y < y0 + self.height as f64
    }

    /// A `width` x `height` window centered on `center`, slid back inside
    /// the `frame_width` x `frame_height` frame where it would overhang.
    pub fn recentered(
        center: &Point2<f64>,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let place = |c: f64, size: u32, bound: u32| -> (u32, u32) {
            let size = size.min(bound);
            let max_origin = (bound - size) as f64;
            let origin = (c - 0.5 * size as f64).round().clamp(0.0, max_origin);
            (origin as u32, size)
        };
        let (x, width) = place(center.x, width, frame_width);
        let (y, height) = place(center.y, height, frame_height);
        Self::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_frame_has_no_offset() {
        let roi = RegionOfInterest::full_frame(1280, 720);
        assert_eq!(roi.offset(), Vector2::zeros());
        assert!(roi.contains(&Point2::new(0.0, 0.0)));
        assert!(!roi.contains(&Point2::new(1280.0, 10.0)));
    }

    #[test]
    fn test_recentered_inside_frame() {
        let roi = RegionOfInterest::recentered(&Point2::new(640.0, 360.0), 300, 200, 1280, 720);
        assert_eq!(roi, RegionOfInterest::new(490, 260, 300, 200));
        assert_eq!(roi.offset(), Vector2::new(490.0, 260.0));
    }

    #[test]
    fn test_recentered_clamps_to_frame() {
        let roi = RegionOfInterest::recentered(&Point2::new(20.0, 700.0), 300, 200, 1280, 720);
        assert_eq!(roi, RegionOfInterest::new(0, 520, 300, 200));

        let roi = RegionOfInterest::recentered(&Point2::new(5000.0, -50.0), 300, 200, 1280, 720);
        assert_eq!(roi, RegionOfInterest::new(980, 0, 300, 200));
    }

    #[test]
    fn test_recentered_larger_than_frame() {
        let roi = RegionOfInterest::recentered(&Point2::new(100.0, 100.0), 2000, 100, 1280, 720);
        assert_eq!(roi, RegionOfInterest::new(0, 50, 1280, 100));
    }
}
