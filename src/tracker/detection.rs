//! Per-frame marker detections and identity lookup.

use std::collections::HashMap;

use nalgebra::{Point2, Vector2};
use tracing::warn;

/// Identity encoded in a fiducial marker.
pub type TagId = u32;

/// Raw measurement of one marker in one frame, in frame-pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDetection {
    pub id: TagId,
    /// Corners ordered bottom-left, bottom-right, top-right, top-left
    pub corners: [Point2<f64>; 4],
    pub center: Point2<f64>,
}

impl MarkerDetection {
    pub fn new(id: TagId, corners: [Point2<f64>; 4], center: Point2<f64>) -> Self {
        Self {
            id,
            corners,
            center,
        }
    }

    /// Square marker of `side` pixels centered on `center`, rotated so the
    /// top edge midpoint lies at angle `heading` from the center.
    pub fn square(id: TagId, center: Point2<f64>, side: f64, heading: f64) -> Self {
        let half = 0.5 * side;
        let up = Vector2::new(heading.cos(), heading.sin()) * half;
        let right = Vector2::new(heading.sin(), -heading.cos()) * half;
        let corners = [
            center - up - right,
            center - up + right,
            center + up + right,
            center + up - right,
        ];
        Self::new(id, corners, center)
    }

    /// Whether every corner and the center are finite.
    pub fn is_finite(&self) -> bool {
        self.corners
            .iter()
            .chain(std::iter::once(&self.center))
            .all(|p| p.x.is_finite() && p.y.is_finite())
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2<f64> {
        self.corners[0]
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<f64> {
        self.corners[1]
    }

    #[inline]
    pub fn top_right(&self) -> Point2<f64> {
        self.corners[2]
    }

    #[inline]
    pub fn top_left(&self) -> Point2<f64> {
        self.corners[3]
    }
}

/// Detections of one frame keyed by tag id.
#[derive(Debug, Clone, Default)]
pub struct DetectionSet {
    by_id: HashMap<TagId, MarkerDetection>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the lookup for one frame. A detector should report each id at
    /// most once; if it doesn't, the first detection wins.
    pub fn from_detections(detections: impl IntoIterator<Item = MarkerDetection>) -> Self {
        let mut set = Self::new();
        for det in detections {
            set.insert(det);
        }
        set
    }

    /// Insert a detection, returning `false` if it was dropped: either its
    /// id was already present or its geometry is not finite.
    pub fn insert(&mut self, det: MarkerDetection) -> bool {
        if !det.is_finite() {
            warn!(id = det.id, "non-finite detection in frame, treating the tag as missed");
            return false;
        }
        if self.by_id.contains_key(&det.id) {
            warn!(id = det.id, "duplicate detection in frame, keeping the first");
            return false;
        }
        self.by_id.insert(det.id, det);
        true
    }

    pub fn get(&self, id: TagId) -> Option<&MarkerDetection> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TagId> + '_ {
        self.by_id.keys().copied()
    }
}

impl FromIterator<MarkerDetection> for DetectionSet {
    fn from_iter<I: IntoIterator<Item = MarkerDetection>>(iter: I) -> Self {
        Self::from_detections(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(id: TagId, cx: f64) -> MarkerDetection {
        let c = Point2::new(cx, 0.0);
        MarkerDetection::new(id, [c; 4], c)
    }

    #[test]
    fn test_lookup_by_id() {
        let set = DetectionSet::from_detections(vec![det(4, 1.0), det(2, 2.0)]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(2));
        assert!(!set.contains(3));
        assert_eq!(set.get(4).map(|d| d.center.x), Some(1.0));
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut set = DetectionSet::new();
        assert!(set.insert(det(7, 1.0)));
        assert!(!set.insert(det(7, 9.0)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(7).map(|d| d.center.x), Some(1.0));
    }

    #[test]
    fn test_non_finite_detection_dropped() {
        let mut set = DetectionSet::new();
        let mut bad = det(3, 1.0);
        bad.corners[2].y = f64::NAN;
        assert!(!bad.is_finite());
        assert!(!set.insert(bad));
        assert!(!set.insert(det(4, f64::INFINITY)));
        assert!(set.is_empty());

        // A later valid detection of the same tag is still accepted.
        assert!(set.insert(det(3, 2.0)));
        assert_eq!(set.get(3).map(|d| d.center.x), Some(2.0));
    }

    #[test]
    fn test_square_geometry() {
        let det = MarkerDetection::square(1, Point2::new(10.0, 10.0), 2.0, 0.0);
        // Heading along +x: top edge at x = 11, bottom-left below and behind.
        assert_eq!(det.bottom_left(), Point2::new(9.0, 11.0));
        assert_eq!(det.top_right(), Point2::new(11.0, 9.0));
        assert_eq!(det.center, Point2::new(10.0, 10.0));
        assert!(det.is_finite());
    }
}
