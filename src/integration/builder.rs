//! Builder for creating MarkerDetection objects from various input formats.

use nalgebra::{Point2, Vector2};

use crate::tracker::{MarkerDetection, TagId};

/// Builder for creating `MarkerDetection` objects.
#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    id: TagId,
    corners: [Point2<f64>; 4],
    center: Option<Point2<f64>>,
}

impl Default for DetectionBuilder {
    fn default() -> Self {
        Self {
            id: 0,
            corners: [Point2::origin(); 4],
            center: None,
        }
    }
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag id.
    pub fn id(mut self, id: TagId) -> Self {
        self.id = id;
        self
    }

    /// Set corners in bottom-left, bottom-right, top-right, top-left order.
    pub fn corners(mut self, corners: [[f64; 2]; 4]) -> Self {
        self.corners = corners.map(|[x, y]| Point2::new(x, y));
        self
    }

    /// Set the center explicitly. Defaults to the mean of the corners.
    pub fn center(mut self, x: f64, y: f64) -> Self {
        self.center = Some(Point2::new(x, y));
        self
    }

    /// Square marker with the given center, side length in pixels and
    /// heading (angle from the center to the top edge midpoint).
    pub fn square(mut self, cx: f64, cy: f64, side: f64, heading: f64) -> Self {
        let det = MarkerDetection::square(self.id, Point2::new(cx, cy), side, heading);
        self.corners = det.corners;
        self.center = Some(det.center);
        self
    }

    /// Build the final `MarkerDetection`.
    pub fn build(self) -> MarkerDetection {
        let center = self.center.unwrap_or_else(|| {
            let sum = self
                .corners
                .iter()
                .fold(Vector2::zeros(), |acc, p| acc + p.coords);
            Point2::from(sum / 4.0)
        });
        MarkerDetection::new(self.id, self.corners, center)
    }
}
