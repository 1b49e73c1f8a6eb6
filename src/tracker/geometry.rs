//! Pose extraction and pixel scale estimation from marker corners.

use std::f64::consts::{PI, SQRT_2, TAU};

use nalgebra::{Point2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::tracker::detection::MarkerDetection;

/// Planar pose of a marker.
///
/// `theta` is unwrapped: it accumulates across full revolutions instead of
/// being folded back into `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    #[inline]
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.theta)
    }

    #[inline]
    pub fn from_vector(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3<f64>> for Pose {
    fn from(v: Vector3<f64>) -> Self {
        Self::from_vector(v)
    }
}

/// Wrap an angle into `[-π, π)`.
#[inline]
pub fn wrap_to_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Heading of the marker in `[0, 2π)`: direction from its center to the
/// midpoint of its top edge.
pub fn heading(det: &MarkerDetection) -> f64 {
    let top_mid = nalgebra::center(&det.top_right(), &det.top_left());
    let d = top_mid - det.center;
    d.y.atan2(d.x).rem_euclid(TAU)
}

/// Pose of a detection shifted by `offset`, with `theta` chosen within π of
/// `previous_theta`.
pub fn pose_from_detection(
    det: &MarkerDetection,
    offset: &Vector2<f64>,
    previous_theta: f64,
) -> Pose {
    let center = det.center + *offset;
    let delta = wrap_to_pi(heading(det) - previous_theta);
    Pose::new(center.x, center.y, previous_theta + delta)
}

/// Pixels per physical unit for a square marker with side `known_length`.
pub fn scale_factor(det: &MarkerDetection, known_length: Option<f64>) -> Result<f64> {
    let length = known_length.ok_or_else(|| {
        TrackError::InvalidConfiguration(format!(
            "tag {} has no known physical size for scale estimation",
            det.id
        ))
    })?;

    let diag_pixel = 0.5
        * (nalgebra::distance(&det.bottom_left(), &det.top_right())
            + nalgebra::distance(&det.bottom_right(), &det.top_left()));
    let diag_len = SQRT_2 * length;
    Ok(diag_pixel / diag_len)
}
