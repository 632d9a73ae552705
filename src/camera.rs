//! Camera intrinsics: calibration record, distortion inversion, and the
//! mapping from spot centroids to unit direction vectors.
//!
//! # Coordinate conventions
//!
//! - **Pixel coordinates**: origin top-left, +x right, +y down (same as
//!   spot centroids).
//! - **Camera frame**: +z points outward through the lens; a spot at the
//!   principal point maps to `(0, 0, 1)`.
//!
//! # Pipeline
//!
//! ```text
//! pixel → subtract principal point → divide by focal length → remove skew
//!       → invert distortion → append z = 1 → normalize
//! ```

use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::spot::Spot;
use crate::{Vector2, Vector3};

/// Number of fixed-point iterations for the distortion inversion.
///
/// Part of the numerical contract: the loop count and term ordering are
/// fixed so that the same inputs always produce bit-identical directions.
const UNDISTORT_ITERATIONS: usize = 20;

/// Camera calibration record. Immutable after load.
///
/// `dist` holds the Brown–Conrady coefficients in the order
/// `[k1, k2, p1, p2, k3]` (two radial, two tangential, third radial).
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub principal_point: Vector2,
    pub focal_length: Vector2,
    pub skew: f32,
    pub dist: [f32; 5],
}

impl Calibration {
    /// Pinhole calibration with no skew and no distortion.
    pub fn pinhole(principal_point: Vector2, focal_length: Vector2) -> Self {
        Self {
            principal_point,
            focal_length,
            skew: 0.0,
            dist: [0.0; 5],
        }
    }

    /// Load a calibration file: whitespace-separated ASCII floats in the
    /// exact order `cx cy s k1 k2 p1 p2 k3 fx fy`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let mut values = [0.0f32; 10];
        let mut tokens = text.split_whitespace();
        for (i, slot) in values.iter_mut().enumerate() {
            let token = tokens
                .next()
                .ok_or_else(|| Error::io(path, format!("expected 10 fields, got {i}")))?;
            *slot = token
                .parse()
                .map_err(|_| Error::io(path, format!("bad float in field {i}: {token:?}")))?;
        }

        let calibration = Self {
            principal_point: Vector2::new(values[0], values[1]),
            skew: values[2],
            dist: [values[3], values[4], values[5], values[6], values[7]],
            focal_length: Vector2::new(values[8], values[9]),
        };
        info!("loaded calibration from {}", path.display());
        Ok(calibration)
    }

    fn has_distortion(&self) -> bool {
        self.dist.iter().any(|&c| c != 0.0)
    }

    /// Invert the Brown–Conrady radial/tangential model by fixed-point
    /// iteration starting from the distorted coordinates.
    fn undistort(&self, distorted: Vector2) -> Vector2 {
        let [k1, k2, p1, p2, k3] = self.dist;

        let mut x = distorted;
        for _ in 0..UNDISTORT_ITERATIONS {
            let r2 = x.norm_squared();
            let r4 = r2 * r2;
            let k_radial = 1.0 + k1 * r2 + k2 * r4 + k3 * r2 * r4;
            let delta = Vector2::new(
                2.0 * p1 * x.x * x.y + p2 * (r2 + 2.0 * x.x * x.x),
                p1 * (r2 + 2.0 * x.y * x.y) + 2.0 * p2 * x.x * x.y,
            );
            x = (distorted - delta) / k_radial;
        }
        x
    }

    /// Map a spot centroid to a unit direction vector in the camera frame.
    pub fn project(&self, spot: &Spot) -> Result<Vector3> {
        // Normalize to distorted image coordinates
        let mut xd = Vector2::new(
            (spot.center.x - self.principal_point.x) / self.focal_length.x,
            (spot.center.y - self.principal_point.y) / self.focal_length.y,
        );

        // Remove pixel skew
        xd.x -= self.skew * xd.y;

        let xu = if self.has_distortion() {
            self.undistort(xd)
        } else {
            xd
        };

        if !xu.x.is_finite() || !xu.y.is_finite() {
            return Err(Error::NumericDomain);
        }

        Ok(Vector3::new(xu.x, xu.y, 1.0).normalize())
    }

    /// Project every spot, preserving order (`spot[i]` ↔ `vec[i]`).
    pub fn project_spots(&self, spots: &[Spot]) -> Result<Vec<Vector3>> {
        if spots.is_empty() {
            return Err(Error::NoSpots);
        }
        spots.iter().map(|s| self.project(s)).collect()
    }
}
