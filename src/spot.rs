//! Spot: a thresholded bright blob summarized by its sub-pixel centroid
//! and area. Spots are the output of extraction and the input to the
//! projection step, which maps each one to a unit direction vector.

use crate::Vector2;

/// A locally bright blob in a thresholded frame.
///
/// `center` is sub-pixel and lies within the frame rectangle. `area` is the
/// pixel count of the blob, except under the bounding-box policy (rectangle
/// area) and the geometric contour policy (enclosing-circle area).
#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
    pub center: Vector2,
    pub area: u32,
}

impl Spot {
    pub fn new(center: Vector2, area: u32) -> Self {
        Self { center, area }
    }
}

/// Centroiding policy for spot extraction.
///
/// The contour policies trace external blob boundaries and pre-filter by
/// minimum enclosing-circle radius; the connected-component policies label
/// the thresholded frame and filter by pixel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentroidMethod {
    /// Minimum enclosing circle of the external contour: circle center,
    /// circle area.
    ContourGeometric,
    /// Intensity-weighted centroid over the filled contour; area is the
    /// nonzero pixel count inside it.
    ContourWeighted,
    /// Intensity-weighted centroid over the contour's bounding rectangle;
    /// cheaper, slightly biased when spots overlap. Area is the rectangle
    /// area.
    ContourBboxWeighted,
    /// Geometric (unweighted) centroid of each 8-connected component.
    ConnectedGeometric,
    /// Intensity-weighted centroid of each 8-connected component.
    ConnectedWeighted,
}
