//! Star tracker identification core.
//!
//! Given a raw grayscale frame from a calibrated camera, this crate extracts
//! bright spots with sub-pixel centroids, projects them through the lens
//! distortion model to unit direction vectors, and matches the geometry of
//! those directions against a catalog of inter-star angular separations to
//! assign each spot a catalog identifier (or a false-star marker).
//!
//! The pipeline is a straight line: frame → thresholded frame → spots →
//! direction vectors → catalog ids. [`StarCamera`] owns the first half
//! (extraction and projection), [`StarIdentifier`] the second (catalog
//! matching). Both are plain session values; construct as many as you need.

pub mod camera;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod frame;
pub mod identify;
pub mod spot;
pub mod starcamera;

pub use camera::Calibration;
pub use catalog::{Feature, FeatureCatalog, FeatureTable, KVector};
pub use error::{Error, Result};
pub use frame::Frame;
pub use identify::{IdentificationMethod, StarIdentifier};
pub use spot::{CentroidMethod, Spot};
pub use starcamera::StarCamera;

// Commonly used types
// Note: 32-bit floats are sufficient throughout; the numerical contract for
// the distortion inversion is stated in single precision.
pub type Vector2 = nalgebra::Vector2<f32>;
pub type Vector3 = nalgebra::Vector3<f32>;
