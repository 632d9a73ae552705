//! Extraction session: owns the frame, the runtime knobs, and the products
//! of the extraction pass (spots, direction vectors).
//!
//! One [`StarCamera`] per camera; it holds no process-wide state, so an
//! embedding application can run several side by side. The frame and spot
//! list are replaced per image; the calibration is immutable once loaded.

use std::path::Path;

use crate::camera::Calibration;
use crate::error::{Error, Result};
use crate::extract::extract_spots;
use crate::frame::Frame;
use crate::spot::{CentroidMethod, Spot};
use crate::Vector3;

/// Default intensity threshold for spot detection.
const DEFAULT_THRESHOLD: u8 = 64;
/// Default minimum spot area in pixels.
const DEFAULT_MIN_AREA: u32 = 16;

#[derive(Debug)]
pub struct StarCamera {
    threshold: u8,
    min_area: u32,
    calibration: Option<Calibration>,
    frame: Option<Frame>,
    spots: Vec<Spot>,
    vectors: Vec<Vector3>,
}

impl StarCamera {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_area: DEFAULT_MIN_AREA,
            calibration: None,
            frame: None,
            spots: Vec::new(),
            vectors: Vec::new(),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn set_threshold(&mut self, t: u8) {
        self.threshold = t;
    }

    pub fn min_area(&self) -> u32 {
        self.min_area
    }

    pub fn set_min_area(&mut self, a: u32) {
        self.min_area = a;
    }

    /// Load the camera calibration record.
    pub fn load_calibration(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.calibration = Some(Calibration::from_file(path)?);
        Ok(())
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = Some(calibration);
    }

    /// Load a raw sensor frame, replacing any previous one.
    pub fn load_image(&mut self, path: impl AsRef<Path>, rows: usize, cols: usize) -> Result<()> {
        self.frame = Some(Frame::from_raw_file(path, rows, cols)?);
        Ok(())
    }

    /// Supply a frame from an external image source.
    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = Some(frame);
    }

    /// Threshold the current frame and extract spots under the given
    /// centroiding policy. Returns the number of spots found.
    pub fn extract(&mut self, method: CentroidMethod) -> Result<usize> {
        let frame = self.frame.as_ref().ok_or(Error::FrameMissing)?;
        let thresholded = frame.thresholded(self.threshold);
        self.spots = extract_spots(&thresholded, method, self.min_area);
        self.vectors.clear();
        Ok(self.spots.len())
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    /// Project every extracted spot to a unit direction vector, in spot
    /// order.
    pub fn project_spots(&mut self) -> Result<()> {
        if self.spots.is_empty() {
            return Err(Error::NoSpots);
        }
        let calibration = self
            .calibration
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("no calibration loaded".into()))?;
        self.vectors = calibration.project_spots(&self.spots)?;
        Ok(())
    }

    pub fn spot_vectors(&self) -> &[Vector3] {
        &self.vectors
    }
}

impl Default for StarCamera {
    fn default() -> Self {
        Self::new()
    }
}
