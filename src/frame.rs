//! 8-bit image frames: raw sensor loading and thresholding.
//!
//! A [`Frame`] is a dense row-major H×W map of pixel coordinate to 8-bit
//! intensity, origin top-left, x increasing right, y increasing down. Frames
//! are created per capture and replaced wholesale; nothing in the pipeline
//! mutates one in place.

use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};

/// Dense row-major 8-bit image frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Build a frame from row-major pixel data.
    ///
    /// This is the in-memory seam for embedders with their own image source
    /// (camera SDK, simulator). `data.len()` must equal `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidArgument(format!(
                "pixel data length {} does not match {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Load a raw sensor dump: `rows * cols` 16-bit little-endian samples,
    /// row-major. Each 12-bit sample is right-shifted by 4 to produce the
    /// 8-bit frame.
    pub fn from_raw_file(path: impl AsRef<Path>, rows: usize, cols: usize) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;

        let needed = rows * cols * 2;
        if bytes.len() < needed {
            return Err(Error::io(
                path,
                format!("truncated raw image: {} bytes, expected {}", bytes.len(), needed),
            ));
        }

        let data: Vec<u8> = bytes[..needed]
            .chunks_exact(2)
            .map(|b| (u16::from_le_bytes([b[0], b[1]]) >> 4) as u8)
            .collect();

        info!("loaded {}x{} raw frame from {}", rows, cols, path.display());
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    /// Thresholded copy: pixels at or above `t` keep their intensity,
    /// everything below becomes 0. The surviving intensities matter — they
    /// are the weights for the weighted centroiding policies.
    pub fn thresholded(&self, t: u8) -> Frame {
        Frame {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| if v >= t { v } else { 0 }).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_length_mismatch() {
        let result = Frame::from_vec(4, 4, vec![0u8; 15]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_threshold_zeroes_below_and_preserves_above() {
        let frame = Frame::from_vec(2, 3, vec![0, 63, 64, 65, 200, 255]).unwrap();
        let thresholded = frame.thresholded(64);
        assert_eq!(thresholded.data(), &[0, 0, 64, 65, 200, 255]);
        // Pure function: the source frame is untouched
        assert_eq!(frame.get(0, 1), 63);
    }

    #[test]
    fn test_raw_file_roundtrip_and_shift() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.raw");

        // Samples 0x0000, 0x0010, 0x0FFF, 0x0800 → 0, 1, 255, 128
        let samples: [u16; 4] = [0x0000, 0x0010, 0x0FFF, 0x0800];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        std::fs::write(&path, &bytes).unwrap();

        let frame = Frame::from_raw_file(&path, 2, 2).unwrap();
        assert_eq!(frame.data(), &[0, 1, 255, 128]);
    }

    #[test]
    fn test_raw_file_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.raw");
        std::fs::write(&path, [0u8; 7]).unwrap();

        let result = Frame::from_raw_file(&path, 2, 2);
        assert!(matches!(result, Err(Error::CalibrationIo { .. })));
    }

    #[test]
    fn test_raw_file_missing() {
        let result = Frame::from_raw_file("/nonexistent/frame.raw", 2, 2);
        assert!(matches!(result, Err(Error::CalibrationIo { .. })));
    }
}
