//! Error taxonomy for the identification pipeline.
//!
//! Errors are surfaced to the caller; the core never retries. Partial
//! success during identification is expressed inside the returned id list
//! with `-1` sentinels, not through this type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An extraction operation was called before any frame was loaded.
    #[error("no frame loaded")]
    FrameMissing,

    /// Projection was requested but the spot list is empty.
    #[error("no extracted spots")]
    NoSpots,

    /// A calibration, k-vector, or raw image file was missing, truncated,
    /// or unparsable.
    #[error("failed to load {path}: {reason}")]
    CalibrationIo { path: PathBuf, reason: String },

    /// The required catalog back-end has not been loaded.
    #[error("catalog back-end not available")]
    CatalogUnavailable,

    /// The pyramid identifier needs at least four direction vectors.
    #[error("at least {needed} direction vectors required, got {got}")]
    InsufficientInputs { needed: usize, got: usize },

    /// A parameter was out of range or inconsistent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The distortion inversion produced a non-finite direction. Retry with
    /// a different spot filter.
    #[error("distortion inversion produced a non-finite direction")]
    NumericDomain,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::CalibrationIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
