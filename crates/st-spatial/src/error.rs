//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `st-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("a pathway needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("pathway '{0}': {1}")]
    InvalidPath(String, Box<SpatialError>),

    #[error("path parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
