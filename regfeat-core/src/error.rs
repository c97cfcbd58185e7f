//! Error types for regfeat

use thiserror::Error;

/// Main error type for regfeat operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid search parameter: {0}")]
    InvalidSearchParam(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index {index} out of range for {len} points")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type alias for regfeat operations
pub type Result<T> = std::result::Result<T, Error>;
