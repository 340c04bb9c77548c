//! Error types for tablestitch.

use thiserror::Error;

/// Primary error type for table reconstruction.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("ruling ({x1}, {y1})-({x2}, {y2}) is oblique; operation needs a horizontal or vertical ruling")]
    ObliqueRuling { x1: f64, y1: f64, x2: f64, y2: f64 },

    #[error("intersection needs one horizontal and one vertical ruling")]
    NotOrthogonal,

    #[error("unsupported rotation: {0} degrees")]
    UnsupportedRotation(i32),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type alias for TableError.
pub type Result<T> = std::result::Result<T, TableError>;
