//! Impact estimation error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImpactError {
    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading the input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The time-series table violates a structural requirement.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The pre/post periods are malformed or do not fit the frame.
    #[error("invalid pre/post split: {0}")]
    InvalidSplit(String),

    /// A model or estimation parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The pre period has too few rows to fit the model.
    #[error("insufficient data: need at least {needed} pre-period rows, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The regression system could not be factorized.
    #[error("design matrix is singular")]
    Singular,
}
