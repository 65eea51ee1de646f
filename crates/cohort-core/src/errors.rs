//! Cross-cutting error types for cohorts.
//!
//! Domain-specific errors (`ConfigError`, `ReportingError`, `ImpactError`) are
//! defined in their respective crates. They converge into `anyhow` in
//! `cohort-cli`.

use thiserror::Error;

/// Errors raised by the overlap analyzer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The analyzer or a report query received input it cannot accept.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
