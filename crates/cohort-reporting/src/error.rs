//! Reporting client error types.

use thiserror::Error;

/// Errors that can occur when fetching cohort data from the Reporting API.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response (quota exhausted).
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Service-account key or token exchange failure.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Failed to parse an API response or key file.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reading the service-account key file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A date range could not be parsed or is reversed.
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    /// The analytics configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] cohort_config::ConfigError),
}
