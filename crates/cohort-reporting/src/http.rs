//! Shared HTTP response handling for token and report requests.
//!
//! Google APIs wrap failures as `{"error": {"code", "message", "status"}}`.
//! The message is lifted out of that envelope so callers see the API's own
//! explanation instead of raw JSON.

use serde::Deserialize;

use crate::error::ReportingError;

/// Fallback wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Map non-success responses to [`ReportingError`].
///
/// - **429** → [`ReportingError::RateLimited`] (quota exhausted)
/// - **401 / 403** → [`ReportingError::Auth`]
/// - any other non-success → [`ReportingError::Api`]
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ReportingError> {
    let status = resp.status();
    if status == 429 {
        return Err(ReportingError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body);
    if status == 401 || status == 403 {
        return Err(ReportingError::Auth(format!("{} {message}", status.as_u16())));
    }
    Err(ReportingError::Api {
        status: status.as_u16(),
        message,
    })
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if envelope.error.status.is_empty() => envelope.error.message,
        Ok(envelope) => format!("{}: {}", envelope.error.status, envelope.error.message),
        Err(_) => body.to_string(),
    }
}
