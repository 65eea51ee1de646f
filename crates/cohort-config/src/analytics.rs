//! Reporting-API configuration.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Upper bound the Reporting API accepts for `pageSize`.
pub const MAX_PAGE_SIZE: u32 = 100_000;

fn default_scopes() -> Vec<String> {
    vec![String::from(
        "https://www.googleapis.com/auth/analytics.readonly",
    )]
}

fn default_identifier_dimension() -> String {
    String::from("ga:clientId")
}

fn default_metric() -> String {
    String::from("ga:users")
}

const fn default_page_size() -> u32 {
    10_000
}

fn default_endpoint() -> String {
    String::from("https://analyticsreporting.googleapis.com/v4/reports:batchGet")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// Path to the service-account JSON key file.
    #[serde(default)]
    pub service_account_path: String,

    /// Analytics view identifier (numeric).
    #[serde(default, deserialize_with = "string_or_number")]
    pub view_id: String,

    /// OAuth scopes requested for the access token.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Dimension whose values become cohort member identifiers.
    #[serde(default = "default_identifier_dimension")]
    pub identifier_dimension: String,

    /// Metric requested alongside each identifier.
    #[serde(default = "default_metric")]
    pub metric: String,

    /// Rows per page when paginating reports.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Reporting API batch endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            service_account_path: String::new(),
            view_id: String::new(),
            scopes: default_scopes(),
            identifier_dimension: default_identifier_dimension(),
            metric: default_metric(),
            page_size: default_page_size(),
            endpoint: default_endpoint(),
        }
    }
}

impl AnalyticsConfig {
    /// Check if the analytics config has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.service_account_path.is_empty() && !self.view_id.is_empty()
    }

    /// Validate field values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when required fields are missing
    /// and [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: String::from("analytics"),
            });
        }
        if !self.view_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("analytics.view_id", "must be numeric"));
        }
        if self.scopes.is_empty() || self.scopes.iter().any(String::is_empty) {
            return Err(invalid("analytics.scopes", "at least one non-empty scope is required"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                "analytics.page_size",
                &format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if self.identifier_dimension.is_empty() || self.metric.is_empty() {
            return Err(invalid(
                "analytics.identifier_dimension",
                "dimension and metric must both be set",
            ));
        }
        Ok(())
    }
}

/// Env values that look numeric arrive as numbers; view ids are kept as text.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
