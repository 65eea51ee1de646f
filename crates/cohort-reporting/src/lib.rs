//! # cohort-reporting
//!
//! Reporting API client for cohorts.
//!
//! Turns cohort definitions ([`CohortQuery`]: a page-path filter over a date
//! range) into member sets by querying the Analytics Reporting API v4:
//! - service-account authentication with cached access tokens
//! - `reports:batchGet` requests with `nextPageToken` pagination
//! - concurrent fetching of several cohorts
//!
//! The client is configured explicitly with an [`AnalyticsConfig`]; it never
//! reads credentials from the process environment. Upstream failures
//! (authentication, quota, malformed ranges) are returned unmodified.

pub mod auth;
pub mod date_range;
pub mod query;

mod error;
mod http;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use date_range::{DateRange, DateSpec};
pub use error::ReportingError;
pub use query::{CohortQuery, Page, PathFilter, ReportRow};

use std::collections::HashSet;

use cohort_config::AnalyticsConfig;
use cohort_core::Cohort;

use crate::http::check_response;
use crate::query::BatchGetResponse;

const USER_AGENT: &str = concat!("cohorts/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// HTTP client for the Reporting API.
pub struct ReportingClient {
    http: reqwest::Client,
    config: AnalyticsConfig,
    tokens: TokenProvider,
}

impl ReportingClient {
    /// Create a client, reading the service-account key named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Config`] if `config` is incomplete or invalid,
    /// or an I/O / parse error for the key file.
    pub fn new(config: AnalyticsConfig) -> Result<Self, ReportingError> {
        config.validate()?;
        let key = ServiceAccountKey::from_file(&config.service_account_path)?;
        Self::with_key(config, key)
    }

    /// Create a client from an already-loaded key.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Http`] if the HTTP client cannot be built.
    pub fn with_key(config: AnalyticsConfig, key: ServiceAccountKey) -> Result<Self, ReportingError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let tokens = TokenProvider::new(http.clone(), key, config.scopes.clone());
        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Fetch every row of `query`, following pagination to the end.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError`] if authentication fails, any page request
    /// fails, or a page cannot be parsed. A page token handed out twice is a
    /// [`ReportingError::Parse`].
    pub async fn fetch_rows(&self, query: &CohortQuery) -> Result<Vec<ReportRow>, ReportingError> {
        let mut rows = Vec::new();
        let mut page_token: Option<String> = None;
        let mut requested: HashSet<String> = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(query, page_token.as_deref()).await?;
            pages += 1;
            if page.sampled {
                tracing::warn!(cohort = %query.name, page = pages, "report data is sampled");
            }
            rows.extend(page.rows);

            match page.next_page_token {
                Some(next) if !requested.insert(next.clone()) => {
                    return Err(ReportingError::Parse(format!(
                        "pagination for cohort '{}' repeated token '{next}'",
                        query.name
                    )));
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(cohort = %query.name, pages, rows = rows.len(), "fetched cohort report");
        Ok(rows)
    }

    /// Fetch `query` and collapse its rows into a cohort of distinct identifiers.
    ///
    /// # Errors
    ///
    /// See [`fetch_rows`](Self::fetch_rows).
    pub async fn fetch_cohort(&self, query: &CohortQuery) -> Result<Cohort, ReportingError> {
        let rows = self.fetch_rows(query).await?;
        Ok(rows_to_cohort(&query.name, rows))
    }

    /// Fetch several cohorts concurrently, preserving query order.
    ///
    /// The first failure aborts the whole batch.
    ///
    /// # Errors
    ///
    /// See [`fetch_rows`](Self::fetch_rows).
    pub async fn fetch_cohorts(&self, queries: &[CohortQuery]) -> Result<Vec<Cohort>, ReportingError> {
        futures::future::try_join_all(queries.iter().map(|q| self.fetch_cohort(q))).await
    }

    async fn fetch_page(
        &self,
        query: &CohortQuery,
        page_token: Option<&str>,
    ) -> Result<Page, ReportingError> {
        let token = self.tokens.access_token().await?;
        let body = query.request_body(&self.config, page_token);

        let resp = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let response: BatchGetResponse = check_response(resp).await?.json().await?;
        Page::from_response(response)
    }
}

/// Distinct identifiers of `rows` as a cohort named `name`.
#[must_use]
pub fn rows_to_cohort(name: &str, rows: Vec<ReportRow>) -> Cohort {
    Cohort::new(name, rows.into_iter().map(|row| row.identifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_collapse_to_distinct_identifiers() {
        let rows = vec![
            ReportRow {
                identifier: "111.1".into(),
                metric: 1.0,
            },
            ReportRow {
                identifier: "222.2".into(),
                metric: 4.0,
            },
            ReportRow {
                identifier: "111.1".into(),
                metric: 2.0,
            },
        ];
        let cohort = rows_to_cohort("blog", rows);
        assert_eq!(cohort.name(), "blog");
        assert_eq!(cohort.len(), 2);
    }

    #[test]
    fn new_rejects_unconfigured_analytics() {
        let err = ReportingClient::new(AnalyticsConfig::default()).err().unwrap();
        assert!(matches!(err, ReportingError::Config(_)));
    }

    #[test]
    fn new_reports_missing_key_file() {
        let config = AnalyticsConfig {
            service_account_path: "/nonexistent/cohorts-sa.json".into(),
            view_id: "1".into(),
            ..AnalyticsConfig::default()
        };
        let err = ReportingClient::new(config).err().unwrap();
        assert!(matches!(err, ReportingError::Io(_)));
    }
}
