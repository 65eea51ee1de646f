//! Cohort definitions and the Reporting API wire format.
//!
//! A cohort is defined upstream by a page-path filter over a date range. The
//! overlap analyzer never sees the definition, only the resulting member set.

use std::fmt;

use cohort_config::AnalyticsConfig;
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::ReportingError;

/// Dimension the path filters apply to.
pub const PAGE_PATH_DIMENSION: &str = "ga:pagePath";

/// How a cohort matches page paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFilter {
    Regex(String),
    Exact(String),
    BeginsWith(String),
}

impl PathFilter {
    /// Parse `exact:/path`, `prefix:/path`, or a bare regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Parse`] if the expression is empty.
    pub fn parse(text: &str) -> Result<Self, ReportingError> {
        let filter = if let Some(rest) = text.strip_prefix("exact:") {
            Self::Exact(rest.to_string())
        } else if let Some(rest) = text.strip_prefix("prefix:") {
            Self::BeginsWith(rest.to_string())
        } else {
            Self::Regex(text.to_string())
        };
        if filter.expression().is_empty() {
            return Err(ReportingError::Parse(format!(
                "empty page-path filter in '{text}'"
            )));
        }
        Ok(filter)
    }

    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Regex(_) => "REGEXP",
            Self::Exact(_) => "EXACT",
            Self::BeginsWith(_) => "BEGINS_WITH",
        }
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Regex(e) | Self::Exact(e) | Self::BeginsWith(e) => e,
        }
    }
}

impl fmt::Display for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex(e) => f.write_str(e),
            Self::Exact(e) => write!(f, "exact:{e}"),
            Self::BeginsWith(e) => write!(f, "prefix:{e}"),
        }
    }
}

/// A named cohort definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortQuery {
    pub name: String,
    pub filter: PathFilter,
    pub date_range: DateRange,
}

impl CohortQuery {
    /// Parse a `NAME=FILTER` definition.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Parse`] when the name or filter is missing.
    pub fn parse(definition: &str, date_range: DateRange) -> Result<Self, ReportingError> {
        let (name, filter) = definition.split_once('=').ok_or_else(|| {
            ReportingError::Parse(format!("cohort '{definition}' must be NAME=FILTER"))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ReportingError::Parse(format!("cohort '{definition}' has no name")));
        }
        Ok(Self {
            name: name.to_string(),
            filter: PathFilter::parse(filter.trim())?,
            date_range,
        })
    }

    /// Build the `reports:batchGet` body for one page of this query.
    #[must_use]
    pub fn request_body(&self, config: &AnalyticsConfig, page_token: Option<&str>) -> BatchGetRequest {
        BatchGetRequest {
            report_requests: vec![ReportRequest {
                view_id: config.view_id.clone(),
                date_ranges: vec![self.date_range],
                metrics: vec![Metric {
                    expression: config.metric.clone(),
                }],
                dimensions: vec![Dimension {
                    name: config.identifier_dimension.clone(),
                }],
                dimension_filter_clauses: vec![FilterClause {
                    filters: vec![DimensionFilter {
                        dimension_name: PAGE_PATH_DIMENSION.to_string(),
                        operator: self.filter.operator().to_string(),
                        expressions: vec![self.filter.expression().to_string()],
                    }],
                }],
                page_size: config.page_size,
                page_token: page_token.map(str::to_string),
            }],
        }
    }
}

// ── Request payload ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetRequest {
    pub report_requests: Vec<ReportRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub view_id: String,
    pub date_ranges: Vec<DateRange>,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
    pub dimension_filter_clauses: Vec<FilterClause>,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Metric {
    pub expression: String,
}

#[derive(Debug, Serialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FilterClause {
    pub filters: Vec<DimensionFilter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilter {
    pub dimension_name: String,
    pub operator: String,
    pub expressions: Vec<String>,
}

// ── Response payload ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct BatchGetResponse {
    #[serde(default)]
    reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    #[serde(default)]
    data: ReportData,
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportData {
    #[serde(default)]
    rows: Vec<Row>,
    samples_read_counts: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    dimensions: Vec<String>,
    #[serde(default)]
    metrics: Vec<MetricValues>,
}

#[derive(Debug, Deserialize)]
struct MetricValues {
    #[serde(default)]
    values: Vec<String>,
}

/// One `(identifier, metric)` row of a cohort's report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub identifier: String,
    pub metric: f64,
}

/// One page of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub rows: Vec<ReportRow>,
    pub next_page_token: Option<String>,
    pub sampled: bool,
}

impl Page {
    /// Decode a `reports:batchGet` response carrying a single report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Parse`] if the body is not a batch response,
    /// a row lacks its identifier, or a metric value is not numeric.
    pub fn from_json(body: &str) -> Result<Self, ReportingError> {
        let response: BatchGetResponse = serde_json::from_str(body)
            .map_err(|e| ReportingError::Parse(format!("batchGet response: {e}")))?;
        Self::from_response(response)
    }

    pub(crate) fn from_response(response: BatchGetResponse) -> Result<Self, ReportingError> {
        let Some(report) = response.reports.into_iter().next() else {
            return Ok(Self {
                rows: Vec::new(),
                next_page_token: None,
                sampled: false,
            });
        };

        let rows = report
            .data
            .rows
            .into_iter()
            .map(|row| {
                let identifier = row.dimensions.into_iter().next().ok_or_else(|| {
                    ReportingError::Parse(String::from("report row has no dimension value"))
                })?;
                let raw = row
                    .metrics
                    .first()
                    .and_then(|m| m.values.first())
                    .map_or("0", String::as_str);
                let metric = raw.parse::<f64>().map_err(|_| {
                    ReportingError::Parse(format!("metric value '{raw}' is not numeric"))
                })?;
                Ok(ReportRow { identifier, metric })
            })
            .collect::<Result<Vec<_>, ReportingError>>()?;

        Ok(Self {
            rows,
            next_page_token: report.next_page_token.filter(|t| !t.is_empty()),
            sampled: report
                .data
                .samples_read_counts
                .is_some_and(|counts| !counts.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalyticsConfig {
        AnalyticsConfig {
            service_account_path: "sa.json".into(),
            view_id: "1234".into(),
            page_size: 2,
            ..AnalyticsConfig::default()
        }
    }

    #[test]
    fn filter_prefixes_select_operator() {
        assert_eq!(PathFilter::parse("^/blog").unwrap().operator(), "REGEXP");
        assert_eq!(PathFilter::parse("exact:/pricing").unwrap(), PathFilter::Exact("/pricing".into()));
        assert_eq!(
            PathFilter::parse("prefix:/docs/").unwrap(),
            PathFilter::BeginsWith("/docs/".into())
        );
        assert!(PathFilter::parse("exact:").is_err());
    }

    #[test]
    fn cohort_spec_requires_name_and_filter() {
        let range = DateRange::parse("2020-01-01", "2020-01-31").unwrap();
        let query = CohortQuery::parse("blog = ^/blog/", range).unwrap();
        assert_eq!(query.name, "blog");
        assert_eq!(query.filter, PathFilter::Regex("^/blog/".into()));

        assert!(CohortQuery::parse("no-separator", range).is_err());
        assert!(CohortQuery::parse("=^/x", range).is_err());
        assert!(CohortQuery::parse("name=", range).is_err());
    }

    #[test]
    fn request_body_matches_wire_format() {
        let range = DateRange::parse("2020-01-01", "2020-01-31").unwrap();
        let query = CohortQuery::parse("pricing=exact:/pricing", range).unwrap();
        let body = serde_json::to_value(query.request_body(&config(), Some("2"))).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "reportRequests": [{
                    "viewId": "1234",
                    "dateRanges": [{"startDate": "2020-01-01", "endDate": "2020-01-31"}],
                    "metrics": [{"expression": "ga:users"}],
                    "dimensions": [{"name": "ga:clientId"}],
                    "dimensionFilterClauses": [{
                        "filters": [{
                            "dimensionName": "ga:pagePath",
                            "operator": "EXACT",
                            "expressions": ["/pricing"]
                        }]
                    }],
                    "pageSize": 2,
                    "pageToken": "2"
                }]
            })
        );
    }

    #[test]
    fn first_page_omits_page_token() {
        let range = DateRange::parse("2020-01-01", "2020-01-31").unwrap();
        let query = CohortQuery::parse("a=^/", range).unwrap();
        let body = serde_json::to_value(query.request_body(&config(), None)).unwrap();
        assert!(body["reportRequests"][0].get("pageToken").is_none());
    }

    #[test]
    fn empty_report_has_no_rows() {
        let page = Page::from_json(r#"{"reports":[{"columnHeader":{},"data":{"totals":[]}}]}"#).unwrap();
        assert!(page.rows.is_empty());
        assert!(page.next_page_token.is_none());
        assert!(!page.sampled);
    }

    #[test]
    fn non_numeric_metric_is_parse_error() {
        let body = r#"{"reports":[{"data":{"rows":[{"dimensions":["1.1"],"metrics":[{"values":["n/a"]}]}]}}]}"#;
        assert!(matches!(Page::from_json(body), Err(ReportingError::Parse(_))));
    }
}
