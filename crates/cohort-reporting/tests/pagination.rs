//! Decoding of paginated `reports:batchGet` responses.

use cohort_config::AnalyticsConfig;
use cohort_core::compute_overlap;
use cohort_reporting::{
    CohortQuery, DateRange, Page, ReportRow, ReportingClient, ServiceAccountKey, rows_to_cohort,
};
use pretty_assertions::assert_eq;

const FIRST_PAGE: &str = r#"{
  "reports": [{
    "columnHeader": {
      "dimensions": ["ga:clientId"],
      "metricHeader": {"metricHeaderEntries": [{"name": "ga:users", "type": "INTEGER"}]}
    },
    "data": {
      "rows": [
        {"dimensions": ["1001.1"], "metrics": [{"values": ["1"]}]},
        {"dimensions": ["1002.2"], "metrics": [{"values": ["3"]}]}
      ],
      "totals": [{"values": ["4"]}],
      "rowCount": 3
    },
    "nextPageToken": "2"
  }]
}"#;

const LAST_PAGE: &str = r#"{
  "reports": [{
    "columnHeader": {"dimensions": ["ga:clientId"]},
    "data": {
      "rows": [
        {"dimensions": ["1003.3"], "metrics": [{"values": ["2.5"]}]}
      ],
      "rowCount": 3,
      "samplesReadCounts": ["499630"],
      "samplingSpaceSizes": ["15328013"]
    }
  }]
}"#;

#[test]
fn first_page_carries_next_token() {
    let page = Page::from_json(FIRST_PAGE).unwrap();
    assert_eq!(page.next_page_token.as_deref(), Some("2"));
    assert!(!page.sampled);
    assert_eq!(
        page.rows,
        vec![
            ReportRow {
                identifier: "1001.1".into(),
                metric: 1.0
            },
            ReportRow {
                identifier: "1002.2".into(),
                metric: 3.0
            },
        ]
    );
}

#[test]
fn last_page_ends_pagination_and_flags_sampling() {
    let page = Page::from_json(LAST_PAGE).unwrap();
    assert!(page.next_page_token.is_none());
    assert!(page.sampled);
    assert_eq!(page.rows.len(), 1);
    assert!((page.rows[0].metric - 2.5).abs() < f64::EPSILON);
}

#[test]
fn pages_feed_the_overlap_analyzer() {
    let mut blog_rows = Page::from_json(FIRST_PAGE).unwrap().rows;
    blog_rows.extend(Page::from_json(LAST_PAGE).unwrap().rows);
    let pricing_rows = vec![ReportRow {
        identifier: "1002.2".into(),
        metric: 1.0,
    }];

    let cohorts = vec![
        rows_to_cohort("blog", blog_rows),
        rows_to_cohort("pricing", pricing_rows),
    ];
    let report = compute_overlap(&cohorts).unwrap();
    assert_eq!(report.union_size(), 3);
    assert_eq!(report.exclusive_size("blog").unwrap(), 2);
    assert_eq!(report.intersection_size(&["blog", "pricing"]).unwrap(), 1);
}

#[test]
fn malformed_body_is_parse_error() {
    assert!(Page::from_json("<html>quota exceeded</html>").is_err());
}

/// Requires `COHORTS_LIVE_KEY` (service-account JSON path) and
/// `COHORTS_LIVE_VIEW` (view id) pointing at a real property.
#[tokio::test]
#[ignore] // requires network and credentials
async fn live_fetch_two_cohorts() {
    let (Ok(key_path), Ok(view_id)) = (
        std::env::var("COHORTS_LIVE_KEY"),
        std::env::var("COHORTS_LIVE_VIEW"),
    ) else {
        eprintln!("SKIP: COHORTS_LIVE_KEY / COHORTS_LIVE_VIEW not set");
        return;
    };

    let config = AnalyticsConfig {
        service_account_path: key_path.clone(),
        view_id,
        ..AnalyticsConfig::default()
    };
    let key = ServiceAccountKey::from_file(&key_path).unwrap();
    let client = ReportingClient::with_key(config, key).unwrap();

    let range = DateRange::parse("7daysAgo", "yesterday").unwrap();
    let queries = vec![
        CohortQuery::parse("home=exact:/", range).unwrap(),
        CohortQuery::parse("any=.*", range).unwrap(),
    ];
    let cohorts = client.fetch_cohorts(&queries).await.unwrap();
    let report = compute_overlap(&cohorts).unwrap();
    println!("union={} cells={}", report.union_size(), report.cells().len());
}
