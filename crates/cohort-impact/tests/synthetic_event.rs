//! End-to-end estimation on synthetic series with a known lift.

use std::fmt::Write as _;

use chrono::NaiveDate;
use cohort_impact::{
    DEFAULT_ALPHA, ImpactFrame, ImpactModel, PrePostSplit, RegressionModel, estimate_impact,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const PRE_ROWS: usize = 60;
const POST_ROWS: usize = 20;

/// `date,signups,sessions` where signups track sessions plus alternating
/// noise, and `lift` is added to every post-period signup.
fn synthetic_csv(lift: f64) -> String {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut csv = String::from("date,signups,sessions\n");
    for (t, date) in start.iter_days().take(PRE_ROWS + POST_ROWS).enumerate() {
        let sessions = 100.0 + 10.0 * (t as f64 / 3.0).sin();
        let noise = if t % 2 == 0 { 0.3 } else { -0.3 };
        let effect = if t >= PRE_ROWS { lift } else { 0.0 };
        let signups = 20.0 + 1.5 * sessions + noise + effect;
        writeln!(csv, "{date},{signups},{sessions}").unwrap();
    }
    csv
}

fn split() -> PrePostSplit {
    PrePostSplit::parse("2020-01-01:2020-02-29", "2020-03-01:2020-03-20").unwrap()
}

#[rstest]
#[case::no_event(0.0, false)]
#[case::uplift(5.0, true)]
#[case::drop(-5.0, true)]
fn regression_detects_known_lift(#[case] lift: f64, #[case] detected: bool) {
    let frame = ImpactFrame::from_csv(synthetic_csv(lift).as_bytes(), Some("signups")).unwrap();
    let estimate = estimate_impact(&frame, &split(), &RegressionModel::default(), DEFAULT_ALPHA)
        .unwrap();

    assert_eq!(estimate.pre_rows, PRE_ROWS);
    assert_eq!(estimate.post_rows, POST_ROWS);
    assert_eq!(estimate.response, "signups");
    assert_eq!(estimate.model, "regression");

    let true_cumulative = lift * POST_ROWS as f64;
    assert!(
        estimate.cumulative.contains(true_cumulative),
        "{:?} should contain {true_cumulative}",
        estimate.cumulative
    );
    assert!((estimate.average.estimate - lift).abs() < 0.1);
    assert_eq!(estimate.significant, detected);
    assert_eq!(estimate.cumulative.contains(0.0), !detected);
}

#[test]
fn pointwise_rows_cover_post_period() {
    let frame = ImpactFrame::from_csv(synthetic_csv(5.0).as_bytes(), None).unwrap();
    let estimate = estimate_impact(&frame, &split(), &RegressionModel::default(), DEFAULT_ALPHA)
        .unwrap();

    let first = estimate.pointwise.first().unwrap();
    let last = estimate.pointwise.last().unwrap();
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
    assert_eq!(last.date, NaiveDate::from_ymd_opt(2020, 3, 20).unwrap());
    assert!(
        estimate
            .pointwise
            .iter()
            .all(|p| p.predicted.lower < p.predicted.estimate && p.effect.estimate > 4.0)
    );
    let relative = estimate.relative.unwrap();
    assert!(relative.estimate > 0.0 && relative.estimate < 0.05);
}

#[test]
fn gap_between_periods_is_ignored() {
    let frame = ImpactFrame::from_csv(synthetic_csv(5.0).as_bytes(), None).unwrap();
    let split = PrePostSplit::parse("2020-01-01:2020-02-20", "2020-03-01:2020-03-20").unwrap();
    let estimate =
        estimate_impact(&frame, &split, &RegressionModel::default(), DEFAULT_ALPHA).unwrap();
    assert_eq!(estimate.pre_rows, 51);
    assert_eq!(estimate.post_rows, POST_ROWS);
}

#[test]
fn model_is_usable_as_trait_object() {
    let models: Vec<Box<dyn ImpactModel>> = vec![
        Box::new(RegressionModel::default()),
        Box::new(RegressionModel::new(1.0).unwrap()),
    ];
    let frame = ImpactFrame::from_csv(synthetic_csv(0.0).as_bytes(), None).unwrap();
    for model in &models {
        let estimate = estimate_impact(&frame, &split(), model.as_ref(), 0.1).unwrap();
        assert!(!estimate.significant);
    }
}

#[test]
fn estimate_serializes_for_reporting() {
    let frame = ImpactFrame::from_csv(synthetic_csv(5.0).as_bytes(), None).unwrap();
    let estimate = estimate_impact(&frame, &split(), &RegressionModel::default(), DEFAULT_ALPHA)
        .unwrap();
    let json = serde_json::to_value(&estimate).unwrap();
    assert_eq!(json["pointwise"][0]["date"], "2020-03-01");
    assert!(json["cumulative"]["lower"].is_number());
}
