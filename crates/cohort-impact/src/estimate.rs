//! Effect estimation from a counterfactual.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ImpactError;
use crate::frame::ImpactFrame;
use crate::math::{normal_cdf, probit};
use crate::model::ImpactModel;
use crate::split::PrePostSplit;

/// Default two-sided interval level: 95 %.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// A point estimate with its `1 - alpha` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    fn around(estimate: f64, sd: f64, z: f64) -> Self {
        Self {
            estimate,
            lower: estimate - z * sd,
            upper: estimate + z * sd,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        let (a, b) = (self.lower * factor, self.upper * factor);
        Self {
            estimate: self.estimate * factor,
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Observed versus predicted response on one post-period row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointEffect {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: Interval,
    /// `actual - predicted`.
    pub effect: Interval,
}

/// Estimated effect of the event over the post period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactEstimate {
    pub model: String,
    pub response: String,
    pub alpha: f64,
    pub pre_rows: usize,
    pub post_rows: usize,
    pub pointwise: Vec<PointEffect>,
    pub actual_total: f64,
    pub predicted_total: Interval,
    /// Summed effect over the post period.
    pub cumulative: Interval,
    /// Cumulative effect per post-period row.
    pub average: Interval,
    /// Cumulative effect relative to the predicted total. `None` when the
    /// prediction sums to zero.
    pub relative: Option<Interval>,
    /// One-sided tail probability of an effect at least this large under the
    /// counterfactual: `Phi(-|cumulative| / sd)`.
    pub tail_probability: f64,
    /// The cumulative interval excludes zero.
    pub significant: bool,
}

/// Estimate the event's effect on `frame`'s response.
///
/// `model` is fitted on the pre period of `split` and its predictions are
/// compared against the observed post-period response.
///
/// # Errors
///
/// Returns [`ImpactError::InvalidParameter`] unless `0 < alpha < 1`,
/// [`ImpactError::InvalidSplit`] if a period selects no rows, or whatever the
/// model returns. A model returning the wrong number of predictions is
/// reported as [`ImpactError::InvalidParameter`].
#[allow(clippy::cast_precision_loss)]
pub fn estimate_impact(
    frame: &ImpactFrame,
    split: &PrePostSplit,
    model: &dyn ImpactModel,
    alpha: f64,
) -> Result<ImpactEstimate, ImpactError> {
    if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(ImpactError::InvalidParameter(format!(
            "alpha must be in (0, 1), got {alpha}"
        )));
    }
    let rows = split.resolve(frame)?;
    let counterfactual = model.counterfactual(frame, &rows)?;
    if counterfactual.len() != rows.post.len() || counterfactual.variance.len() != rows.post.len() {
        return Err(ImpactError::InvalidParameter(format!(
            "model '{}' returned {} predictions for {} post-period rows",
            model.name(),
            counterfactual.len(),
            rows.post.len()
        )));
    }

    let z = probit(1.0 - alpha / 2.0);
    let response = frame.response();

    let pointwise: Vec<PointEffect> = rows
        .post
        .clone()
        .zip(counterfactual.mean.iter().zip(&counterfactual.variance))
        .map(|(row, (&mean, &variance))| {
            let actual = response.values[row];
            let sd = variance.max(0.0).sqrt();
            PointEffect {
                date: frame.dates()[row],
                actual,
                predicted: Interval::around(mean, sd, z),
                effect: Interval::around(actual - mean, sd, z),
            }
        })
        .collect();

    let actual_total: f64 = pointwise.iter().map(|p| p.actual).sum();
    let predicted_sum: f64 = counterfactual.mean.iter().sum();
    let cumulative_sd = counterfactual.cumulative_variance.max(0.0).sqrt();
    let cumulative = Interval::around(actual_total - predicted_sum, cumulative_sd, z);
    let average = cumulative.scaled(1.0 / rows.post.len() as f64);
    let relative = (predicted_sum.abs() > f64::EPSILON).then(|| cumulative.scaled(1.0 / predicted_sum));

    let tail_probability = if cumulative_sd > 0.0 {
        normal_cdf(-cumulative.estimate.abs() / cumulative_sd)
    } else if cumulative.estimate.abs() < f64::EPSILON {
        0.5
    } else {
        0.0
    };

    tracing::debug!(
        model = model.name(),
        cumulative = cumulative.estimate,
        tail_probability,
        "estimated impact"
    );

    Ok(ImpactEstimate {
        model: model.name().to_string(),
        response: response.name.clone(),
        alpha,
        pre_rows: rows.pre.len(),
        post_rows: rows.post.len(),
        pointwise,
        actual_total,
        predicted_total: Interval::around(predicted_sum, cumulative_sd, z),
        cumulative,
        average,
        relative,
        tail_probability,
        significant: tail_probability < alpha / 2.0,
    })
}
