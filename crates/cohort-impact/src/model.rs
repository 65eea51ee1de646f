//! The seam between effect estimation and counterfactual models.

use crate::error::ImpactError;
use crate::frame::ImpactFrame;
use crate::split::ResolvedSplit;

/// Predictive distribution of the response over the post period, had the
/// event not happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Counterfactual {
    /// Predictive mean per post-period row.
    pub mean: Vec<f64>,
    /// Predictive variance per post-period row.
    pub variance: Vec<f64>,
    /// Variance of the summed post-period prediction. Exceeds the sum of
    /// `variance` when row predictions share parameter uncertainty.
    pub cumulative_variance: f64,
}

impl Counterfactual {
    /// A counterfactual whose rows are predicted independently.
    #[must_use]
    pub fn independent(mean: Vec<f64>, variance: Vec<f64>) -> Self {
        let cumulative_variance = variance.iter().sum();
        Self {
            mean,
            variance,
            cumulative_variance,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// A model fitted on the pre period that predicts the post-period response.
pub trait ImpactModel {
    /// Short model name, reported with the estimate.
    fn name(&self) -> &str;

    /// Fit on `split.pre` and predict every row of `split.post`.
    ///
    /// Implementations must return exactly `split.post.len()` predictions.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError`] if the model cannot be fitted.
    fn counterfactual(
        &self,
        frame: &ImpactFrame,
        split: &ResolvedSplit,
    ) -> Result<Counterfactual, ImpactError>;
}
