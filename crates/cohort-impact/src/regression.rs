//! Bayesian linear regression counterfactual.
//!
//! The response is regressed on the predictors over the pre period:
//!
//! ```text
//! y = b0 + Z * beta + eps,   eps ~ N(0, s2)
//! ```
//!
//! where `Z` holds the predictors standardized with pre-period means and
//! standard deviations. The intercept has a flat prior and `beta` the conjugate
//! Gaussian prior `N(0, s2 / ridge * I)`, giving
//!
//! ```text
//! beta | y ~ N(A^-1 Z^T (y - mean(y)),  s2 * A^-1),   A = Z^T Z + ridge * I
//! ```
//!
//! with `s2` estimated from the pre-period residuals. The predictive variance of
//! a post-period row `z` is `s2 * (1 + 1/n + z^T A^-1 z)`.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

use crate::error::ImpactError;
use crate::frame::ImpactFrame;
use crate::model::{Counterfactual, ImpactModel};
use crate::split::ResolvedSplit;

/// Default prior precision on standardized coefficients. Weak enough that the
/// fit is close to least squares, strong enough to keep `A` invertible when a
/// predictor is constant over the pre period.
pub const DEFAULT_RIDGE: f64 = 1e-3;

/// Linear regression on the frame's predictors.
///
/// With no predictors this reduces to the pre-period mean with its
/// predictive spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionModel {
    ridge: f64,
}

impl Default for RegressionModel {
    fn default() -> Self {
        Self {
            ridge: DEFAULT_RIDGE,
        }
    }
}

impl RegressionModel {
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidParameter`] unless `ridge` is finite and
    /// non-negative.
    pub fn new(ridge: f64) -> Result<Self, ImpactError> {
        if !ridge.is_finite() || ridge < 0.0 {
            return Err(ImpactError::InvalidParameter(format!(
                "ridge must be finite and >= 0, got {ridge}"
            )));
        }
        Ok(Self { ridge })
    }

    #[must_use]
    pub const fn ridge(&self) -> f64 {
        self.ridge
    }

    #[allow(clippy::cast_precision_loss)]
    fn fit(&self, frame: &ImpactFrame, split: &ResolvedSplit) -> Result<Fit, ImpactError> {
        let rows = split.pre.clone();
        let n = rows.len();
        let p = frame.predictors().len();
        let needed = p + 2;
        if n < needed {
            return Err(ImpactError::InsufficientData { needed, got: n });
        }

        let y = DVector::from_column_slice(&frame.response().values[rows.clone()]);
        let y_mean = y.mean();
        let centered = y.add_scalar(-y_mean);

        let mut location = Vec::with_capacity(p);
        let mut scale = Vec::with_capacity(p);
        for series in frame.predictors() {
            let window = &series.values[rows.clone()];
            let mean = window.iter().sum::<f64>() / n as f64;
            let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            let sd = var.sqrt();
            location.push(mean);
            scale.push(if sd > f64::EPSILON { sd } else { 1.0 });
        }

        let (coefficients, factor, residuals) = if p == 0 {
            (DVector::zeros(0), None, centered)
        } else {
            let design = DMatrix::from_fn(n, p, |i, j| {
                (frame.predictors()[j].values[rows.start + i] - location[j]) / scale[j]
            });
            let gram = design.transpose() * &design + DMatrix::identity(p, p) * self.ridge;
            let factor = Cholesky::new(gram).ok_or(ImpactError::Singular)?;
            let coefficients = factor.solve(&(design.transpose() * &centered));
            let residuals = &centered - &design * &coefficients;
            (coefficients, Some(factor), residuals)
        };
        let dof = (n - p - 1) as f64;
        let noise_variance = residuals.norm_squared() / dof;

        tracing::debug!(
            rows = n,
            predictors = p,
            noise_variance,
            "fitted regression on pre period"
        );

        Ok(Fit {
            n,
            y_mean,
            location,
            scale,
            coefficients,
            factor,
            noise_variance,
        })
    }
}

struct Fit {
    n: usize,
    y_mean: f64,
    location: Vec<f64>,
    scale: Vec<f64>,
    coefficients: DVector<f64>,
    factor: Option<Cholesky<f64, Dyn>>,
    noise_variance: f64,
}

impl Fit {
    fn standardize(&self, raw: impl Iterator<Item = f64>) -> DVector<f64> {
        let values: Vec<f64> = raw
            .zip(self.location.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect();
        DVector::from_vec(values)
    }

    /// `z^T A^-1 w`
    fn leverage(&self, z: &DVector<f64>, w: &DVector<f64>) -> f64 {
        self.factor
            .as_ref()
            .map_or(0.0, |factor| z.dot(&factor.solve(w)))
    }
}

impl ImpactModel for RegressionModel {
    fn name(&self) -> &str {
        "regression"
    }

    #[allow(clippy::cast_precision_loss)]
    fn counterfactual(
        &self,
        frame: &ImpactFrame,
        split: &ResolvedSplit,
    ) -> Result<Counterfactual, ImpactError> {
        let fit = self.fit(frame, split)?;
        let p = frame.predictors().len();
        let n = fit.n as f64;
        let m = split.post.len() as f64;

        let mut mean = Vec::with_capacity(split.post.len());
        let mut variance = Vec::with_capacity(split.post.len());
        let mut z_sum = DVector::zeros(p);
        for row in split.post.clone() {
            let z = fit.standardize(frame.predictor_row(row));
            mean.push(fit.y_mean + z.dot(&fit.coefficients));
            variance.push(fit.noise_variance * (1.0 + 1.0 / n + fit.leverage(&z, &z)));
            z_sum += z;
        }

        // Summed prediction: independent noise per row plus shared intercept
        // and coefficient uncertainty.
        let cumulative_variance =
            fit.noise_variance * (m + m * m / n + fit.leverage(&z_sum, &z_sum));

        Ok(Counterfactual {
            mean,
            variance,
            cumulative_variance,
        })
    }
}
