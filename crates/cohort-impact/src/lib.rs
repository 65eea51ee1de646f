//! # cohort-impact
//!
//! Estimates the effect of an event (a launch, a campaign, an outage) on a
//! daily response series.
//!
//! A model is fitted on the pre-event period to predict what the response
//! would have been without the event; the post-event gap between observed and
//! predicted values is the effect. Models plug in through [`ImpactModel`];
//! [`RegressionModel`] regresses the response on unaffected predictor series.
//!
//! ```no_run
//! use cohort_impact::{estimate_impact, ImpactFrame, PrePostSplit, RegressionModel, DEFAULT_ALPHA};
//!
//! let frame = ImpactFrame::from_path("signups.csv", Some("signups"))?;
//! let split = PrePostSplit::parse("2020-01-01:2020-02-29", "2020-03-01:2020-03-31")?;
//! let estimate = estimate_impact(&frame, &split, &RegressionModel::default(), DEFAULT_ALPHA)?;
//! println!("cumulative effect {:.1}", estimate.cumulative.estimate);
//! # Ok::<(), cohort_impact::ImpactError>(())
//! ```

pub mod estimate;
pub mod frame;
pub mod math;
pub mod model;
pub mod regression;
pub mod split;

mod error;

pub use error::ImpactError;
pub use estimate::{DEFAULT_ALPHA, ImpactEstimate, Interval, PointEffect, estimate_impact};
pub use frame::{ImpactFrame, Series};
pub use model::{Counterfactual, ImpactModel};
pub use regression::{DEFAULT_RIDGE, RegressionModel};
pub use split::{PrePostSplit, ResolvedSplit};
