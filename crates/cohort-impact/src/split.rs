//! Pre- and post-event periods.

use std::ops::Range;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ImpactError;
use crate::frame::ImpactFrame;

/// Inclusive pre-event (training) and post-event (evaluation) periods.
///
/// Rows falling between the two periods are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrePostSplit {
    pub pre: (NaiveDate, NaiveDate),
    pub post: (NaiveDate, NaiveDate),
}

/// A split mapped onto frame rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSplit {
    pub pre: Range<usize>,
    pub post: Range<usize>,
}

impl PrePostSplit {
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidSplit`] if either period is reversed or the
    /// pre period does not end before the post period starts.
    pub fn new(pre: (NaiveDate, NaiveDate), post: (NaiveDate, NaiveDate)) -> Result<Self, ImpactError> {
        if pre.0 > pre.1 {
            return Err(ImpactError::InvalidSplit(format!(
                "pre period starts {} after it ends {}",
                pre.0, pre.1
            )));
        }
        if post.0 > post.1 {
            return Err(ImpactError::InvalidSplit(format!(
                "post period starts {} after it ends {}",
                post.0, post.1
            )));
        }
        if pre.1 >= post.0 {
            return Err(ImpactError::InvalidSplit(format!(
                "pre period must end before the post period starts ({} >= {})",
                pre.1, post.0
            )));
        }
        Ok(Self { pre, post })
    }

    /// Parse two `START:END` periods.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidSplit`] for malformed periods, otherwise
    /// as [`PrePostSplit::new`].
    pub fn parse(pre: &str, post: &str) -> Result<Self, ImpactError> {
        Self::new(parse_period(pre)?, parse_period(post)?)
    }

    /// Map the periods onto `frame` rows.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidSplit`] if either period selects no rows.
    pub fn resolve(&self, frame: &ImpactFrame) -> Result<ResolvedSplit, ImpactError> {
        let pre = frame.rows_between(self.pre.0, self.pre.1);
        let post = frame.rows_between(self.post.0, self.post.1);
        if pre.is_empty() {
            return Err(ImpactError::InvalidSplit(format!(
                "no rows in pre period {}..{}",
                self.pre.0, self.pre.1
            )));
        }
        if post.is_empty() {
            return Err(ImpactError::InvalidSplit(format!(
                "no rows in post period {}..{}",
                self.post.0, self.post.1
            )));
        }
        Ok(ResolvedSplit { pre, post })
    }
}

fn parse_period(text: &str) -> Result<(NaiveDate, NaiveDate), ImpactError> {
    let (start, end) = text
        .split_once(':')
        .ok_or_else(|| ImpactError::InvalidSplit(format!("period '{text}' must be START:END")))?;
    let date = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| ImpactError::InvalidSplit(format!("'{s}' is not YYYY-MM-DD")))
    };
    Ok((date(start)?, date(end)?))
}
