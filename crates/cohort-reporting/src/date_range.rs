//! Report date ranges.
//!
//! Bounds accept the Reporting API's own vocabulary: `YYYY-MM-DD`, `today`,
//! `yesterday`, or `NdaysAgo`. They are sent to the API verbatim, so relative
//! bounds resolve on the server's calendar.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;

use crate::error::ReportingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    Date(NaiveDate),
    Today,
    Yesterday,
    DaysAgo(u32),
}

impl DateSpec {
    /// Resolve against a reference `today`.
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Date(date) => date,
            Self::Today => today,
            Self::Yesterday => today.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN),
            Self::DaysAgo(n) => today
                .checked_sub_days(Days::new(u64::from(n)))
                .unwrap_or(NaiveDate::MIN),
        }
    }
}

impl FromStr for DateSpec {
    type Err = ReportingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "today" => return Ok(Self::Today),
            "yesterday" => return Ok(Self::Yesterday),
            _ => {}
        }
        if let Some(n) = s.strip_suffix("daysAgo") {
            return n
                .parse::<u32>()
                .map(Self::DaysAgo)
                .map_err(|_| ReportingError::InvalidDateRange(format!("bad relative date '{s}'")));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| {
                ReportingError::InvalidDateRange(format!(
                    "'{s}' is not YYYY-MM-DD, today, yesterday, or NdaysAgo"
                ))
            })
    }
}

impl fmt::Display for DateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Today => f.write_str("today"),
            Self::Yesterday => f.write_str("yesterday"),
            Self::DaysAgo(n) => write!(f, "{n}daysAgo"),
        }
    }
}

/// An inclusive report window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateSpec,
    end: DateSpec,
}

impl DateRange {
    /// Build a range, checking `start <= end` against today's UTC date.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::InvalidDateRange`] if the range is reversed.
    pub fn new(start: DateSpec, end: DateSpec) -> Result<Self, ReportingError> {
        Self::new_at(start, end, Utc::now().date_naive())
    }

    /// Build a range, checking `start <= end` against an explicit `today`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::InvalidDateRange`] if the range is reversed.
    pub fn new_at(start: DateSpec, end: DateSpec, today: NaiveDate) -> Result<Self, ReportingError> {
        let (from, to) = (start.resolve(today), end.resolve(today));
        if from > to {
            return Err(ReportingError::InvalidDateRange(format!(
                "start {start} ({from}) is after end {end} ({to})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from text.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::InvalidDateRange`] for unparseable or reversed bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, ReportingError> {
        Self::new(start.parse()?, end.parse()?)
    }

    #[must_use]
    pub const fn start(&self) -> DateSpec {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateSpec {
        self.end
    }
}

impl Serialize for DateRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("DateRange", 2)?;
        state.serialize_field("startDate", &self.start.to_string())?;
        state.serialize_field("endDate", &self.end.to_string())?;
        state.end()
    }
}
