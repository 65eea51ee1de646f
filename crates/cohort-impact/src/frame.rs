//! Date-indexed time-series tables.
//!
//! CSV layout: a header row, the date in the first column (`YYYY-MM-DD`), then
//! numeric columns. One numeric column is the response; the rest are
//! predictors (covariates unaffected by the event).
//!
//! ```csv
//! date,signups,organic_sessions
//! 2020-01-01,120,4010
//! 2020-01-02,131,4187
//! ```

use std::io::Read;
use std::ops::Range;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ImpactError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A named numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Response plus predictors over strictly increasing dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactFrame {
    dates: Vec<NaiveDate>,
    response: Series,
    predictors: Vec<Series>,
}

impl ImpactFrame {
    /// Build a frame, checking its structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidFrame`] if the frame is empty, dates are not
    /// strictly increasing, a column length differs from the date count, a value
    /// is not finite, or two columns share a name.
    pub fn new(
        dates: Vec<NaiveDate>,
        response: Series,
        predictors: Vec<Series>,
    ) -> Result<Self, ImpactError> {
        if dates.is_empty() {
            return Err(ImpactError::InvalidFrame(String::from("frame has no rows")));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ImpactError::InvalidFrame(format!(
                "dates must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            )));
        }

        let mut seen = vec![response.name.as_str()];
        for series in std::iter::once(&response).chain(&predictors) {
            if series.values.len() != dates.len() {
                return Err(ImpactError::InvalidFrame(format!(
                    "column '{}' has {} values for {} dates",
                    series.name,
                    series.values.len(),
                    dates.len()
                )));
            }
            if let Some(i) = series.values.iter().position(|v| !v.is_finite()) {
                return Err(ImpactError::InvalidFrame(format!(
                    "column '{}' has a non-finite value on {}",
                    series.name, dates[i]
                )));
            }
        }
        for predictor in &predictors {
            if seen.contains(&predictor.name.as_str()) {
                return Err(ImpactError::InvalidFrame(format!(
                    "duplicate column '{}'",
                    predictor.name
                )));
            }
            seen.push(&predictor.name);
        }

        Ok(Self {
            dates,
            response,
            predictors,
        })
    }

    /// Read a frame from CSV.
    ///
    /// `response_column` selects the response by header name; when `None` the
    /// first numeric column is the response. Every other numeric column becomes
    /// a predictor.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::Csv`] for malformed CSV, or
    /// [`ImpactError::InvalidFrame`] for unknown columns, unparseable dates or
    /// numbers, and any violation checked by [`ImpactFrame::new`].
    pub fn from_csv<R: Read>(reader: R, response_column: Option<&str>) -> Result<Self, ImpactError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
        if headers.len() < 2 {
            return Err(ImpactError::InvalidFrame(String::from(
                "expected a date column and at least one numeric column",
            )));
        }
        let response_index = match response_column {
            Some(name) => headers
                .iter()
                .skip(1)
                .position(|h| h == name)
                .map(|i| i + 1)
                .ok_or_else(|| ImpactError::InvalidFrame(format!("no column named '{name}'")))?,
            None => 1,
        };

        let mut dates = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len() - 1];

        for (row, record) in csv.records().enumerate() {
            let record = record?;
            // header is line 1
            let line = row + 2;
            let raw_date = record.get(0).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
                ImpactError::InvalidFrame(format!("line {line}: '{raw_date}' is not YYYY-MM-DD"))
            })?;
            dates.push(date);

            for (column, values) in columns.iter_mut().enumerate() {
                let raw = record.get(column + 1).unwrap_or_default();
                let value = raw.parse::<f64>().map_err(|_| {
                    ImpactError::InvalidFrame(format!(
                        "line {line}: column '{}' value '{raw}' is not numeric",
                        headers[column + 1]
                    ))
                })?;
                values.push(value);
            }
        }

        let mut response = None;
        let mut predictors = Vec::with_capacity(columns.len().saturating_sub(1));
        for (i, values) in columns.into_iter().enumerate() {
            let series = Series::new(headers[i + 1].clone(), values);
            if i + 1 == response_index {
                response = Some(series);
            } else {
                predictors.push(series);
            }
        }
        let response = response
            .ok_or_else(|| ImpactError::InvalidFrame(String::from("response column missing")))?;

        tracing::debug!(
            rows = dates.len(),
            response = %response.name,
            predictors = predictors.len(),
            "loaded impact frame"
        );
        Self::new(dates, response, predictors)
    }

    /// Read a frame from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::Io`] if the file cannot be opened, otherwise as
    /// [`ImpactFrame::from_csv`].
    pub fn from_path(path: impl AsRef<Path>, response_column: Option<&str>) -> Result<Self, ImpactError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv(std::io::BufReader::new(file), response_column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub const fn response(&self) -> &Series {
        &self.response
    }

    #[must_use]
    pub fn predictors(&self) -> &[Series] {
        &self.predictors
    }

    /// Row indices whose date falls within `[start, end]`.
    #[must_use]
    pub fn rows_between(&self, start: NaiveDate, end: NaiveDate) -> Range<usize> {
        let from = self.dates.partition_point(|d| *d < start);
        let to = self.dates.partition_point(|d| *d <= end);
        from..to.max(from)
    }

    /// Predictor values of row `row`, in column order.
    pub(crate) fn predictor_row(&self, row: usize) -> impl Iterator<Item = f64> + '_ {
        self.predictors.iter().map(move |s| s.values[row])
    }
}
