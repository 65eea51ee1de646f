//! Overlap report types and query helpers.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cohort::Identifier;
use crate::errors::CoreError;

/// The exact set of cohorts an identifier belongs to.
///
/// Always non-empty, sorted, and free of duplicates. Ordered by degree
/// first, then by names, so singleton cells sort before pairwise cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Signature(Vec<String>);

impl Signature {
    /// Build a signature from cohort names in any order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `names` is empty.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self, CoreError> {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        if names.is_empty() {
            return Err(CoreError::invalid("signature must name at least one cohort"));
        }
        Ok(Self(names))
    }

    /// Caller guarantees `names` is sorted, unique, and non-empty.
    pub(crate) const fn from_sorted(names: Vec<String>) -> Self {
        Self(names)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of cohorts in the signature.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree()
            .cmp(&other.degree())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<Vec<String>> for Signature {
    type Error = CoreError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<Signature> for Vec<String> {
    fn from(signature: Signature) -> Self {
        signature.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" & "))
    }
}

/// Identifiers belonging to exactly the cohorts in `signature` and no others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapCell<T> {
    pub signature: Signature,
    pub count: usize,
    /// Sorted member list, present only when the analysis retained members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub name: String,
    pub size: usize,
}

/// Full overlap structure of a set of cohorts.
///
/// Cells partition the union exactly: every member of the union is counted in
/// one cell, and [`cell_total`](Self::cell_total) equals
/// [`union_size`](Self::union_size). Cells with a zero count are never present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapReport<T> {
    cohorts: Vec<CohortSummary>,
    union_size: usize,
    cells: Vec<OverlapCell<T>>,
}

impl<T: Identifier> OverlapReport<T> {
    pub(crate) fn new(
        mut cohorts: Vec<CohortSummary>,
        union_size: usize,
        mut cells: Vec<OverlapCell<T>>,
    ) -> Self {
        cohorts.sort_by(|a, b| a.name.cmp(&b.name));
        cells.sort_by(|a, b| a.signature.cmp(&b.signature));
        Self {
            cohorts,
            union_size,
            cells,
        }
    }

    /// Per-cohort sizes, sorted by name.
    #[must_use]
    pub fn cohorts(&self) -> &[CohortSummary] {
        &self.cohorts
    }

    /// Number of distinct identifiers across all cohorts.
    #[must_use]
    pub const fn union_size(&self) -> usize {
        self.union_size
    }

    /// Non-empty cells ordered by [`Signature`].
    #[must_use]
    pub fn cells(&self) -> &[OverlapCell<T>] {
        &self.cells
    }

    #[must_use]
    pub fn cell_total(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }

    #[must_use]
    pub fn cohort_size(&self, name: &str) -> Option<usize> {
        self.cohorts.iter().find(|c| c.name == name).map(|c| c.size)
    }

    /// Look up the cell for exactly `names` (in any order).
    ///
    /// Returns `None` when no identifier has that exact signature.
    #[must_use]
    pub fn cell(&self, names: &[&str]) -> Option<&OverlapCell<T>> {
        let signature = Signature::new(names.iter().copied()).ok()?;
        self.cells
            .binary_search_by(|c| c.signature.cmp(&signature))
            .ok()
            .map(|idx| &self.cells[idx])
    }

    /// Identifiers in exactly the cohort `name` and no other.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `name` is not a cohort in this report.
    pub fn exclusive_size(&self, name: &str) -> Result<usize, CoreError> {
        self.check_names(&[name])?;
        Ok(self.cell(&[name]).map_or(0, |c| c.count))
    }

    /// Identifiers present in *all* of `names` (inclusive intersection).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `names` is empty or names an
    /// unknown cohort.
    pub fn intersection_size(&self, names: &[&str]) -> Result<usize, CoreError> {
        self.check_names(names)?;
        Ok(self
            .cells
            .iter()
            .filter(|c| names.iter().all(|n| c.signature.contains(n)))
            .map(|c| c.count)
            .sum())
    }

    /// Identifiers present in *any* of `names`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `names` is empty or names an
    /// unknown cohort.
    pub fn union_size_of(&self, names: &[&str]) -> Result<usize, CoreError> {
        self.check_names(names)?;
        Ok(self
            .cells
            .iter()
            .filter(|c| names.iter().any(|n| c.signature.contains(n)))
            .map(|c| c.count)
            .sum())
    }

    /// Jaccard similarity `|A ∩ B| / |A ∪ B|`; `0.0` when both are empty.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if either name is unknown.
    #[allow(clippy::cast_precision_loss)]
    pub fn jaccard(&self, a: &str, b: &str) -> Result<f64, CoreError> {
        let union = self.union_size_of(&[a, b])?;
        if union == 0 {
            return Ok(0.0);
        }
        let intersection = self.intersection_size(&[a, b])?;
        Ok(intersection as f64 / union as f64)
    }

    fn check_names(&self, names: &[&str]) -> Result<(), CoreError> {
        if names.is_empty() {
            return Err(CoreError::invalid("at least one cohort name is required"));
        }
        if let Some(unknown) = names.iter().find(|n| self.cohort_size(n).is_none()) {
            return Err(CoreError::invalid(format!("unknown cohort '{unknown}'")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_and_dedups() {
        let sig = Signature::new(["b", "a", "b"]).unwrap();
        assert_eq!(sig.names(), ["a", "b"]);
        assert_eq!(sig.degree(), 2);
        assert_eq!(sig.to_string(), "a & b");
    }

    #[test]
    fn empty_signature_is_rejected() {
        let err = Signature::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn signatures_order_by_degree_then_name() {
        let mut sigs = vec![
            Signature::new(["a", "b"]).unwrap(),
            Signature::new(["c"]).unwrap(),
            Signature::new(["a", "b", "c"]).unwrap(),
            Signature::new(["a"]).unwrap(),
        ];
        sigs.sort();
        let rendered: Vec<String> = sigs.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a", "c", "a & b", "a & b & c"]);
    }

    #[test]
    fn signature_deserialization_validates() {
        let sig: Signature = serde_json::from_str(r#"["z", "a"]"#).unwrap();
        assert_eq!(sig.names(), ["a", "z"]);
        assert!(serde_json::from_str::<Signature>("[]").is_err());
    }
}
