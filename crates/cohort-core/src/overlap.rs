//! The overlap analyzer.
//!
//! Iterates once over the union of all cohorts, computes each identifier's
//! membership signature by probing every cohort, and accumulates counts per
//! signature. Complexity is O(total members × N); there is no 2^N subset
//! enumeration, so any number of cohorts is supported.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::cohort::{Cohort, Identifier};
use crate::errors::CoreError;
use crate::partial::PartialOverlap;
use crate::report::OverlapReport;

/// Below this many identifiers per shard the parallel path is not worth it.
const MIN_SHARD_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapOptions {
    /// Retain the sorted member list of every cell, not just its count.
    pub keep_members: bool,
}

/// Compute the overlap partition of `cohorts` (counts only).
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] when no cohorts are supplied, a cohort
/// name is empty, or two cohorts share a name.
pub fn compute_overlap<T: Identifier>(cohorts: &[Cohort<T>]) -> Result<OverlapReport<T>, CoreError> {
    compute_overlap_with(cohorts, OverlapOptions::default())
}

/// Compute the overlap partition of `cohorts` with explicit options.
///
/// # Errors
///
/// See [`compute_overlap`].
pub fn compute_overlap_with<T: Identifier>(
    cohorts: &[Cohort<T>],
    options: OverlapOptions,
) -> Result<OverlapReport<T>, CoreError> {
    let sorted = validate(cohorts)?;
    let union = distinct_members(&sorted);

    let mut partial = PartialOverlap::new(options.keep_members);
    partial.accumulate(&sorted, union.iter().copied());

    tracing::debug!(
        cohorts = sorted.len(),
        union = union.len(),
        cells = partial.signature_count(),
        "computed cohort overlap"
    );
    Ok(partial.into_report(&sorted))
}

/// Compute the overlap partition by sharding the union across the rayon pool.
///
/// Produces a report identical to [`compute_overlap_with`].
///
/// # Errors
///
/// See [`compute_overlap`].
pub fn compute_overlap_parallel<T>(
    cohorts: &[Cohort<T>],
    options: OverlapOptions,
) -> Result<OverlapReport<T>, CoreError>
where
    T: Identifier + Send + Sync,
{
    let sorted = validate(cohorts)?;
    let union = distinct_members(&sorted);

    let shard_size = union
        .len()
        .div_ceil(rayon::current_num_threads().max(1))
        .max(MIN_SHARD_SIZE);

    let partial = union
        .par_chunks(shard_size)
        .map(|shard| {
            let mut partial = PartialOverlap::new(options.keep_members);
            partial.accumulate(&sorted, shard.iter().copied());
            partial
        })
        .reduce(|| PartialOverlap::new(options.keep_members), PartialOverlap::merge);

    tracing::debug!(
        cohorts = sorted.len(),
        union = union.len(),
        shard_size,
        cells = partial.signature_count(),
        "computed cohort overlap in parallel"
    );
    Ok(partial.into_report(&sorted))
}

/// Check input constraints and return the cohorts ordered by name.
fn validate<T: Identifier>(cohorts: &[Cohort<T>]) -> Result<Vec<&Cohort<T>>, CoreError> {
    if cohorts.is_empty() {
        return Err(CoreError::invalid("at least one cohort is required"));
    }
    if cohorts.iter().any(|c| c.name().is_empty()) {
        return Err(CoreError::invalid("cohort names must not be empty"));
    }

    let mut sorted: Vec<&Cohort<T>> = cohorts.iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));
    if let Some(pair) = sorted.windows(2).find(|w| w[0].name() == w[1].name()) {
        return Err(CoreError::invalid(format!(
            "duplicate cohort name '{}'",
            pair[0].name()
        )));
    }
    Ok(sorted)
}

fn distinct_members<'a, T: Identifier>(cohorts: &[&'a Cohort<T>]) -> Vec<&'a T> {
    let mut seen: HashSet<&'a T> = HashSet::new();
    let mut union = Vec::new();
    for cohort in cohorts.iter().copied() {
        for id in cohort.members() {
            if seen.insert(id) {
                union.push(id);
            }
        }
    }
    union
}
