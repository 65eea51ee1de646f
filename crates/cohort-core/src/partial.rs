//! Per-shard accumulation of membership signatures.
//!
//! Shards of the identifier union can be accumulated independently and
//! merged in any order: `merge` is a commutative, associative sum over cells.

use std::collections::HashMap;

use crate::cohort::{Cohort, Identifier};
use crate::report::{CohortSummary, OverlapCell, OverlapReport, Signature};

#[derive(Debug, Clone)]
struct Accum<T> {
    count: usize,
    members: Vec<T>,
}

/// Signature counts for one shard of identifiers.
///
/// Signatures are stored as indices into the cohort slice passed to
/// [`accumulate`](Self::accumulate). Every shard that will be merged must be
/// accumulated against the same slice in the same order.
#[derive(Debug, Clone)]
pub struct PartialOverlap<T> {
    keep_members: bool,
    cells: HashMap<Vec<usize>, Accum<T>>,
}

impl<T: Identifier> PartialOverlap<T> {
    #[must_use]
    pub fn new(keep_members: bool) -> Self {
        Self {
            keep_members,
            cells: HashMap::new(),
        }
    }

    /// Probe each identifier against every cohort and count its signature.
    ///
    /// Cost is O(ids × cohorts). Identifiers found in no cohort are skipped.
    pub fn accumulate<'a>(&mut self, cohorts: &[&Cohort<T>], ids: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        for id in ids {
            let signature: Vec<usize> = cohorts
                .iter()
                .enumerate()
                .filter(|(_, cohort)| cohort.contains(id))
                .map(|(idx, _)| idx)
                .collect();
            if signature.is_empty() {
                continue;
            }

            let cell = self.cells.entry(signature).or_insert_with(|| Accum {
                count: 0,
                members: Vec::new(),
            });
            cell.count += 1;
            if self.keep_members {
                cell.members.push(id.clone());
            }
        }
    }

    /// Combine two shards.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.keep_members |= other.keep_members;
        for (signature, accum) in other.cells {
            match self.cells.get_mut(&signature) {
                Some(existing) => {
                    existing.count += accum.count;
                    existing.members.extend(accum.members);
                }
                None => {
                    self.cells.insert(signature, accum);
                }
            }
        }
        self
    }

    /// Number of identifiers counted so far.
    #[must_use]
    pub fn total(&self) -> usize {
        self.cells.values().map(|a| a.count).sum()
    }

    /// Number of distinct signatures seen so far.
    #[must_use]
    pub fn signature_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn into_report(self, cohorts: &[&Cohort<T>]) -> OverlapReport<T> {
        let union_size = self.total();
        let summaries = cohorts
            .iter()
            .map(|c| CohortSummary {
                name: c.name().to_string(),
                size: c.len(),
            })
            .collect();

        let keep_members = self.keep_members;
        let cells = self
            .cells
            .into_iter()
            .map(|(indices, mut accum)| {
                // Indices are ascending over a name-sorted slice, so names stay sorted.
                let names = indices
                    .iter()
                    .map(|&idx| cohorts[idx].name().to_string())
                    .collect();
                let members = keep_members.then(|| {
                    accum.members.sort();
                    accum.members
                });
                OverlapCell {
                    signature: Signature::from_sorted(names),
                    count: accum.count,
                    members,
                }
            })
            .collect();

        OverlapReport::new(summaries, union_size, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cohorts() -> (Cohort<u32>, Cohort<u32>) {
        (Cohort::new("a", [1, 2, 3]), Cohort::new("b", [3, 4]))
    }

    #[test]
    fn merge_sums_matching_signatures() {
        let (a, b) = cohorts();
        let slice = [&a, &b];

        let mut left = PartialOverlap::new(true);
        left.accumulate(&slice, [1, 3].iter());
        let mut right = PartialOverlap::new(true);
        right.accumulate(&slice, [2, 4].iter());

        let merged = left.merge(right);
        assert_eq!(merged.total(), 4);
        assert_eq!(merged.signature_count(), 3);

        let report = merged.into_report(&slice);
        let only_a = report.cell(&["a"]).unwrap();
        assert_eq!(only_a.count, 2);
        assert_eq!(only_a.members.as_deref(), Some(&[1, 2][..]));
    }

    #[test]
    fn merge_order_does_not_matter() {
        let (a, b) = cohorts();
        let slice = [&a, &b];

        let shard = |ids: &[u32]| {
            let mut p = PartialOverlap::new(false);
            p.accumulate(&slice, ids.iter());
            p
        };

        let forward = shard(&[1, 2]).merge(shard(&[3, 4])).into_report(&slice);
        let backward = shard(&[3, 4]).merge(shard(&[1, 2])).into_report(&slice);
        assert_eq!(forward, backward);
    }

    #[test]
    fn identifiers_outside_every_cohort_are_skipped() {
        let (a, b) = cohorts();
        let mut p = PartialOverlap::new(false);
        p.accumulate(&[&a, &b], [99, 100].iter());
        assert_eq!(p.total(), 0);
        assert_eq!(p.signature_count(), 0);
    }
}
