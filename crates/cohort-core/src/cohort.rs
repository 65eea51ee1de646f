//! Cohorts: named, de-duplicated collections of member identifiers.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Bound for member identifiers.
///
/// `Eq` and `Hash` must agree (equal values hash equally). This cannot be
/// checked at runtime; an identifier type that violates it produces undefined
/// cell assignments. `Ord` is only used to emit member lists in a stable order.
pub trait Identifier: Eq + Hash + Ord + Clone {}

impl<T: Eq + Hash + Ord + Clone> Identifier for T {}

/// A named collection of unique member identifiers.
///
/// Duplicates collapse on construction. There are no mutating accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort<T: Identifier = String> {
    name: String,
    members: HashSet<T>,
}

impl<T: Identifier> Cohort<T> {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = T>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn members(&self) -> &HashSet<T> {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &T) -> bool {
        self.members.contains(id)
    }
}

/// Group `(segment, identifier)` rows into cohorts, one per distinct segment.
///
/// Cohorts are returned in the order their segment first appears.
pub fn cohorts_from_rows<S, T, I>(rows: I) -> Vec<Cohort<T>>
where
    S: Into<String>,
    T: Identifier,
    I: IntoIterator<Item = (S, T)>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, HashSet<T>)> = Vec::new();

    for (segment, id) in rows {
        let segment = segment.into();
        let slot = match index.get(&segment) {
            Some(slot) => *slot,
            None => {
                index.insert(segment.clone(), groups.len());
                groups.push((segment, HashSet::new()));
                groups.len() - 1
            }
        };
        groups[slot].1.insert(id);
    }

    groups
        .into_iter()
        .map(|(name, members)| Cohort { name, members })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse() {
        let cohort = Cohort::new("a", [1, 2, 2, 3, 3, 3]);
        assert_eq!(cohort.len(), 3);
        assert!(cohort.contains(&2));
        assert!(!cohort.contains(&4));
    }

    #[test]
    fn empty_cohort_is_allowed() {
        let cohort: Cohort<u32> = Cohort::new("empty", []);
        assert!(cohort.is_empty());
        assert_eq!(cohort.name(), "empty");
    }

    #[test]
    fn rows_group_by_segment_in_first_seen_order() {
        let rows = vec![
            ("blog", "u1"),
            ("pricing", "u2"),
            ("blog", "u3"),
            ("blog", "u1"),
            ("docs", "u2"),
        ];
        let cohorts = cohorts_from_rows(rows.into_iter().map(|(s, id)| (s, id.to_string())));

        let names: Vec<&str> = cohorts.iter().map(Cohort::name).collect();
        assert_eq!(names, vec!["blog", "pricing", "docs"]);
        assert_eq!(cohorts[0].len(), 2);
        assert_eq!(cohorts[1].len(), 1);
        assert_eq!(cohorts[2].len(), 1);
    }

    #[test]
    fn no_rows_yield_no_cohorts() {
        let cohorts: Vec<Cohort<String>> = cohorts_from_rows(Vec::<(String, String)>::new());
        assert!(cohorts.is_empty());
    }
}
