//! Splitting a sample set into one scaling curve per problem size.

use std::{cmp::Ordering, collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::{
    error::ScalabilityError,
    sample::{Sample, SampleSet},
};

/// The problem size label of a sample (e.g. the `N` column). Keys
/// that parse as numbers order numerically (and before all other
/// keys), the rest lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_number(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey(value.to_owned())
    }
}

impl From<String> for GroupKey {
    fn from(value: String) -> Self {
        GroupKey(value)
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            // "100" and "1e2" are different keys, keep the order total
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

/// One scaling curve: the samples sharing a problem size.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemSizeGroup {
    /// None if the samples carry no problem size
    pub key: Option<GroupKey>,
    pub samples: SampleSet,
}

impl ProblemSizeGroup {
    /// Label for legends and table names, `N=<key>` for groups with
    /// a key.
    pub fn label(&self, group_field: &str) -> Option<String> {
        self.key.as_ref().map(|key| format!("{group_field}={key}"))
    }
}

/// Split `set` by problem size, ordered by `GroupKey`. A set without
/// problem sizes results in a single group with `key == None`. Each
/// group keeps its own baseline.
pub fn group_by_problem_size(set: &SampleSet) -> Result<Vec<ProblemSizeGroup>, ScalabilityError> {
    let mut groups: BTreeMap<Option<GroupKey>, Vec<Sample>> = BTreeMap::new();
    for sample in set.samples() {
        groups
            .entry(sample.problem_size.clone())
            .or_default()
            .push(sample.clone());
    }
    groups
        .into_iter()
        .map(|(key, samples)| {
            Ok(ProblemSizeGroup {
                key,
                samples: SampleSet::new(samples)?,
            })
        })
        .collect()
}
