use std::{fmt::Display, path::PathBuf};

use crate::grouping::GroupKey;

/// Failures while loading samples or deriving metrics from them. All
/// of them are fatal for the analysis at hand.
#[derive(Debug, thiserror::Error)]
pub enum ScalabilityError {
    /// The table does not match the declared schema, or a value is
    /// not usable (e.g. a non-positive execution time).
    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("missing baseline row (process count 1){}", InGroup(.group))]
    MissingBaseline { group: Option<GroupKey> },

    #[error("ambiguous baseline: {count} rows with process count 1{}", InGroup(.group))]
    AmbiguousBaseline {
        group: Option<GroupKey>,
        count: usize,
    },

    /// The requested chart cannot be composed from the given data.
    #[error("chart: {0}")]
    Chart(String),

    #[error("opening {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),
}

struct InGroup<'t>(&'t Option<GroupKey>);

impl<'t> Display for InGroup<'t> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(key) => write!(f, " in group {key}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_messages() {
        let e = ScalabilityError::MissingBaseline { group: None };
        assert_eq!(e.to_string(), "missing baseline row (process count 1)");
        let e = ScalabilityError::AmbiguousBaseline {
            group: Some(GroupKey::from("200")),
            count: 2,
        };
        assert_eq!(
            e.to_string(),
            "ambiguous baseline: 2 rows with process count 1 in group 200"
        );
    }
}
