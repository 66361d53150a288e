//! Benchmark samples (execution time at a given number of processes)
//! as read from comma-separated result files.

use std::{fs::File, io::Read, path::Path};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{debug, error::ScalabilityError, grouping::GroupKey};

/// Which columns of the input table hold what. Result files coming
/// from different benchmark scripts name their columns differently
/// (e.g. `Cores` vs. `procs`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    pub process_count_field: String,
    pub time_field: String,
    /// Column with the problem size, if the file holds multiple
    /// scaling curves
    #[serde(default)]
    pub group_field: Option<String>,
}

impl Schema {
    pub fn new(process_count_field: &str, time_field: &str, group_field: Option<&str>) -> Self {
        Self {
            process_count_field: process_count_field.into(),
            time_field: time_field.into(),
            group_field: group_field.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub process_count: u32,
    /// Execution time in seconds
    pub time: f64,
    pub problem_size: Option<GroupKey>,
}

impl Sample {
    pub fn is_baseline(&self) -> bool {
        self.process_count == 1
    }
}

/// The samples of one experiment, sorted by problem size then process
/// count. Every problem size (or the whole set, if there are none)
/// has exactly one baseline sample and no repeated process counts.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new(mut samples: Vec<Sample>) -> Result<Self, ScalabilityError> {
        if samples.is_empty() {
            return Err(ScalabilityError::DataFormat("no samples given".into()));
        }
        for sample in &samples {
            if sample.process_count == 0 {
                return Err(ScalabilityError::DataFormat(
                    "process count must be positive, got 0".into(),
                ));
            }
            if !(sample.time.is_finite() && sample.time > 0.) {
                return Err(ScalabilityError::DataFormat(format!(
                    "execution time must be a positive number, got {} at process count {}",
                    sample.time, sample.process_count
                )));
            }
        }
        samples.sort_by(|a, b| {
            a.problem_size
                .cmp(&b.problem_size)
                .then(a.process_count.cmp(&b.process_count))
        });

        let slf = Self { samples };
        for (group, samples) in &slf.samples.iter().group_by(|s| s.problem_size.as_ref()) {
            // Check the baseline first, so that a repeated process
            // count 1 is reported as such
            slf.baseline(group)?;
            for (a, b) in samples.tuple_windows() {
                if a.process_count == b.process_count {
                    let in_group = group.map(|g| format!(" in group {g}")).unwrap_or_default();
                    return Err(ScalabilityError::DataFormat(format!(
                        "process count {} appears more than once{in_group}",
                        a.process_count
                    )));
                }
            }
        }
        Ok(slf)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn is_grouped(&self) -> bool {
        self.samples.iter().any(|s| s.problem_size.is_some())
    }

    /// The sample with process count 1 among those with the given
    /// problem size.
    pub fn baseline(&self, group: Option<&GroupKey>) -> Result<&Sample, ScalabilityError> {
        let mut baselines = self
            .samples
            .iter()
            .filter(|s| s.is_baseline() && s.problem_size.as_ref() == group);
        match (baselines.next(), baselines.count()) {
            (Some(baseline), 0) => Ok(baseline),
            (None, _) => Err(ScalabilityError::MissingBaseline {
                group: group.cloned(),
            }),
            (Some(_), rest) => Err(ScalabilityError::AmbiguousBaseline {
                group: group.cloned(),
                count: rest + 1,
            }),
        }
    }

    /// The distinct process counts across all groups, ascending.
    pub fn process_counts(&self) -> Vec<u32> {
        self.samples
            .iter()
            .map(|s| s.process_count)
            .sorted()
            .dedup()
            .collect()
    }
}

/// Accepts "4" as well as "4.0", as written by tools storing all
/// columns as floats.
fn parse_process_count(s: &str) -> Option<u32> {
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    if f.fract() == 0. && f >= 0. && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

/// Read a comma-separated table with a header row from `reader`,
/// picking the columns named in `schema`. Other columns are ignored.
pub fn load_from_reader<R: Read>(reader: R, schema: &Schema) -> Result<SampleSet, ScalabilityError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let column = |name: &str| -> Result<usize, ScalabilityError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ScalabilityError::DataFormat(format!(
                "missing column {name:?}, the table has: {:?}",
                headers.iter().collect::<Vec<_>>()
            ))
        })
    };
    let process_count_column = column(&schema.process_count_field)?;
    let time_column = column(&schema.time_field)?;
    let group_column = schema
        .group_field
        .as_deref()
        .map(|name| column(name))
        .transpose()?;

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize, name: &str| -> Result<&str, ScalabilityError> {
            match record.get(i) {
                Some(s) if !s.is_empty() => Ok(s),
                _ => Err(ScalabilityError::DataFormat(format!(
                    "line {line}: missing value for column {name:?}"
                ))),
            }
        };

        let s = field(process_count_column, &schema.process_count_field)?;
        let process_count = parse_process_count(s).ok_or_else(|| {
            ScalabilityError::DataFormat(format!(
                "line {line}: invalid process count {s:?} in column {:?}",
                schema.process_count_field
            ))
        })?;
        let s = field(time_column, &schema.time_field)?;
        let time: f64 = s.parse().map_err(|e| {
            ScalabilityError::DataFormat(format!(
                "line {line}: invalid time {s:?} in column {:?}: {e}",
                schema.time_field
            ))
        })?;
        let problem_size = match (group_column, &schema.group_field) {
            (Some(i), Some(name)) => Some(GroupKey::from(field(i, name)?)),
            _ => None,
        };
        debug!("line {line}: process count {process_count}, time {time}, problem size {problem_size:?}");
        samples.push(Sample {
            process_count,
            time,
            problem_size,
        });
    }

    if samples.is_empty() {
        return Err(ScalabilityError::DataFormat(
            "the table has a header but no data rows".into(),
        ));
    }
    SampleSet::new(samples)
}

pub fn load(path: &Path, schema: &Schema) -> Result<SampleSet, ScalabilityError> {
    let file = File::open(path).map_err(|source| ScalabilityError::Io {
        path: path.to_owned(),
        source,
    })?;
    load_from_reader(file, schema)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    fn strong() -> Schema {
        Schema::new("Cores", "ExecutionTime(seconds)", None)
    }

    #[test]
    fn t_load_sorted() -> Result<()> {
        let input = "Cores,ExecutionTime(seconds)\n4,30.0\n1,100.0\n2,55.0\n";
        let set = load_from_reader(input.as_bytes(), &strong())?;
        let procs: Vec<u32> = set.samples().iter().map(|s| s.process_count).collect();
        assert_eq!(procs, [1, 2, 4]);
        assert_eq!(set.baseline(None)?.time, 100.0);
        assert!(!set.is_grouped());
        Ok(())
    }

    #[test]
    fn t_load_trims_and_ignores_other_columns() -> Result<()> {
        let input = "run, procs , time\na, 1, 8.5\nb, 2.0, 4.5\n";
        let set = load_from_reader(input.as_bytes(), &Schema::new("procs", "time", None))?;
        assert_eq!(set.process_counts(), [1, 2]);
        assert_eq!(set.samples()[1].time, 4.5);
        Ok(())
    }

    #[test]
    fn t_load_grouped() -> Result<()> {
        let input = "proc,time,N\n1,10,100\n1,40,200\n2,5.5,100\n2,21,200\n4,11,200\n";
        let set = load_from_reader(input.as_bytes(), &Schema::new("proc", "time", Some("N")))?;
        assert!(set.is_grouped());
        assert_eq!(set.process_counts(), [1, 2, 4]);
        assert_eq!(set.baseline(Some(&"200".into()))?.time, 40.0);
        Ok(())
    }

    #[test]
    fn t_missing_column() {
        let input = "procs,time\n1,1.0\n";
        match load_from_reader(input.as_bytes(), &strong()) {
            Err(ScalabilityError::DataFormat(msg)) => assert!(msg.contains("\"Cores\""), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn t_missing_baseline() {
        let input = "Cores,ExecutionTime(seconds)\n2,55.0\n4,30.0\n";
        assert!(matches!(
            load_from_reader(input.as_bytes(), &strong()),
            Err(ScalabilityError::MissingBaseline { group: None })
        ));
    }

    #[test]
    fn t_missing_baseline_in_one_group() {
        let input = "proc,time,N\n1,10,100\n2,5,100\n2,21,200\n";
        match load_from_reader(input.as_bytes(), &Schema::new("proc", "time", Some("N"))) {
            Err(ScalabilityError::MissingBaseline { group }) => {
                assert_eq!(group, Some("200".into()))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn t_ambiguous_baseline() {
        let input = "Cores,ExecutionTime(seconds)\n1,100.0\n1,99.0\n2,55.0\n";
        assert!(matches!(
            load_from_reader(input.as_bytes(), &strong()),
            Err(ScalabilityError::AmbiguousBaseline {
                group: None,
                count: 2
            })
        ));
    }

    #[test]
    fn t_repeated_process_count() {
        let input = "Cores,ExecutionTime(seconds)\n1,100.0\n2,55.0\n2,56.0\n";
        assert!(matches!(
            load_from_reader(input.as_bytes(), &strong()),
            Err(ScalabilityError::DataFormat(_))
        ));
    }

    #[test]
    fn t_invalid_values() {
        for input in [
            "Cores,ExecutionTime(seconds)\n1,abc\n",
            "Cores,ExecutionTime(seconds)\n1,0\n",
            "Cores,ExecutionTime(seconds)\n1,-3\n",
            "Cores,ExecutionTime(seconds)\n1.5,3\n",
            "Cores,ExecutionTime(seconds)\n0,3\n",
            "Cores,ExecutionTime(seconds)\n1\n",
            "Cores,ExecutionTime(seconds)\n",
            "",
        ] {
            assert!(
                matches!(
                    load_from_reader(input.as_bytes(), &strong()),
                    Err(ScalabilityError::DataFormat(_))
                ),
                "{input:?}"
            );
        }
    }

    #[test]
    fn t_missing_file() {
        let path = Path::new("/nonexistent/strong_scalability_results.txt");
        assert!(matches!(
            load(path, &strong()),
            Err(ScalabilityError::Io { .. })
        ));
    }
}
