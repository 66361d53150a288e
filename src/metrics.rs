//! Speedup and efficiency relative to the single-process baseline.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    debug,
    error::ScalabilityError,
    grouping::{GroupKey, ProblemSizeGroup},
    sample::SampleSet,
};

/// How to turn a speedup into an efficiency value. There is no
/// single accepted definition for weak scaling, so both variants in
/// use are offered under their own names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab_case")]
#[serde(rename_all = "kebab-case")]
pub enum EfficiencyMode {
    /// speedup / process count
    Strong,
    /// baseline time / time, i.e. the speedup itself (the problem
    /// grows with the process count, thus ideal is 1.0)
    WeakRaw,
    /// speedup / process count, same formula as `Strong`
    WeakPerProcess,
}

impl EfficiencyMode {
    pub fn efficiency(self, speedup: f64, process_count: u32) -> f64 {
        match self {
            EfficiencyMode::Strong | EfficiencyMode::WeakPerProcess => {
                speedup / f64::from(process_count)
            }
            EfficiencyMode::WeakRaw => speedup,
        }
    }
}

/// The values derived for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetric {
    pub process_count: u32,
    pub time: f64,
    pub problem_size: Option<GroupKey>,
    pub speedup: f64,
    pub efficiency: f64,
}

/// Speedup for every sample of `set` (in the order of
/// `set.samples()`), each relative to the baseline of its own
/// problem size.
pub fn compute_speedup(set: &SampleSet) -> Result<Vec<f64>, ScalabilityError> {
    set.samples()
        .iter()
        .map(|sample| {
            let baseline = set.baseline(sample.problem_size.as_ref())?;
            Ok(baseline.time / sample.time)
        })
        .collect()
}

pub fn compute_efficiency(
    set: &SampleSet,
    mode: EfficiencyMode,
) -> Result<Vec<DerivedMetric>, ScalabilityError> {
    let speedups = compute_speedup(set)?;
    Ok(set
        .samples()
        .iter()
        .zip(speedups)
        .map(|(sample, speedup)| {
            let efficiency = mode.efficiency(speedup, sample.process_count);
            debug!(
                "process count {}: speedup {speedup:.4}, {mode} efficiency {efficiency:.4}",
                sample.process_count
            );
            DerivedMetric {
                process_count: sample.process_count,
                time: sample.time,
                problem_size: sample.problem_size.clone(),
                speedup,
                efficiency,
            }
        })
        .collect())
}

/// The derived values for one scaling curve.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsGroup {
    pub key: Option<GroupKey>,
    /// Used for legends and table names
    pub label: Option<String>,
    pub mode: EfficiencyMode,
    pub metrics: Vec<DerivedMetric>,
}

pub fn derive_groups(
    groups: &[ProblemSizeGroup],
    group_field: Option<&str>,
    mode: EfficiencyMode,
) -> Result<Vec<MetricsGroup>, ScalabilityError> {
    groups
        .iter()
        .map(|group| {
            Ok(MetricsGroup {
                key: group.key.clone(),
                label: group_field.and_then(|field| group.label(field)),
                mode,
                metrics: compute_efficiency(&group.samples, mode)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::{grouping::group_by_problem_size, sample::Sample};

    fn set(rows: &[(u32, f64)]) -> SampleSet {
        SampleSet::new(
            rows.iter()
                .map(|&(process_count, time)| Sample {
                    process_count,
                    time,
                    problem_size: None,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn t_speedup_and_strong_efficiency() -> Result<()> {
        let set = set(&[(1, 100.0), (2, 55.0), (4, 30.0)]);
        let speedup = compute_speedup(&set)?;
        assert_relative_eq!(speedup[0], 1.0);
        assert_relative_eq!(speedup[1], 100.0 / 55.0);
        assert_relative_eq!(speedup[2], 100.0 / 30.0);

        let metrics = compute_efficiency(&set, EfficiencyMode::Strong)?;
        assert_relative_eq!(metrics[0].efficiency, 1.0);
        assert_relative_eq!(metrics[1].efficiency, 0.909090909, epsilon = 1e-8);
        assert_relative_eq!(metrics[2].efficiency, 0.833333333, epsilon = 1e-8);
        for m in &metrics {
            assert_relative_eq!(m.efficiency, m.speedup / f64::from(m.process_count));
        }
        Ok(())
    }

    #[test]
    fn t_weak_modes() -> Result<()> {
        let set = set(&[(1, 10.0), (2, 11.0), (8, 12.5)]);
        let raw = compute_efficiency(&set, EfficiencyMode::WeakRaw)?;
        let per_process = compute_efficiency(&set, EfficiencyMode::WeakPerProcess)?;
        let strong = compute_efficiency(&set, EfficiencyMode::Strong)?;
        for ((raw, per_process), strong) in raw.iter().zip(&per_process).zip(&strong) {
            assert_relative_eq!(raw.efficiency, raw.speedup);
            assert_relative_eq!(per_process.efficiency, strong.efficiency);
        }
        assert_relative_eq!(raw[2].efficiency, 0.8);
        assert_relative_eq!(per_process[2].efficiency, 0.1);
        Ok(())
    }

    #[test]
    fn t_baseline_is_one_in_every_mode() -> Result<()> {
        let set = set(&[(1, 3.0), (3, 1.5)]);
        for mode in EfficiencyMode::iter() {
            let metrics = compute_efficiency(&set, mode)?;
            assert_eq!(metrics[0].speedup, 1.0);
            assert_eq!(metrics[0].efficiency, 1.0);
        }
        Ok(())
    }

    #[test]
    fn t_speedup_is_pure() -> Result<()> {
        let set = set(&[(1, 7.0), (2, 4.0), (16, 0.9)]);
        assert_eq!(compute_speedup(&set)?, compute_speedup(&set)?);
        Ok(())
    }

    #[test]
    fn t_groups_not_cross_normalized() -> Result<()> {
        let sample = |process_count, time, size: &str| Sample {
            process_count,
            time,
            problem_size: Some(size.into()),
        };
        let set = SampleSet::new(vec![
            sample(1, 10.0, "100"),
            sample(2, 6.0, "100"),
            sample(4, 4.0, "100"),
            sample(1, 80.0, "200"),
            sample(2, 42.0, "200"),
            sample(4, 22.0, "200"),
        ])?;
        let groups = derive_groups(
            &group_by_problem_size(&set)?,
            Some("N"),
            EfficiencyMode::Strong,
        )?;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label.as_deref(), Some("N=100"));
        assert_eq!(groups[1].label.as_deref(), Some("N=200"));
        for group in &groups {
            assert_eq!(group.metrics[0].process_count, 1);
            assert_relative_eq!(group.metrics[0].efficiency, 1.0);
        }
        assert_relative_eq!(groups[0].metrics[2].efficiency, 10.0 / 4.0 / 4.0);
        assert_relative_eq!(groups[1].metrics[2].efficiency, 80.0 / 22.0 / 4.0);

        // Same values when computed on the whole set at once
        let whole = compute_efficiency(&set, EfficiencyMode::Strong)?;
        assert_relative_eq!(whole[5].efficiency, groups[1].metrics[2].efficiency);
        Ok(())
    }

    #[test]
    fn t_mode_names() {
        assert_eq!("weak-raw".parse::<EfficiencyMode>().ok(), Some(EfficiencyMode::WeakRaw));
        assert_eq!(EfficiencyMode::WeakPerProcess.to_string(), "weak-per-process");
        assert!("weak".parse::<EfficiencyMode>().is_err());
    }
}
