//! Built-in analysis settings for the result file layouts produced
//! by the benchmark scripts.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    chart::{ChartConfig, MetricSelection},
    metrics::EfficiencyMode,
    sample::Schema,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab_case")]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// `Cores,ExecutionTime(seconds)`, strong scaling, speedup and
    /// efficiency on two axes
    Strong,
    /// Same layout as `Strong`, efficiency as speedup per core
    Weak,
    /// `procs,time`, efficiency as the raw speedup
    WeakRaw,
    /// `proc,time,N`, one strong-scaling efficiency curve per problem
    /// size `N`
    Grouped,
}

impl Preset {
    pub fn schema(self) -> Schema {
        match self {
            Preset::Strong | Preset::Weak => Schema::new("Cores", "ExecutionTime(seconds)", None),
            Preset::WeakRaw => Schema::new("procs", "time", None),
            Preset::Grouped => Schema::new("proc", "time", Some("N")),
        }
    }

    pub fn efficiency_mode(self) -> EfficiencyMode {
        match self {
            Preset::Strong | Preset::Grouped => EfficiencyMode::Strong,
            Preset::Weak => EfficiencyMode::WeakPerProcess,
            Preset::WeakRaw => EfficiencyMode::WeakRaw,
        }
    }

    pub fn metric_selection(self) -> MetricSelection {
        match self {
            Preset::Strong | Preset::Weak | Preset::WeakRaw => {
                MetricSelection::SpeedupAndEfficiency
            }
            Preset::Grouped => MetricSelection::Efficiency,
        }
    }

    pub fn chart_config(self) -> ChartConfig {
        let default = ChartConfig::default();
        match self {
            Preset::Strong => ChartConfig {
                title: "Strong Scalability".into(),
                ..default
            },
            Preset::Weak | Preset::WeakRaw => ChartConfig {
                title: "Weak Scalability".into(),
                ..default
            },
            Preset::Grouped => ChartConfig {
                title: "Strong Efficiency".into(),
                x_label: "Number of Processes".into(),
                y_range: Some((0., 1.1)),
                size: (800, 600),
                ..default
            },
        }
    }
}
