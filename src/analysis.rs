//! One complete analysis run: load a result file, derive the metrics
//! per problem size, and write the requested outputs.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use crate::{
    chart::{render, Chart, ChartConfig, MetricSelection},
    config_file::AnalysisSpec,
    excel_table_view::excel_file_write,
    grouping::group_by_problem_size,
    info,
    metrics::{derive_groups, EfficiencyMode, MetricsGroup},
    metrics_table::metrics_tables,
    sample::{load, Schema},
    table_view::TableView,
};

/// An `AnalysisSpec` with the preset defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub input: PathBuf,
    pub schema: Schema,
    pub mode: EfficiencyMode,
    pub metrics: MetricSelection,
    pub chart: ChartConfig,
    pub svg: Option<PathBuf>,
    pub excel: Option<PathBuf>,
}

impl TryFrom<AnalysisSpec> for Analysis {
    type Error = anyhow::Error;

    /// Explicitly given fields take precedence over those from the
    /// preset. Without a preset, a schema must be given.
    fn try_from(spec: AnalysisSpec) -> Result<Self> {
        let AnalysisSpec {
            input,
            preset,
            schema,
            mode,
            metrics,
            title,
            x_label,
            y_range,
            ideal_lines,
            svg,
            excel,
        } = spec;

        let schema = match (schema, preset) {
            (Some(schema), _) => schema,
            (None, Some(preset)) => preset.schema(),
            (None, None) => bail!(
                "analysis of {input:?}: need either a preset or a schema \
                 to know which columns to read"
            ),
        };
        let mode = mode
            .or(preset.map(|p| p.efficiency_mode()))
            .unwrap_or(EfficiencyMode::Strong);
        // Multiple curves can't share the two axes, thus a group field
        // added to an ungrouped preset also changes its default
        let grouped = schema.group_field.is_some();
        let metrics = metrics.unwrap_or(match preset {
            Some(preset) if !grouped || preset.schema().group_field.is_some() => {
                preset.metric_selection()
            }
            _ if grouped => MetricSelection::Efficiency,
            _ => MetricSelection::SpeedupAndEfficiency,
        });

        let mut chart = preset.map(|p| p.chart_config()).unwrap_or_default();
        if let Some(title) = title {
            chart.title = title;
        }
        if let Some(x_label) = x_label {
            chart.x_label = x_label;
        }
        if let Some((min, max)) = y_range {
            if !(min < max) {
                bail!("analysis of {input:?}: invalid y range {min}..{max}");
            }
            chart.y_range = Some((min, max));
        }
        if let Some(ideal_lines) = ideal_lines {
            chart.ideal_lines = ideal_lines;
        }

        Ok(Analysis {
            input,
            schema,
            mode,
            metrics,
            chart,
            svg,
            excel,
        })
    }
}

impl Analysis {
    /// Load the input file and derive the metrics, one entry per
    /// problem size (or a single one if the schema has no group
    /// field).
    pub fn derive(&self) -> Result<Vec<MetricsGroup>> {
        let Self {
            input,
            schema,
            mode,
            ..
        } = self;
        let set = load(input, schema).with_context(|| anyhow!("loading samples from {input:?}"))?;
        info!("loaded {} samples from {input:?}", set.samples().len());
        let groups = group_by_problem_size(&set)?;
        let groups = derive_groups(&groups, schema.group_field.as_deref(), *mode)
            .with_context(|| anyhow!("deriving {mode} metrics from {input:?}"))?;
        info!("derived {} scaling curve(s) from {input:?}", groups.len());
        Ok(groups)
    }

    pub fn chart(&self, groups: &[MetricsGroup]) -> Result<Chart> {
        render(groups, self.metrics, &self.chart)
            .with_context(|| anyhow!("composing the chart for {:?}", self.input))
    }

    /// Derive the metrics and write the SVG and Excel files, if
    /// requested. Returns the derived metrics for further output.
    pub fn run(&self) -> Result<Vec<MetricsGroup>> {
        let groups = self.derive()?;
        if let Some(svg) = &self.svg {
            self.chart(&groups)?.write_svg(svg)?;
        }
        if let Some(excel) = &self.excel {
            let tables = metrics_tables(&groups);
            excel_file_write(tables.iter().map(|t| t as &dyn TableView), excel)?;
        }
        if self.svg.is_none() && self.excel.is_none() {
            info!("no output files requested for {:?}", self.input);
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::Preset;

    fn spec(input: &str) -> AnalysisSpec {
        AnalysisSpec {
            input: input.into(),
            preset: None,
            schema: None,
            mode: None,
            metrics: None,
            title: None,
            x_label: None,
            y_range: None,
            ideal_lines: None,
            svg: None,
            excel: None,
        }
    }

    #[test]
    fn t_preset_defaults() -> Result<()> {
        let analysis = Analysis::try_from(AnalysisSpec {
            preset: Some(Preset::Grouped),
            ..spec("strong_scal.txt")
        })?;
        assert_eq!(analysis.schema, Schema::new("proc", "time", Some("N")));
        assert_eq!(analysis.mode, EfficiencyMode::Strong);
        assert_eq!(analysis.metrics, MetricSelection::Efficiency);
        assert_eq!(analysis.chart.title, "Strong Efficiency");
        assert_eq!(analysis.chart.y_range, Some((0., 1.1)));
        Ok(())
    }

    #[test]
    fn t_explicit_fields_win() -> Result<()> {
        let analysis = Analysis::try_from(AnalysisSpec {
            preset: Some(Preset::Weak),
            mode: Some(EfficiencyMode::WeakRaw),
            title: Some("Weak scaling, 1e6 cells per process".into()),
            ideal_lines: Some(false),
            ..spec("weak.txt")
        })?;
        assert_eq!(analysis.mode, EfficiencyMode::WeakRaw);
        assert_eq!(analysis.metrics, MetricSelection::SpeedupAndEfficiency);
        assert_eq!(analysis.chart.title, "Weak scaling, 1e6 cells per process");
        assert!(!analysis.chart.ideal_lines);
        Ok(())
    }

    #[test]
    fn t_schema_without_preset() -> Result<()> {
        let analysis = Analysis::try_from(AnalysisSpec {
            schema: Some(Schema::new("p", "t", Some("size"))),
            ..spec("a.csv")
        })?;
        assert_eq!(analysis.mode, EfficiencyMode::Strong);
        assert_eq!(analysis.metrics, MetricSelection::Efficiency);
        assert_eq!(analysis.chart, ChartConfig::default());
        Ok(())
    }

    #[test]
    fn t_group_field_added_to_ungrouped_preset() -> Result<()> {
        let strong_by_size = |metrics| {
            Analysis::try_from(AnalysisSpec {
                preset: Some(Preset::Strong),
                schema: Some(Schema::new("Cores", "ExecutionTime(seconds)", Some("N"))),
                metrics,
                ..spec("a.csv")
            })
        };
        let analysis = strong_by_size(None)?;
        assert_eq!(analysis.metrics, MetricSelection::Efficiency);
        assert_eq!(analysis.chart.title, "Strong Scalability");
        let analysis = strong_by_size(Some(MetricSelection::Speedup))?;
        assert_eq!(analysis.metrics, MetricSelection::Speedup);
        Ok(())
    }

    #[test]
    fn t_needs_preset_or_schema() {
        assert!(Analysis::try_from(spec("a.csv")).is_err());
    }

    #[test]
    fn t_bad_y_range() {
        let r = Analysis::try_from(AnalysisSpec {
            preset: Some(Preset::Strong),
            y_range: Some((1.1, 0.)),
            ..spec("a.csv")
        });
        assert!(r.is_err());
    }
}
