//! The derived metrics of a scaling curve as a `TableView`.

use std::borrow::Cow;

use genawaiter::rc::Gen;

use crate::{
    metrics::{DerivedMetric, EfficiencyMode, MetricsGroup},
    table_view::{ColumnFormatting, ColumnHeader, Highlight, TableView, TableViewRow, Unit},
};

/// Efficiencies below this are shown in red.
const LOW_EFFICIENCY: f64 = 0.5;

/// Efficiencies above this (superlinear scaling) are shown in green.
const SUPERLINEAR_EFFICIENCY: f64 = 1.0 + 1e-9;

impl TableViewRow<EfficiencyMode> for DerivedMetric {
    fn table_view_header(mode: EfficiencyMode) -> Box<dyn AsRef<[ColumnHeader]>> {
        let header: Vec<ColumnHeader> = vec![
            (
                "process count".into(),
                Unit::Count,
                ColumnFormatting::Number,
            ),
            ("time".into(), Unit::Named("s"), ColumnFormatting::Number),
            ("speedup".into(), Unit::DimensionLess, ColumnFormatting::Number),
            (
                format!("efficiency ({mode})").into(),
                Unit::DimensionLess,
                ColumnFormatting::Number,
            ),
        ];
        Box::new(header)
    }

    fn table_view_row(&self, out: &mut Vec<(Cow<str>, Highlight)>) {
        let DerivedMetric {
            process_count,
            time,
            problem_size: _,
            speedup,
            efficiency,
        } = self;
        let efficiency_highlight = if *efficiency < LOW_EFFICIENCY {
            Highlight::Red
        } else if *efficiency > SUPERLINEAR_EFFICIENCY {
            Highlight::Green
        } else {
            Highlight::Neutral
        };
        out.push((process_count.to_string().into(), Highlight::Neutral));
        out.push((time.to_string().into(), Highlight::Neutral));
        out.push((format!("{speedup:.3}").into(), Highlight::Neutral));
        out.push((format!("{efficiency:.3}").into(), efficiency_highlight));
    }
}

pub struct MetricsTable<'t> {
    pub group: &'t MetricsGroup,
}

impl<'t> TableView for MetricsTable<'t> {
    fn table_name(&self) -> Cow<str> {
        match &self.group.label {
            Some(label) => label.as_str().into(),
            None => "metrics".into(),
        }
    }

    fn table_view_header(&self) -> Box<dyn AsRef<[ColumnHeader]>> {
        DerivedMetric::table_view_header(self.group.mode)
    }

    fn table_view_body<'s>(
        &'s self,
    ) -> Box<dyn Iterator<Item = Cow<'s, [(Cow<'s, str>, Highlight)]>> + 's> {
        Box::new(
            Gen::new(|co| async move {
                for metric in &self.group.metrics {
                    // A new Vec for every row, it is handed out
                    let mut vals = Vec::new();
                    metric.table_view_row(&mut vals);
                    co.yield_(vals.into()).await;
                }
            })
            .into_iter(),
        )
    }
}

pub fn metrics_tables(groups: &[MetricsGroup]) -> Vec<MetricsTable> {
    groups.iter().map(|group| MetricsTable { group }).collect()
}
