//! Composing speedup/efficiency charts from derived metrics, and
//! drawing them to SVG.

use std::{ops::Range, path::Path};

use anyhow::{anyhow, Context, Result};
use itertools::Itertools;
use plotters::{
    coord::{
        ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter},
        types::RangedCoordf64,
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{
    error::ScalabilityError,
    info,
    metrics::{DerivedMetric, EfficiencyMode, MetricsGroup},
    utillib::tmp_file::write_via_tmp_file,
};

// matplotlib's default color cycle ("tab10")
const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];
const TAB_BLUE: RGBColor = TAB10[0];
const TAB_RED: RGBColor = TAB10[3];
const GRAY: RGBColor = RGBColor(128, 128, 128);

/// Headroom above the largest value on an automatically scaled axis.
const HEADROOM: f64 = 1.1;

const FONT: &str = "sans-serif";

/// Which metrics to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab_case")]
#[serde(rename_all = "kebab-case")]
pub enum MetricSelection {
    /// Speedup on the left axis, efficiency on the right axis; only
    /// for a single scaling curve
    SpeedupAndEfficiency,
    /// One speedup curve per problem size
    Speedup,
    /// One efficiency curve per problem size
    Efficiency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub title: String,
    pub x_label: String,
    /// Whether to draw the ideal speedup/efficiency reference lines
    pub ideal_lines: bool,
    /// Fixed range of the (left) y axis; automatic if None
    pub y_range: Option<(f64, f64)>,
    /// In pixels
    pub size: (u32, u32),
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Scalability".into(),
            x_label: "Number of Cores".into(),
            ideal_lines: true,
            y_range: None,
            size: (640, 480),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Cross,
    Triangle,
}

#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub axis: Axis,
    pub color: RGBColor,
    pub marker: Marker,
    /// (process count, value)
    pub points: Vec<(u32, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference {
    /// value == process count
    Identity,
    Constant(f64),
}

impl Reference {
    fn at(self, x: f64) -> f64 {
        match self {
            Reference::Identity => x,
            Reference::Constant(y) => y,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceLine {
    pub label: String,
    pub axis: Axis,
    pub reference: Reference,
}

/// A fully composed chart, ready to be drawn.
#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Set iff there are series on the secondary axis
    pub secondary_y_label: Option<String>,
    /// The process counts present in the data
    pub x_ticks: Vec<u32>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub secondary_y_range: Option<(f64, f64)>,
    pub series: Vec<Series>,
    pub reference_lines: Vec<ReferenceLine>,
    pub size: (u32, u32),
}

/// The ideal speedup: linear in the process count, except for the
/// raw weak-scaling definition where the ideal is a constant speedup
/// of 1.
fn ideal_speedup(mode: EfficiencyMode) -> Reference {
    match mode {
        EfficiencyMode::Strong | EfficiencyMode::WeakPerProcess => Reference::Identity,
        EfficiencyMode::WeakRaw => Reference::Constant(1.0),
    }
}

fn points(group: &MetricsGroup, value: fn(&DerivedMetric) -> f64) -> Vec<(u32, f64)> {
    group
        .metrics
        .iter()
        .map(|m| (m.process_count, value(m)))
        .collect()
}

fn auto_range(max: f64) -> (f64, f64) {
    (0., if max > 0. { max * HEADROOM } else { 1. })
}

/// Compose the chart for `groups` (as returned by
/// `metrics::derive_groups`).
pub fn render(
    groups: &[MetricsGroup],
    selection: MetricSelection,
    config: &ChartConfig,
) -> Result<Chart, ScalabilityError> {
    let x_ticks: Vec<u32> = groups
        .iter()
        .flat_map(|g| g.metrics.iter().map(|m| m.process_count))
        .sorted()
        .dedup()
        .collect();
    let (first_tick, last_tick) = match (x_ticks.first(), x_ticks.last()) {
        (Some(first), Some(last)) => (f64::from(*first), f64::from(*last)),
        _ => return Err(ScalabilityError::Chart("no samples to plot".into())),
    };
    let x_pad = ((last_tick - first_tick) * 0.05).max(0.5);
    let x_range = (first_tick - x_pad, last_tick + x_pad);

    let color = |i: usize| {
        if groups.len() == 1 {
            TAB_BLUE
        } else {
            TAB10[i % TAB10.len()]
        }
    };
    let mut series = Vec::new();
    let mut reference_lines = Vec::new();
    let y_label;
    let mut secondary_y_label = None;

    match selection {
        MetricSelection::SpeedupAndEfficiency => {
            let [group] = groups else {
                return Err(ScalabilityError::Chart(format!(
                    "speedup and efficiency on two axes needs exactly one scaling curve, \
                     got {} (choose speedup or efficiency instead)",
                    groups.len()
                )));
            };
            series.push(Series {
                label: "Speedup".into(),
                axis: Axis::Primary,
                color: TAB_BLUE,
                marker: Marker::Circle,
                points: points(group, |m| m.speedup),
            });
            series.push(Series {
                label: "Efficiency".into(),
                axis: Axis::Secondary,
                color: TAB_RED,
                marker: Marker::Cross,
                points: points(group, |m| m.efficiency),
            });
            if config.ideal_lines {
                reference_lines.push(ReferenceLine {
                    label: "Ideal Speedup".into(),
                    axis: Axis::Primary,
                    reference: ideal_speedup(group.mode),
                });
            }
            y_label = "Speedup";
            secondary_y_label = Some("Efficiency".to_string());
        }
        MetricSelection::Speedup => {
            for (i, group) in groups.iter().enumerate() {
                series.push(Series {
                    label: group.label.clone().unwrap_or_else(|| "Speedup".into()),
                    axis: Axis::Primary,
                    color: color(i),
                    marker: Marker::Circle,
                    points: points(group, |m| m.speedup),
                });
            }
            let modes: Vec<EfficiencyMode> = groups.iter().map(|g| g.mode).unique().collect();
            if config.ideal_lines {
                if let [mode] = modes.as_slice() {
                    reference_lines.push(ReferenceLine {
                        label: "Ideal Speedup".into(),
                        axis: Axis::Primary,
                        reference: ideal_speedup(*mode),
                    });
                }
            }
            y_label = "Speedup";
        }
        MetricSelection::Efficiency => {
            for (i, group) in groups.iter().enumerate() {
                series.push(Series {
                    label: group.label.clone().unwrap_or_else(|| "Efficiency".into()),
                    axis: Axis::Primary,
                    color: color(i),
                    marker: Marker::Triangle,
                    points: points(group, |m| m.efficiency),
                });
            }
            if config.ideal_lines {
                reference_lines.push(ReferenceLine {
                    label: "Ideal Efficiency".into(),
                    axis: Axis::Primary,
                    reference: Reference::Constant(1.0),
                });
            }
            y_label = "Efficiency";
        }
    }

    let axis_max = |axis: Axis| -> f64 {
        let values = series
            .iter()
            .filter(|s| s.axis == axis)
            .flat_map(|s| s.points.iter().map(|(_, y)| *y));
        let references = reference_lines
            .iter()
            .filter(|r| r.axis == axis)
            .flat_map(|r| [r.reference.at(first_tick), r.reference.at(last_tick)]);
        values.chain(references).fold(0., f64::max)
    };
    let y_range = config
        .y_range
        .unwrap_or_else(|| auto_range(axis_max(Axis::Primary)));
    let secondary_y_range = secondary_y_label
        .as_ref()
        .map(|_| auto_range(axis_max(Axis::Secondary)));

    Ok(Chart {
        title: config.title.clone(),
        x_label: config.x_label.clone(),
        y_label: y_label.into(),
        secondary_y_label,
        x_ticks,
        x_range,
        y_range,
        secondary_y_range,
        series,
        reference_lines,
        size: config.size,
    })
}

/// Draws lines plus markers of a `Series`, `$draw` being
/// `draw_series` or `draw_secondary_series`.
macro_rules! draw_line_with_markers {
    { $chart:expr, $draw:ident, $series:expr } => {{
        let series: &Series = $series;
        let color = series.color;
        let coords = || series.points.iter().map(|&(x, y)| (f64::from(x), y));
        $chart
            .$draw(LineSeries::new(coords(), color.stroke_width(2)))?
            .label(series.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        match series.marker {
            Marker::Circle => {
                $chart.$draw(coords().map(|c| Circle::new(c, 4, color.filled())))?;
            }
            Marker::Cross => {
                $chart.$draw(coords().map(|c| Cross::new(c, 4, color.stroke_width(2))))?;
            }
            Marker::Triangle => {
                $chart.$draw(coords().map(|c| TriangleMarker::new(c, 5, color.filled())))?;
            }
        }
    }};
}

/// Linear x axis with key points (grid lines and labels) exactly at
/// the measured process counts, instead of at round numbers.
struct ProcessCountCoord {
    range: RangedCoordf64,
    ticks: Vec<f64>,
}

impl Ranged for ProcessCountCoord {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.range.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.range.range()
    }
}

impl ValueFormatter<f64> for ProcessCountCoord {
    fn format(value: &f64) -> String {
        format!("{value:.0}")
    }
}

impl Chart {
    /// Write the chart as SVG to `path` (via a temporary file that is
    /// renamed into place once complete).
    pub fn write_svg(&self, path: &Path) -> Result<()> {
        write_via_tmp_file(path, |path_tmp| {
            self.draw_svg(path_tmp)
                .with_context(|| anyhow!("drawing chart {:?} to {path_tmp:?}", self.title))
        })?;
        info!("wrote chart {:?} to {path:?}", self.title);
        Ok(())
    }

    fn draw_svg(&self, path: &Path) -> Result<()> {
        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        let mut builder = ChartBuilder::on(&root);
        builder
            .caption(&self.title, (FONT, 22).into_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60);
        if self.secondary_y_range.is_some() {
            builder.right_y_label_area_size(60);
        }
        let x_coord = ProcessCountCoord {
            range: (x0..x1).into(),
            ticks: self.x_ticks.iter().map(|&t| f64::from(t)).collect(),
        };
        let chart = builder.build_cartesian_2d(x_coord, y0..y1)?;

        let primary_color = self
            .series
            .iter()
            .find(|s| s.axis == Axis::Primary)
            .map_or(BLACK, |s| s.color);
        let label_style = |color: RGBColor| (FONT, 12).into_font().color(&color);

        let ideal_style = GRAY.mix(0.7).stroke_width(1);
        let reference_coords =
            |reference: Reference| vec![(x0, reference.at(x0)), (x1, reference.at(x1))];

        match (&self.secondary_y_label, self.secondary_y_range) {
            (Some(secondary_y_label), Some((s0, s1))) => {
                let mut chart = chart.set_secondary_coord(x0..x1, s0..s1);
                chart
                    .configure_mesh()
                    .light_line_style(WHITE)
                    .x_desc(self.x_label.as_str())
                    .y_desc(self.y_label.as_str())
                    .y_label_style(label_style(primary_color))
                    .draw()?;
                let secondary_color = self
                    .series
                    .iter()
                    .find(|s| s.axis == Axis::Secondary)
                    .map_or(BLACK, |s| s.color);
                chart
                    .configure_secondary_axes()
                    .y_desc(secondary_y_label.as_str())
                    .label_style(label_style(secondary_color))
                    .draw()?;

                for reference_line in &self.reference_lines {
                    let coords = reference_coords(reference_line.reference);
                    let anno = match reference_line.axis {
                        Axis::Primary => {
                            chart.draw_series(LineSeries::new(coords, ideal_style))?
                        }
                        Axis::Secondary => {
                            chart.draw_secondary_series(LineSeries::new(coords, ideal_style))?
                        }
                    };
                    anno.label(reference_line.label.clone()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], ideal_style)
                    });
                }
                for series in &self.series {
                    match series.axis {
                        Axis::Primary => draw_line_with_markers!(chart, draw_series, series),
                        Axis::Secondary => {
                            draw_line_with_markers!(chart, draw_secondary_series, series)
                        }
                    }
                }
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperLeft)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()?;
            }
            _ => {
                let mut chart = chart;
                chart
                    .configure_mesh()
                    .light_line_style(BLACK.mix(0.05))
                    .x_desc(self.x_label.as_str())
                    .y_desc(self.y_label.as_str())
                    .draw()?;

                for reference_line in &self.reference_lines {
                    chart
                        .draw_series(LineSeries::new(
                            reference_coords(reference_line.reference),
                            ideal_style,
                        ))?
                        .label(reference_line.label.clone())
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], ideal_style)
                        });
                }
                for series in &self.series {
                    draw_line_with_markers!(chart, draw_series, series);
                }
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::LowerLeft)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()?;
            }
        }

        root.present()?;
        Ok(())
    }
}
