use std::{
    io::{stdout, IsTerminal, Write},
    path::PathBuf,
};

use anyhow::{bail, Result};
use clap::Parser;
use strum::IntoEnumIterator;

use scalability_analyzer::{
    analysis::Analysis,
    chart::MetricSelection,
    config_file::{AnalysisConfig, AnalysisSpec, LoadConfigFile, FILE_EXTENSIONS},
    get_terminal_width::get_terminal_width,
    info,
    metrics::EfficiencyMode,
    metrics_table::metrics_tables,
    preset::Preset,
    sample::Schema,
    terminal_table::{write_table, TerminalTableOpts},
    utillib::logging::{set_log_level, LogLevelOpt},
};

const PROGRAM_NAME: &str = "scalability-plot";

#[derive(clap::Parser, Debug)]
#[clap(next_line_help = true)]
#[clap(set_term_width = get_terminal_width())]
/// Speedup and efficiency of benchmark results measured at varying
/// numbers of cores/processes.
struct Opts {
    #[clap(flatten)]
    log_level: LogLevelOpt,

    /// The subcommand to run. Use `--help` after the sub-command to
    /// get a list of the allowed options there.
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct AnalysisOpts {
    /// Built-in settings for one of the known result file layouts
    /// (run `presets` to get the list)
    #[clap(long)]
    preset: Option<Preset>,

    /// Name of the column holding the number of processes (overrides
    /// the preset; requires --time-field)
    #[clap(long)]
    process_field: Option<String>,

    /// Name of the column holding the execution time in seconds
    #[clap(long)]
    time_field: Option<String>,

    /// Name of the column holding the problem size; one scaling curve
    /// is derived per distinct value
    #[clap(long)]
    group_field: Option<String>,

    /// How efficiency is calculated: strong, weak-raw (the speedup
    /// itself), weak-per-process (speedup divided by the number of
    /// processes)
    #[clap(long)]
    mode: Option<EfficiencyMode>,

    /// What to plot: speedup-and-efficiency (single curve only),
    /// speedup, efficiency
    #[clap(long)]
    metrics: Option<MetricSelection>,

    /// Chart title
    #[clap(long)]
    title: Option<String>,

    /// Label of the x axis
    #[clap(long)]
    x_label: Option<String>,

    /// Do not draw the ideal speedup/efficiency reference lines
    #[clap(long)]
    no_ideal_lines: bool,

    /// Comma-separated result file with a header row
    input: PathBuf,
}

impl AnalysisOpts {
    fn into_spec(self, svg: Option<PathBuf>, excel: Option<PathBuf>) -> Result<AnalysisSpec> {
        let AnalysisOpts {
            preset,
            process_field,
            time_field,
            group_field,
            mode,
            metrics,
            title,
            x_label,
            no_ideal_lines,
            input,
        } = self;
        let schema = match (process_field, time_field) {
            (Some(process_field), Some(time_field)) => Some(Schema::new(
                &process_field,
                &time_field,
                group_field.as_deref(),
            )),
            (None, None) => {
                if let Some(group_field) = group_field {
                    let Some(preset) = preset else {
                        bail!("--group-field requires --preset or --process-field and --time-field")
                    };
                    Some(Schema {
                        group_field: Some(group_field),
                        ..preset.schema()
                    })
                } else {
                    None
                }
            }
            _ => bail!("--process-field and --time-field must be given together"),
        };
        Ok(AnalysisSpec {
            input,
            preset,
            schema,
            mode,
            metrics,
            title,
            x_label,
            y_range: None,
            ideal_lines: no_ideal_lines.then_some(false),
            svg,
            excel,
        })
    }
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print version
    Version,

    /// Show the built-in presets with the column names they expect.
    Presets,

    /// Draw speedup and/or efficiency of a result file as an SVG
    /// chart.
    Plot {
        #[clap(flatten)]
        analysis_opts: AnalysisOpts,

        /// Path to write the SVG chart to
        #[clap(long)]
        svg: PathBuf,

        /// Also write the derived values to this Excel file
        #[clap(long)]
        excel: Option<PathBuf>,
    },

    /// Show the derived values of a result file as a table.
    Table {
        #[clap(flatten)]
        analysis_opts: AnalysisOpts,

        #[clap(flatten)]
        terminal_table_opts: TerminalTableOpts,

        /// Also write the tables to this Excel file
        #[clap(long)]
        excel: Option<PathBuf>,
    },

    /// Run all analyses listed in a config file.
    Run {
        /// Path to the config file (default: the path
        /// `~/.scalability-plot.*` where the `*` is the suffix for
        /// one of the supported config file formats: json5, json,
        /// yml, yaml, hcl)
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let Opts { log_level, command } = Opts::parse();

    set_log_level(log_level.into());

    match command {
        Command::Version => println!("{PROGRAM_NAME} version {}", env!("CARGO_PKG_VERSION")),

        Command::Presets => {
            let mut out = stdout().lock();
            for preset in Preset::iter() {
                let Schema {
                    process_count_field,
                    time_field,
                    group_field,
                } = preset.schema();
                write!(
                    out,
                    "{preset}: columns {process_count_field:?}, {time_field:?}"
                )?;
                if let Some(group_field) = group_field {
                    write!(out, ", grouped by {group_field:?}")?;
                }
                writeln!(
                    out,
                    "; {} efficiency; {} chart {:?}",
                    preset.efficiency_mode(),
                    preset.metric_selection(),
                    preset.chart_config().title
                )?;
            }
            let extensions: Vec<&str> = FILE_EXTENSIONS.iter().map(|(e, _)| *e).collect();
            writeln!(
                out,
                "\nConfig files for `run` are supported with these extensions: {}",
                extensions.join(", ")
            )?;
        }

        Command::Plot {
            analysis_opts,
            svg,
            excel,
        } => {
            let analysis = Analysis::try_from(analysis_opts.into_spec(Some(svg), excel)?)?;
            analysis.run()?;
        }

        Command::Table {
            analysis_opts,
            terminal_table_opts,
            excel,
        } => {
            let analysis = Analysis::try_from(analysis_opts.into_spec(None, excel)?)?;
            let groups = analysis.run()?;
            let out = stdout();
            let color = terminal_table_opts.want_color(out.is_terminal());
            let mut out = out.lock();
            for (i, table) in metrics_tables(&groups).iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                write_table(table, terminal_table_opts.tsv, color, &mut out)?;
            }
            out.flush()?;
        }

        Command::Run { config } => {
            let AnalysisConfig { analyses } = AnalysisConfig::load_config(config.as_ref())?;
            if analyses.is_empty() {
                bail!("the config file does not list any analyses");
            }
            let num_analyses = analyses.len();
            for spec in analyses {
                let analysis = Analysis::try_from(spec)?;
                info!("running analysis of {:?}", analysis.input);
                analysis.run()?;
            }
            info!("finished {num_analyses} analyses");
        }
    }

    Ok(())
}
