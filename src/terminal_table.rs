//! Printing `TableView`s to a terminal in human-readable format (with
//! spaces for padding, and ANSI sequences for formatting), or as
//! tab-separated values.

//! Does not escape anything in the cells; the tables here never
//! contain tabs or newlines.

use std::io::Write;

use anyhow::Result;
use strum_macros::EnumString;
use yansi::{Paint, Style};

use crate::table_view::{title_with_unit, ColumnFormatting, Highlight, TableView};

/// Space between columns in human-readable mode.
const COLUMN_GAP: &str = "  ";

#[derive(Debug, EnumString, PartialEq, Clone, Copy)]
#[strum(serialize_all = "kebab_case")]
pub enum ColorOpt {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, clap::Args)]
pub struct TerminalTableOpts {
    /// Show the table as CSV (with '\t' as separator) instead of
    /// human-readable
    #[clap(long)]
    pub tsv: bool,

    /// Whether to use ANSI codes to format human-readable output on
    /// terminals (auto, always, never)
    #[clap(long, default_value = "auto")]
    pub color: ColorOpt,
}

impl TerminalTableOpts {
    pub fn want_color(&self, detected_terminal: bool) -> bool {
        let Self { tsv, color } = self;
        if *tsv {
            return false;
        }
        match color {
            ColorOpt::Auto => detected_terminal,
            ColorOpt::Always => true,
            ColorOpt::Never => false,
        }
    }
}

fn highlight_style(highlight: Highlight) -> Option<Style> {
    match highlight {
        Highlight::Neutral => None,
        Highlight::Red => Some(Style::new().red()),
        Highlight::Green => Some(Style::new().green()),
    }
}

/// Widths are calculated from the whole table, thus the body is
/// collected before anything is printed.
pub fn write_table(
    table: &dyn TableView,
    tsv_mode: bool,
    color: bool,
    out: &mut impl Write,
) -> Result<()> {
    let header = table.table_view_header();
    let header = (*header).as_ref();
    let titles: Vec<String> = header
        .iter()
        .map(|(label, unit, _)| title_with_unit(label, *unit, " "))
        .collect();
    let rows: Vec<Vec<(String, Highlight)>> = table
        .table_view_body()
        .map(|row| row.iter().map(|(s, h)| (s.to_string(), *h)).collect())
        .collect();

    if tsv_mode {
        writeln!(out, "# {}", table.table_name())?;
        writeln!(out, "{}", titles.join("\t"))?;
        for row in &rows {
            let cells: Vec<&str> = row.iter().map(|(s, _)| s.as_str()).collect();
            writeln!(out, "{}", cells.join("\t"))?;
        }
        return Ok(());
    }

    let mut widths: Vec<usize> = titles.iter().map(|t| t.chars().count()).collect();
    for row in &rows {
        for (width, (s, _)) in widths.iter_mut().zip(row) {
            *width = (*width).max(s.chars().count());
        }
    }

    let write_cell = |out: &mut dyn Write,
                      i: usize,
                      s: &str,
                      style: Option<Style>|
     -> std::io::Result<()> {
        if i > 0 {
            out.write_all(COLUMN_GAP.as_bytes())?;
        }
        let padding = " ".repeat(widths[i].saturating_sub(s.chars().count()));
        let is_last = i + 1 == widths.len();
        let right_align = matches!(header[i].2, ColumnFormatting::Number);
        let s = match style {
            Some(style) if color => s.paint(style).to_string(),
            _ => s.to_string(),
        };
        if right_align {
            write!(out, "{padding}{s}")
        } else if is_last {
            write!(out, "{s}")
        } else {
            write!(out, "{s}{padding}")
        }
    };

    let name = table.table_name();
    if color {
        writeln!(out, "{}", name.bold())?;
    } else {
        writeln!(out, "{name}")?;
    }
    const TITLE_STYLE: Style = Style::new().bold().italic();
    for (i, title) in titles.iter().enumerate() {
        write_cell(out, i, title, Some(TITLE_STYLE))?;
    }
    writeln!(out)?;
    for row in &rows {
        for (i, (s, highlight)) in row.iter().enumerate() {
            write_cell(out, i, s, highlight_style(*highlight))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
