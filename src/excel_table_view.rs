//! Writing `TableView`s to an Excel workbook, one worksheet per
//! table.

use std::{collections::HashSet, path::Path};

use anyhow::{anyhow, Context, Result};
use rust_xlsxwriter::{workbook::Workbook, Color, Format, FormatAlign};

use crate::{
    info,
    table_view::{title_with_unit, ColumnFormatting, Highlight, TableView},
    utillib::tmp_file::write_via_tmp_file,
};

/// How many characters to add to the automatic column width
/// calculation to try to avoid setting widths too small to accomodate
/// the strings in the cells.
const WIDTH_SAFETY_MARGIN_CHARS: f64 = 2.0;

/// Row 0 holds the table name, the column titles follow below.
const TITLE_ROW: u32 = 1;

/// Excel's default row height for a single line of text.
const LINE_HEIGHT: f64 = 15.0;

fn column_number(i: usize) -> Result<u16> {
    u16::try_from(i).with_context(|| anyhow!("too many columns for excel"))
}

/// Excel's limit on worksheet name lengths, in characters.
const MAX_WORKSHEET_NAME_CHARS: usize = 31;

/// A valid worksheet name for `name` that is not in `used` yet
/// (compared case-insensitively, like Excel does), and records it
/// there. The full name is shown in the sheet itself.
fn worksheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    let base = if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("history") {
        "table"
    } else {
        cleaned
    };
    let truncated = |s: &str, max: usize| -> String { s.chars().take(max).collect() };

    let mut candidate = truncated(base, MAX_WORKSHEET_NAME_CHARS);
    let mut i = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({i})");
        candidate = format!(
            "{}{suffix}",
            truncated(base, MAX_WORKSHEET_NAME_CHARS - suffix.chars().count())
        );
        i += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}

/// Width of the widest line in `s`, in characters.
fn text_width(s: &str) -> usize {
    s.split('\n').map(|s| s.chars().count()).max().unwrap_or(0)
}

pub fn excel_file_write<'t>(
    tables: impl IntoIterator<Item = &'t (dyn TableView + 't)>,
    file: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let mut used_names = HashSet::new();

    for table in tables {
        let table_name = table.table_name();
        let sheet_name = worksheet_name(&table_name, &mut used_names);
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name)
            .with_context(|| anyhow!("setting worksheet name {sheet_name:?}"))?;

        let name_format = Format::new().set_bold().set_font_size(14);
        worksheet
            .write_with_format(0, 0, &*table_name, &name_format)
            .with_context(|| anyhow!("write table name {table_name:?}"))?;

        let header = table.table_view_header();
        let header = (*header).as_ref();
        let mut column_widths: Vec<usize> = header.iter().map(|_| 1).collect();

        let title_format = Format::new().set_bold();
        let mut title_lines = 1;
        for (i, (label, unit, _)) in header.iter().enumerate() {
            let title = title_with_unit(label, *unit, "\n");
            column_widths[i] = column_widths[i].max(text_width(&title));
            title_lines = title_lines.max(title.split('\n').count());
            worksheet
                .write_with_format(TITLE_ROW, column_number(i)?, title.as_str(), &title_format)
                .with_context(|| anyhow!("write title value {title:?}"))?;
        }
        worksheet
            .set_row_height(TITLE_ROW, title_lines as f64 * LINE_HEIGHT)
            .with_context(|| anyhow!("setting height of the title row"))?;

        for (rownum, row) in (TITLE_ROW + 1..).zip(table.table_view_body()) {
            for (i, (val, highlight)) in row.iter().enumerate() {
                let mut format = Format::new();
                if header[i].2 == ColumnFormatting::Number {
                    format = format.set_align(FormatAlign::Right);
                }
                match highlight {
                    Highlight::Neutral => (),
                    Highlight::Red => format = format.set_font_color(Color::Red),
                    Highlight::Green => format = format.set_background_color(Color::Green),
                }
                column_widths[i] = column_widths[i].max(text_width(val));
                worksheet
                    .write_with_format(rownum, column_number(i)?, &**val, &format)
                    .with_context(|| anyhow!("write value {val:?}"))?;
            }
        }

        // Own character counting instead of `worksheet.autofit()`,
        // which does badly on numbers in LibreOffice
        for (i, (num_chars, (_, _, column_formatting))) in
            column_widths.iter().zip(header).enumerate()
        {
            let colnum = column_number(i)?;
            let width = match column_formatting {
                ColumnFormatting::String {
                    width_chars: Some(width_chars),
                } => *width_chars,
                _ => *num_chars as f64 + WIDTH_SAFETY_MARGIN_CHARS,
            };
            worksheet
                .set_column_width(colnum, width)
                .with_context(|| anyhow!("setting column width on column {colnum} to {width}"))?;
        }
    }

    write_via_tmp_file(file, |file_tmp| {
        workbook
            .save(file_tmp)
            .with_context(|| anyhow!("saving to file {file_tmp:?}"))
    })?;
    info!("wrote Excel file {file:?}");

    Ok(())
}
