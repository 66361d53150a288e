//! A representation of tables (and individual rows) as title row and
//! body rows of strings and formatting instructions, independent of
//! the output format (terminal or Excel).

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Labels, e.g. the problem size
    None,
    /// Ratios like speedup and efficiency
    DimensionLess,
    /// Integers, e.g. process counts
    Count,
    /// A physical unit, e.g. "s"
    Named(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// No special formatting
    Neutral,
    /// "Bad"
    Red,
    /// "Good"
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnFormatting {
    /// Values are numbers: right-adjusted, and auto-width
    Number,
    /// Values are strings, left-adjusted
    String {
        /// In Excel widths. None == automatic.
        width_chars: Option<f64>,
    },
}

pub type ColumnHeader = (Cow<'static, str>, Unit, ColumnFormatting);

pub trait TableViewRow<Context> {
    /// Column names, units and formatting. Must be available in the
    /// absence of rows, hence takes a context instead of `self`.
    fn table_view_header(ctx: Context) -> Box<dyn AsRef<[ColumnHeader]>>;

    /// Append the cells of this row to `out`, matching the columns
    /// from `table_view_header`. Do *not* clear `out`!
    fn table_view_row(&self, out: &mut Vec<(Cow<str>, Highlight)>);
}

/// A full table. dyn compatible.
pub trait TableView {
    fn table_name(&self) -> Cow<str>;

    fn table_view_header(&self) -> Box<dyn AsRef<[ColumnHeader]>>;

    fn table_view_body<'s>(
        &'s self,
    ) -> Box<dyn Iterator<Item = Cow<'s, [(Cow<'s, str>, Highlight)]>> + 's>;
}

/// Title with the unit appended on a separate line, if any.
pub fn title_with_unit(label: &str, unit: Unit, separator: &str) -> String {
    match unit {
        Unit::None | Unit::DimensionLess => label.to_string(),
        Unit::Count => format!("{label}{separator}(count)"),
        Unit::Named(unit) => format!("{label}{separator}({unit})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_title_with_unit() {
        assert_eq!(title_with_unit("time", Unit::Named("s"), "\n"), "time\n(s)");
        assert_eq!(title_with_unit("procs", Unit::Count, " "), "procs (count)");
        assert_eq!(title_with_unit("speedup", Unit::DimensionLess, " "), "speedup");
    }
}
