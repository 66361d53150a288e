//! Speedup and efficiency analysis of benchmark results measured at
//! varying numbers of cores/processes.

pub mod analysis;
pub mod chart;
pub mod config_file;
pub mod error;
pub mod excel_table_view;
pub mod get_terminal_width;
pub mod grouping;
pub mod metrics;
pub mod metrics_table;
pub mod preset;
pub mod sample;
pub mod table_view;
pub mod terminal_table;
pub mod utillib;
