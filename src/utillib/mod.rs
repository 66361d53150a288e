//! Various utilities

pub mod logging;
pub mod tmp_file;
