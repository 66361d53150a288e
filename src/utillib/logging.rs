use std::sync::atomic::{AtomicU8, Ordering};

// Fields stay private so that the level is only obtained via `From`.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct LogLevelOpt {
    /// Show what is being done (files read and written, groups
    /// found)
    #[clap(short, long)]
    verbose: bool,

    /// Show information that helps debug this program, like the
    /// derived values per sample (implies `--verbose`)
    #[clap(short, long)]
    debug: bool,
}

impl From<LogLevelOpt> for LogLevel {
    fn from(value: LogLevelOpt) -> Self {
        let LogLevelOpt { verbose, debug } = value;
        if debug {
            LogLevel::Debug
        } else if verbose {
            LogLevel::Info
        } else {
            LogLevel::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Do not log anything
    None = 0,
    /// Tell the user what is going on
    Info = 1,
    /// Highest amount of log statements, for debugging this program
    Debug = 2,
}

impl LogLevel {
    fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(LogLevel::None),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

static LOGLEVEL: AtomicU8 = AtomicU8::new(LogLevel::None as u8);

pub fn set_log_level(val: LogLevel) {
    LOGLEVEL.store(val as u8, Ordering::Relaxed);
}

#[inline]
pub fn log_level() -> LogLevel {
    let level = LOGLEVEL.load(Ordering::Relaxed);
    LogLevel::from_level(level).expect("only valid levels are ever stored")
}

#[macro_export]
macro_rules! info {
    { $($arg:tt)* } => {
        if $crate::utillib::logging::log_level() >= $crate::utillib::logging::LogLevel::Info {
            eprintln!($($arg)*);
        }
    }
}

#[macro_export]
macro_rules! debug {
    { $($arg:tt)* } => {
        if $crate::utillib::logging::log_level() >= $crate::utillib::logging::LogLevel::Debug {
            eprintln!($($arg)*);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_levels_roundtrip() {
        for level in [LogLevel::None, LogLevel::Info, LogLevel::Debug] {
            assert_eq!(LogLevel::from_level(level as u8), Some(level));
        }
        assert_eq!(LogLevel::from_level(3), None);
    }

    #[test]
    fn t_opt_to_level() {
        let level = |verbose, debug| LogLevel::from(LogLevelOpt { verbose, debug });
        assert_eq!(level(false, false), LogLevel::None);
        assert_eq!(level(true, false), LogLevel::Info);
        assert_eq!(level(false, true), LogLevel::Debug);
        assert_eq!(level(true, true), LogLevel::Debug);
        assert!(LogLevel::Debug > LogLevel::Info);
    }
}
