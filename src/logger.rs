//! Colored, leveled terminal logging.
//!
//! Worker threads log concurrently, so a single mutex serializes writes
//! to keep lines from interleaving mid-message.

use std::sync::Mutex;

use colored::Colorize;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

static WRITE_LOCK: Mutex<()> = Mutex::new(());

/// Write one log line. Info goes to stdout, warnings and errors to stderr.
pub fn log(level: Level, message: std::fmt::Arguments<'_>) {
    let _guard = WRITE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    match level {
        Level::Info => println!("{} {}", "info:".green().bold(), message),
        Level::Warn => eprintln!("{} {}", "warning:".yellow().bold(), message),
        Level::Error => eprintln!("{} {}", "error:".red().bold(), message),
    }
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logger::log($crate::logger::Level::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logger::log($crate::logger::Level::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logger::log($crate::logger::Level::Error, format_args!($($arg)*))
    };
}
