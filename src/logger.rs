//! Centralized logging system for wgmon.
//!
//! Provides thread-safe logging with multiple levels and categories. Entries
//! are kept in a bounded in-memory buffer rendered by the TUI event log, and
//! can optionally be echoed to stderr for headless runs.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::constants;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose debugging information
    Debug = 0,
    /// Informational messages about normal operation
    Info = 1,
    /// Warning messages about potential issues
    Warning = 2,
    /// Error messages about failures
    Error = 3,
}

impl LogLevel {
    /// Get the prefix string for this log level
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub category: String,
    pub message: String,
}

impl LogEntry {
    /// Format the log entry as a structured line:
    /// `[HH:MM:SS] [LEVEL] CATEGORY: message`
    pub fn format(&self) -> String {
        let time_str = crate::utils::format_system_time_local(self.timestamp);
        format!(
            "[{}] [{}] {}: {}",
            time_str,
            self.level.prefix(),
            self.category,
            self.message
        )
    }
}

struct Logger {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
    min_level: LogLevel,
    echo_stderr: bool,
}

impl Logger {
    fn new() -> Self {
        let max = constants::DEFAULT_MAX_LOG_ENTRIES;
        Self {
            entries: VecDeque::with_capacity(max),
            max_entries: max,
            min_level: LogLevel::Info,
            echo_stderr: false,
        }
    }

    fn log(&mut self, level: LogLevel, category: &str, message: String) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            timestamp: SystemTime::now(),
            level,
            category: category.to_string(),
            message,
        };

        if self.echo_stderr {
            let line = format!("{}\n", entry.format());
            let _ = std::io::stderr().lock().write_all(line.as_bytes());
        }

        self.entries.push_back(entry);

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    fn set_max_entries(&mut self, max: usize) {
        self.max_entries = max;
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }
}

/// Global logger instance (thread-safe)
static LOGGER: std::sync::OnceLock<Arc<Mutex<Logger>>> = std::sync::OnceLock::new();

fn get_logger() -> &'static Arc<Mutex<Logger>> {
    LOGGER.get_or_init(|| Arc::new(Mutex::new(Logger::new())))
}

/// Log a message with the specified level and category
pub fn log(level: LogLevel, category: &str, message: impl Into<String>) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.log(level, category, message.into());
    }
}

/// Get all log entries (for display in TUI)
pub fn get_logs() -> Vec<LogEntry> {
    get_logger()
        .lock()
        .map(|logger| logger.entries.iter().cloned().collect())
        .unwrap_or_default()
}

/// Configure the logger from user settings.
///
/// Call once at startup after loading `AppConfig`.
/// - `log_level`: one of `"debug"`, `"info"`, `"warning"`, `"error"` (case-insensitive).
/// - `max_entries`: maximum number of log entries to keep in memory.
pub fn configure(log_level: &str, max_entries: usize) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.min_level = parse_log_level(log_level);
        logger.set_max_entries(max_entries);
    }
}

/// Mirror every accepted entry to stderr.
///
/// Used by the headless subcommands, where there is no event log panel.
pub fn set_echo_stderr(enabled: bool) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.echo_stderr = enabled;
    }
}

/// Set the minimum log level (for filtering).
#[cfg(test)]
pub fn set_min_level(level: LogLevel) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.min_level = level;
    }
}

/// Parse a log level string (case-insensitive) into a `LogLevel`.
///
/// Falls back to `LogLevel::Info` for unrecognised values.
#[must_use]
pub fn parse_log_level(s: &str) -> LogLevel {
    match s.trim().to_ascii_lowercase().as_str() {
        "debug" => LogLevel::Debug,
        "warning" | "warn" => LogLevel::Warning,
        "error" | "err" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

/// Clear all logs
#[cfg(test)]
pub fn clear_logs() {
    if let Ok(mut logger) = get_logger().lock() {
        logger.entries.clear();
    }
}

#[macro_export]
macro_rules! log_debug {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Debug, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Info, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Error, $category, format!($($arg)*))
    };
}

/// Serializes tests that touch the global logger.
#[cfg(test)]
pub static TEST_MUTEX: Mutex<()> = Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    fn lock() -> std::sync::MutexGuard<'static, ()> {
        TEST_MUTEX.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Other tests log concurrently, so assertions look at one category only.
    fn entries_for(category: &str) -> Vec<LogEntry> {
        get_logs()
            .into_iter()
            .filter(|e| e.category == category)
            .collect()
    }

    #[test]
    fn test_logging() {
        let _lock = lock();
        set_min_level(LogLevel::Info);
        clear_logs();

        log(LogLevel::Info, "TEST", "Test message");

        let logs = entries_for("TEST");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].category, "TEST");
        assert_eq!(logs[0].message, "Test message");
    }

    #[test]
    fn test_log_level_filtering() {
        let _lock = lock();
        clear_logs();
        set_min_level(LogLevel::Warning);

        log(LogLevel::Debug, "LEVEL", "Debug");
        log(LogLevel::Info, "LEVEL", "Info");
        log(LogLevel::Warning, "LEVEL", "Warning");
        log(LogLevel::Error, "LEVEL", "Error");

        let logs = entries_for("LEVEL");
        assert_eq!(logs.len(), 2);

        set_min_level(LogLevel::Info);
    }

    #[test]
    fn test_configure_trims_existing_entries() {
        let _lock = lock();
        configure("debug", constants::DEFAULT_MAX_LOG_ENTRIES);
        clear_logs();

        for i in 0..20 {
            log(LogLevel::Info, "TRIM", format!("Message {i}"));
        }
        configure("info", 5);

        let logs = get_logs();
        assert!(logs.len() <= 5);
        assert!(logs.iter().all(|e| e.message != "Message 0"));

        configure("info", constants::DEFAULT_MAX_LOG_ENTRIES);
    }

    #[test]
    fn test_macros_format_arguments() {
        let _lock = lock();
        set_min_level(LogLevel::Info);
        clear_logs();

        crate::log_info!("MACRO", "Running: {} {}", "wg", "show");
        crate::log_debug!("MACRO", "hidden");

        let logs = entries_for("MACRO");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "Running: wg show");
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), LogLevel::Debug);
        assert_eq!(parse_log_level(" warn "), LogLevel::Warning);
        assert_eq!(parse_log_level("err"), LogLevel::Error);
        assert_eq!(parse_log_level("verbose"), LogLevel::Info);
    }

    #[test]
    fn test_entry_format() {
        let entry = LogEntry {
            timestamp: SystemTime::now(),
            level: LogLevel::Error,
            category: "POLL".to_string(),
            message: "boom".to_string(),
        };
        let line = entry.format();
        assert!(line.ends_with("[ERROR] POLL: boom"));
        assert!(line.starts_with('['));
    }
}
