//! Operator-facing progress reporting.
//!
//! The pipeline never prints directly; it hands [`LogEntry`] values to an
//! injected [`Reporter`]. The CLI uses [`ConsoleReporter`], tests use
//! [`MemoryReporter`] or [`NullReporter`].

use std::sync::Mutex;

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Indentation level (for nested logs)
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Sink for progress and diagnostic entries.
pub trait Reporter: Send + Sync {
    /// Receive one entry
    fn log(&self, entry: LogEntry);
}

/// Writes entries to stderr with level glyphs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn log(&self, entry: LogEntry) {
        let prefix = match entry.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(entry.indent as usize);
        eprintln!("{}{} {}", indent, prefix, entry.message);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn log(&self, _entry: LogEntry) {}
}

/// Keeps entries in memory for inspection.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Whether any entry at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn log(&self, entry: LogEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

// Free helpers for `&dyn Reporter`, where the sized default methods are unavailable.

pub fn log_info(reporter: &dyn Reporter, msg: impl Into<String>) {
    reporter.log(LogEntry::info(msg));
}

pub fn log_success(reporter: &dyn Reporter, msg: impl Into<String>) {
    reporter.log(LogEntry::success(msg));
}

pub fn log_warning(reporter: &dyn Reporter, msg: impl Into<String>) {
    reporter.log(LogEntry::warning(msg));
}

pub fn log_error(reporter: &dyn Reporter, msg: impl Into<String>) {
    reporter.log(LogEntry::error(msg));
}

pub fn log_info_indent(reporter: &dyn Reporter, msg: impl Into<String>, indent: u8) {
    reporter.log(LogEntry::info(msg).with_indent(indent));
}

pub fn log_warning_indent(reporter: &dyn Reporter, msg: impl Into<String>, indent: u8) {
    reporter.log(LogEntry::warning(msg).with_indent(indent));
}
