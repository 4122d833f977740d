//! Structured logging for the analysis pipeline.
//!
//! The analyzer records one entry per estimator decision into an
//! in-process collector; callers inspect it after the run. Nothing here
//! touches global state or performs I/O.

use std::fmt;

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to record
    pub level: LogLevel,

    /// Enable logging for specific subsystems
    pub enable_estimation: bool,
    pub enable_demodulation: bool,
    pub enable_awre: bool,

    /// Maximum number of log entries to keep
    pub max_entries: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            enable_estimation: true,
            enable_demodulation: true,
            enable_awre: true,
            max_entries: 1000,
        }
    }
}

impl LogConfig {
    /// Verbose logging for debugging
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            max_entries: 5000,
            ..Self::default()
        }
    }

    /// Disable all logging
    pub fn disabled() -> Self {
        Self {
            level: LogLevel::Error,
            enable_estimation: false,
            enable_demodulation: false,
            enable_awre: false,
            max_entries: 0,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub subsystem: &'static str,
    pub message: String,
}

/// Logger that collects structured log entries
#[derive(Debug, Clone, Default)]
pub struct AnalysisLogger {
    config: LogConfig,
    entries: Vec<LogEntry>,
}

impl AnalysisLogger {
    pub fn new(config: LogConfig) -> Self {
        let capacity = config.max_entries.min(1000);
        Self {
            config,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Log a message at the specified level
    pub fn log(&mut self, level: LogLevel, subsystem: &'static str, message: impl fmt::Display) {
        if level < self.config.level {
            return;
        }

        let enabled = match subsystem {
            "NOISE" | "SEGMENT" | "CLASSIFY" | "SYMBOL" | "CENTER" => self.config.enable_estimation,
            "DEMOD" => self.config.enable_demodulation,
            "AWRE" => self.config.enable_awre,
            _ => true,
        };
        if !enabled {
            return;
        }

        if self.config.max_entries > 0 {
            if self.entries.len() >= self.config.max_entries {
                self.entries.remove(0);
            }
            self.entries.push(LogEntry {
                level,
                subsystem,
                message: message.to_string(),
            });
        }
    }

    pub fn debug(&mut self, subsystem: &'static str, message: impl fmt::Display) {
        self.log(LogLevel::Debug, subsystem, message);
    }

    pub fn info(&mut self, subsystem: &'static str, message: impl fmt::Display) {
        self.log(LogLevel::Info, subsystem, message);
    }

    pub fn warn(&mut self, subsystem: &'static str, message: impl fmt::Display) {
        self.log(LogLevel::Warn, subsystem, message);
    }

    /// Get all log entries
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Get entries for a specific subsystem
    pub fn entries_for_subsystem(&self, subsystem: &str) -> Vec<&LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.subsystem == subsystem)
            .collect()
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Display for AnalysisLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entries {
            writeln!(f, "[{}] {}: {}", e.level, e.subsystem, e.message)?;
        }
        Ok(())
    }
}
