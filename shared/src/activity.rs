// User-visible activity log. Every entry is mirrored to `tracing`.

use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "OK",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    /// `[2024-05-01 12:30:00] [OK] message`
    pub fn rendered_line(&self) -> String {
        format!(
            "[{}] [{}] {}",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.level.as_str(),
            self.message
        )
    }
}

#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
    /// Set by warnings and errors so a UI can reveal the log.
    needs_attention: bool,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info | LogLevel::Success => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
        if matches!(level, LogLevel::Warning | LogLevel::Error) {
            self.needs_attention = true;
        }
        self.entries.push(LogEntry {
            at: Local::now(),
            level,
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn needs_attention(&self) -> bool {
        self.needs_attention
    }

    pub fn acknowledge(&mut self) {
        self.needs_attention = false;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.needs_attention = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rendered_line_format() {
        let entry = LogEntry {
            at: Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            level: LogLevel::Success,
            message: "done".into(),
        };
        assert_eq!(entry.rendered_line(), "[2024-05-01 12:30:00] [OK] done");
    }

    #[test]
    fn warnings_raise_attention() {
        let mut log = ActivityLog::new();
        log.push(LogLevel::Info, "hello");
        assert!(!log.needs_attention());

        log.push(LogLevel::Warning, "careful");
        assert!(log.needs_attention());
        assert_eq!(log.entries().len(), 2);

        log.acknowledge();
        assert!(!log.needs_attention());

        log.push(LogLevel::Error, "boom");
        log.clear();
        assert!(log.entries().is_empty());
        assert!(!log.needs_attention());
    }
}
