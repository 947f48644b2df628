use chrono::{DateTime, Local};
use serde_json::Value;

use crate::log_persistence::PersistentLogWorker;

const MAX_ENTRIES: usize = 500;

/// Severity shown next to a text entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Structured log entry supporting backend responses and plain text.
#[derive(Debug, Clone)]
pub enum LogEntry {
    /// A backend response worth keeping: status, raw body and parsed JSON.
    Api { status: u16, raw: String, json: Option<Value> },
    Text { level: LogLevel, msg: String },
}

impl LogEntry {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Text {
            level: LogLevel::Info,
            msg: msg.into(),
        }
    }

    pub fn warn(msg: impl Into<String>) -> Self {
        Self::Text {
            level: LogLevel::Warn,
            msg: msg.into(),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Text {
            level: LogLevel::Error,
            msg: msg.into(),
        }
    }

    /// A backend answer; the body is parsed as JSON when possible.
    pub fn api(status: u16, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let json = serde_json::from_str(&raw).ok();
        Self::Api { status, raw, json }
    }

    pub fn level(&self) -> LogLevel {
        match self {
            Self::Text { level, .. } => *level,
            Self::Api { status, .. } if *status >= 500 => LogLevel::Error,
            Self::Api { .. } => LogLevel::Warn,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub entry: LogEntry,
}

/// In-memory tail of log entries, mirrored to the persistent writer.
#[derive(Debug, Default)]
pub struct LogsState {
    lines: Vec<LogLine>,
    persistence: Option<PersistentLogWorker>,
}

impl LogsState {
    pub fn with_persistence(persistence: Option<PersistentLogWorker>) -> Self {
        Self {
            lines: Vec::new(),
            persistence,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        let line = LogLine { at: Local::now(), entry };
        if let Some(worker) = &self.persistence {
            match worker.enqueue(&line) {
                Ok(true) => {}
                Ok(false) => tracing::debug!("persistent log queue full; dropping entry"),
                Err(error) => tracing::warn!(error = %error, "persistent log writer unavailable"),
            }
        }
        self.lines.push(line);
        if self.lines.len() > MAX_ENTRIES {
            let overflow = self.lines.len() - MAX_ENTRIES;
            self.lines.drain(..overflow);
        }
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_a_bounded_tail() {
        let mut logs = LogsState::default();
        for index in 0..(MAX_ENTRIES + 10) {
            logs.push(LogEntry::info(format!("entry {index}")));
        }
        assert_eq!(logs.lines().len(), MAX_ENTRIES);
        assert!(matches!(&logs.lines()[0].entry, LogEntry::Text { msg, .. } if msg == "entry 10"));
    }

    #[test]
    fn api_entries_parse_json_bodies() {
        let entry = LogEntry::api(400, r#"{"error":"Qty is required"}"#);
        assert!(matches!(&entry, LogEntry::Api { json: Some(_), .. }));
        assert_eq!(entry.level(), LogLevel::Warn);
        assert_eq!(LogEntry::api(502, "bad gateway").level(), LogLevel::Error);
    }
}
