//! Persistent log writer for TUI log entries.
//!
//! Every line shown in the log panel is also appended, redacted, to a JSONL
//! file by a background thread. The file rotates to `<path>.1`, `<path>.2`...
//! once it grows past the size limit.

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError, sync_channel};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;
use chrono::SecondsFormat;
use flowdeck_util::{redact_json, redact_sensitive};
use serde_json::{Value, json};

use crate::ui::components::logs::state::{LogEntry, LogLine};

/// Overrides the log file location.
pub const TUI_LOG_PATH_ENV: &str = "FLOWDECK_TUI_LOG_PATH";
/// Overrides the size in bytes at which the file rotates.
pub const TUI_LOG_MAX_BYTES_ENV: &str = "FLOWDECK_TUI_LOG_MAX_BYTES";
/// Overrides how many rotated files are kept.
pub const TUI_LOG_MAX_FILES_ENV: &str = "FLOWDECK_TUI_LOG_MAX_FILES";

const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_MAX_FILES: usize = 3;
const QUEUE_CAPACITY: usize = 1024;
const IDLE_FLUSH: Duration = Duration::from_millis(250);

/// Where log lines go and when the file rotates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentLogConfig {
    pub path: PathBuf,
    pub max_bytes: u64,
    pub max_files: usize,
}

impl PersistentLogConfig {
    /// Explicit location and limits; a zero `max_bytes` rotates on every line.
    pub fn new(path: PathBuf, max_bytes: u64, max_files: usize) -> Self {
        Self {
            path,
            max_bytes: max_bytes.max(1),
            max_files,
        }
    }

    fn from_environment() -> Self {
        let path = env::var_os(TUI_LOG_PATH_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_log_path);
        let max_bytes = env_number::<u64>(TUI_LOG_MAX_BYTES_ENV).filter(|value| *value > 0);
        let max_files = env_number::<usize>(TUI_LOG_MAX_FILES_ENV);
        Self::new(path, max_bytes.unwrap_or(DEFAULT_MAX_BYTES), max_files.unwrap_or(DEFAULT_MAX_FILES))
    }
}

fn default_log_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flowdeck")
        .join("logs")
        .join("tui.jsonl")
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}

/// Handle to the writer thread. Dropping it drains the queue and joins.
#[derive(Debug)]
pub struct PersistentLogWorker {
    sender: Option<SyncSender<LogLine>>,
    thread: Option<JoinHandle<()>>,
}

impl PersistentLogWorker {
    pub fn from_environment() -> anyhow::Result<Self> {
        Self::start(PersistentLogConfig::from_environment())
    }

    pub fn start(config: PersistentLogConfig) -> anyhow::Result<Self> {
        let file = LogFile::open(config)?;
        let (sender, receiver) = sync_channel(QUEUE_CAPACITY);
        let thread = std::thread::Builder::new()
            .name("flowdeck-tui-log-writer".to_string())
            .spawn(move || write_until_closed(file, receiver))
            .context("failed to spawn log writer thread")?;
        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Queues a line without blocking. `Ok(false)` means the queue was full
    /// and the line was dropped.
    pub fn enqueue(&self, line: &LogLine) -> anyhow::Result<bool> {
        let Some(sender) = &self.sender else {
            anyhow::bail!("log writer already stopped");
        };
        match sender.try_send(line.clone()) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => anyhow::bail!("log writer thread exited"),
        }
    }
}

impl Drop for PersistentLogWorker {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn write_until_closed(mut file: LogFile, receiver: Receiver<LogLine>) {
    loop {
        match receiver.recv_timeout(IDLE_FLUSH) {
            Ok(line) => {
                if let Err(error) = file.append(&line) {
                    tracing::warn!(error = %error, path = %file.config.path.display(), "failed to persist log line");
                }
            }
            Err(RecvTimeoutError::Timeout) => file.flush(),
            Err(RecvTimeoutError::Disconnected) => {
                file.flush();
                return;
            }
        }
    }
}

/// JSON record written for one log line, with secrets redacted.
fn record(line: &LogLine) -> Value {
    let timestamp = line.at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let level = line.entry.level().as_str();
    match &line.entry {
        LogEntry::Text { msg, .. } => json!({
            "timestamp": timestamp,
            "level": level,
            "source": "tui",
            "message": redact_sensitive(msg),
        }),
        LogEntry::Api { status, raw, json } => json!({
            "timestamp": timestamp,
            "level": level,
            "source": "backend",
            "status": status,
            "message": redact_sensitive(raw),
            "payload": json.as_ref().map(redact_json),
        }),
    }
}

#[derive(Debug)]
struct LogFile {
    config: PersistentLogConfig,
    writer: BufWriter<File>,
    written: u64,
    dirty: bool,
}

impl LogFile {
    fn open(config: PersistentLogConfig) -> anyhow::Result<Self> {
        if let Some(parent) = config.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = open_append(&config.path)?;
        let written = file.metadata().map(|metadata| metadata.len()).unwrap_or_default();
        Ok(Self {
            config,
            writer: BufWriter::new(file),
            written,
            dirty: false,
        })
    }

    fn append(&mut self, line: &LogLine) -> anyhow::Result<()> {
        if self.written >= self.config.max_bytes {
            self.rotate()?;
        }
        let mut bytes = serde_json::to_vec(&record(line))?;
        bytes.push(b'\n');
        self.writer.write_all(&bytes)?;
        self.written += bytes.len() as u64;
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        if let Err(error) = self.writer.flush() {
            tracing::warn!(error = %error, path = %self.config.path.display(), "failed to flush log file");
        }
        self.dirty = false;
    }

    fn rotate(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        shift_rotated_files(&self.config.path, self.config.max_files)?;
        self.writer = BufWriter::new(open_append(&self.config.path)?);
        self.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))
}

/// Moves `path` to `path.1`, `path.1` to `path.2` and so on, dropping
/// whatever falls past `keep`. With `keep == 0` the file is just removed.
fn shift_rotated_files(path: &Path, keep: usize) -> std::io::Result<()> {
    if keep == 0 {
        return match fs::remove_file(path) {
            Err(error) if error.kind() != std::io::ErrorKind::NotFound => Err(error),
            _ => Ok(()),
        };
    }
    let oldest = rotated_path(path, keep);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..keep).rev() {
        let from = rotated_path(path, index);
        if from.exists() {
            fs::rename(&from, rotated_path(path, index + 1))?;
        }
    }
    if path.exists() {
        fs::rename(path, rotated_path(path, 1))?;
    }
    Ok(())
}

fn rotated_path(base: &Path, index: usize) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn line(entry: LogEntry) -> LogLine {
        LogLine { at: Local::now(), entry }
    }

    #[test]
    fn rotated_path_appends_index_suffix() {
        assert_eq!(rotated_path(Path::new("/tmp/tui.jsonl"), 3), PathBuf::from("/tmp/tui.jsonl.3"));
    }

    #[test]
    fn unset_numbers_fall_back() {
        temp_env::with_vars_unset([TUI_LOG_PATH_ENV, TUI_LOG_MAX_BYTES_ENV, TUI_LOG_MAX_FILES_ENV], || {
            let config = PersistentLogConfig::from_environment();
            assert_eq!(config.max_bytes, DEFAULT_MAX_BYTES);
            assert_eq!(config.max_files, DEFAULT_MAX_FILES);
            assert!(config.path.ends_with("flowdeck/logs/tui.jsonl"));
        });
    }

    #[test]
    fn environment_overrides_location_and_limits() {
        temp_env::with_vars(
            [
                (TUI_LOG_PATH_ENV, Some("/var/tmp/flowdeck.jsonl")),
                (TUI_LOG_MAX_BYTES_ENV, Some("0")),
                (TUI_LOG_MAX_FILES_ENV, Some("7")),
            ],
            || {
                let config = PersistentLogConfig::from_environment();
                assert_eq!(config.path, PathBuf::from("/var/tmp/flowdeck.jsonl"));
                assert_eq!(config.max_bytes, DEFAULT_MAX_BYTES);
                assert_eq!(config.max_files, 7);
            },
        );
    }

    #[test]
    fn writes_redacted_jsonl_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("tui.jsonl");
        {
            let worker = PersistentLogWorker::start(PersistentLogConfig::new(path.clone(), 1024 * 1024, 2)).expect("worker");
            worker.enqueue(&line(LogEntry::info("FLOWDECK_TOKEN=abc loaded"))).expect("enqueue");
            worker.enqueue(&line(LogEntry::api(400, r#"{"password":"hunter2"}"#))).expect("enqueue");
        }

        let contents = fs::read_to_string(&path).expect("log file");
        let records: Vec<Value> = contents.lines().map(|line| serde_json::from_str(line).expect("json line")).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["message"], "FLOWDECK_TOKEN=[REDACTED] loaded");
        assert_eq!(records[0]["source"], "tui");
        assert_eq!(records[1]["status"], 400);
        assert_eq!(records[1]["level"], "warn");
        assert_eq!(records[1]["payload"]["password"], "[REDACTED]");
    }

    #[test]
    fn rotates_when_file_exceeds_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tui.jsonl");
        let mut file = LogFile::open(PersistentLogConfig::new(path.clone(), 16, 1)).expect("log file");
        file.append(&line(LogEntry::info("first entry is long enough"))).expect("append");
        file.append(&line(LogEntry::info("second"))).expect("append");
        file.flush();

        let rotated = fs::read_to_string(rotated_path(&path, 1)).expect("rotated");
        let current = fs::read_to_string(&path).expect("current");
        assert!(rotated.contains("first"));
        assert!(current.contains("second"));
        assert!(!current.contains("first"));
    }
}
