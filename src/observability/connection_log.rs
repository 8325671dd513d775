//! Connection event log.
//!
//! Every accepted connection produces one line on stdout and, when file
//! logging is enabled, the same line appended to the log file:
//!
//! ```text
//! [2024-05-01 12:00:00] Connection established with: 10.0.0.7 on port 9001
//! ```
//!
//! # Design Decisions
//! - One mutex guards every destination, so lines never interleave
//! - The lock is held only while one formatted line is written
//! - After [`ConnectionLog::close_file`] the file destination is skipped silently

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use thiserror::Error;

/// Format shared by log lines and greetings.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Failure to open the log file at startup.
#[derive(Debug, Error)]
#[error("cannot open log file {path}: {source}")]
pub struct LogError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Open (or create) a log file in append mode. Existing lines are kept.
pub fn open_log_file(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError {
            path: path.to_path_buf(),
            source,
        })
}

/// One connection event, rendered as a single line without the newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub peer: IpAddr,
    pub port: u16,
}

impl LogEntry {
    pub fn now(peer: IpAddr, port: u16) -> Self {
        Self {
            timestamp: Local::now(),
            peer,
            port,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Connection established with: {} on port {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.peer,
            self.port
        )
    }
}

struct Sinks {
    console: Box<dyn Write + Send>,
    file: Option<File>,
}

/// Thread-safe sink for connection events.
pub struct ConnectionLog {
    sinks: Mutex<Sinks>,
}

impl ConnectionLog {
    /// Log to the given console writer and, optionally, an already opened file.
    pub fn new(console: impl Write + Send + 'static, file: Option<File>) -> Self {
        Self {
            sinks: Mutex::new(Sinks {
                console: Box::new(console),
                file,
            }),
        }
    }

    /// Log to stdout and, optionally, an already opened file.
    pub fn stdout(file: Option<File>) -> Self {
        Self::new(io::stdout(), file)
    }

    /// Whether the file destination is still open.
    pub fn file_enabled(&self) -> bool {
        self.lock().file.is_some()
    }

    /// Record a connection from `peer` accepted on `port`, stamped now.
    pub fn record(&self, peer: IpAddr, port: u16) {
        self.record_entry(&LogEntry::now(peer, port));
    }

    pub fn record_entry(&self, entry: &LogEntry) {
        let line = format!("{entry}\n");
        let mut guard = self.lock();
        let Sinks { console, file } = &mut *guard;

        let _ = console.write_all(line.as_bytes()).and_then(|_| console.flush());

        if let Some(file) = file.as_mut() {
            if let Err(e) = file.write_all(line.as_bytes()) {
                tracing::warn!(error = %e, port = entry.port, "Failed to append to log file");
            }
        }
    }

    /// Print a line to the console only.
    pub fn announce(&self, message: &str) {
        let mut guard = self.lock();
        let console = &mut guard.console;
        let _ = writeln!(console, "{message}").and_then(|_| console.flush());
    }

    /// Flush and close the file destination. Later records reach the console only.
    pub fn close_file(&self) {
        let file = self.lock().file.take();
        if let Some(file) = file {
            if let Err(e) = file.sync_all() {
                tracing::warn!(error = %e, "Failed to sync log file on close");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sinks> {
        // A panic mid-write leaves at worst one partial line; keep logging.
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
