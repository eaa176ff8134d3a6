//! Append-only JSONL activity log with graceful degradation.
//!
//! Each entry is one JSON object per line. If the log file cannot be opened
//! or a write fails, entries go to stderr instead and the session carries on;
//! entries that cannot be written anywhere are counted as dropped.

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::core::errors::{DteError, Result};
use crate::core::generation::Generation;

/// One activity-log record.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub ts: String,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<Generation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LogEntry {
    #[must_use]
    pub fn new(event: &'static str) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
            generation: None,
            screen: None,
            code: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn generation(mut self, generation: Generation) -> Self {
        self.generation = Some(generation);
        self
    }

    #[must_use]
    pub fn screen(mut self, screen: &'static str) -> Self {
        self.screen = Some(screen);
        self
    }

    #[must_use]
    pub fn code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

enum Sink {
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
    Stderr,
    Disabled,
}

/// JSONL writer owned by the session event loop.
pub struct JsonlLogger {
    sink: Sink,
    written: u64,
    dropped: u64,
}

impl JsonlLogger {
    /// Open (creating parent directories) or fall back to stderr.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        match Self::try_open(path) {
            Ok(logger) => logger,
            Err(error) => {
                eprintln!("[dte] activity log unavailable, using stderr: {error}");
                Self::stderr()
            }
        }
    }

    /// Open without fallback.
    pub fn try_open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DteError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| DteError::io(path, e))?;
        Ok(Self {
            sink: Sink::File {
                path: path.to_path_buf(),
                writer: BufWriter::new(file),
            },
            written: 0,
            dropped: 0,
        })
    }

    #[must_use]
    pub const fn stderr() -> Self {
        Self {
            sink: Sink::Stderr,
            written: 0,
            dropped: 0,
        }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            sink: Sink::Disabled,
            written: 0,
            dropped: 0,
        }
    }

    /// Path of the backing file, if logging to one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.sink {
            Sink::File { path, .. } => Some(path),
            Sink::Stderr | Sink::Disabled => None,
        }
    }

    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Write one entry. Never fails; a broken file sink degrades to stderr.
    pub fn log(&mut self, entry: &LogEntry) {
        if matches!(self.sink, Sink::Disabled) {
            return;
        }
        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(_) => {
                self.dropped += 1;
                return;
            }
        };

        let file_result = match &mut self.sink {
            Sink::File { writer, .. } => Some(
                writeln!(writer, "{line}").and_then(|()| writer.flush()),
            ),
            Sink::Stderr | Sink::Disabled => None,
        };

        match file_result {
            Some(Ok(())) => self.written += 1,
            Some(Err(error)) => {
                eprintln!("[dte] activity log write failed, using stderr: {error}");
                self.sink = Sink::Stderr;
                self.write_stderr(&line);
            }
            None => self.write_stderr(&line),
        }
    }

    fn write_stderr(&mut self, line: &str) {
        let mut stderr = io::stderr().lock();
        if writeln!(stderr, "{line}").is_ok() {
            self.written += 1;
        } else {
            self.dropped += 1;
        }
    }
}
