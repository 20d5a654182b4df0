//! Append-only CSV log of queries the agent could not handle locally.
//!
//! One writer at a time: every append takes the log's mutex, serializes the
//! row in memory and writes it with a single `write_all` on an append-mode
//! handle, so concurrent requests never interleave partial rows. The header
//! is written whenever the file is absent or empty, including right after a
//! rotation.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LogConfig;

pub const LOG_HEADER: [&str; 2] = ["Query", "GPT_Response"];

#[derive(Error, Debug)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// One logged row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnrecognizedEntry {
    #[serde(rename = "Query")]
    pub query: String,
    #[serde(rename = "GPT_Response")]
    pub response: String,
}

pub struct UnrecognizedLog {
    path: PathBuf,
    max_bytes: u64,
    lock: Mutex<()>,
}

impl UnrecognizedLog {
    pub fn new(config: &LogConfig) -> Self {
        Self {
            path: config.path.clone(),
            max_bytes: config.max_bytes,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `(query, response)` row.
    pub fn append(&self, query: &str, response: &str) -> Result<(), LogError> {
        let _guard = self.lock.lock().map_err(|_| LogError::LockPoisoned)?;

        if let Some(rotated) = self.rotate_if_full(Utc::now())? {
            tracing::info!(rotated = %rotated.display(), "Unrecognized log rotated");
        }

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        if needs_header {
            writer.write_record(LOG_HEADER)?;
        }
        writer.write_record([query, response])?;
        let bytes = writer
            .into_inner()
            .map_err(|e| LogError::Io(e.into_error()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }

    /// Snapshot of the current log file, or `None` when nothing has been logged.
    pub fn export_bytes(&self) -> Result<Option<Vec<u8>>, LogError> {
        let _guard = self.lock.lock().map_err(|_| LogError::LockPoisoned)?;
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse all rows of the current file.
    pub fn entries(&self) -> Result<Vec<UnrecognizedEntry>, LogError> {
        let Some(bytes) = self.export_bytes()? else {
            return Ok(Vec::new());
        };
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        reader
            .deserialize()
            .collect::<Result<Vec<UnrecognizedEntry>, _>>()
            .map_err(LogError::from)
    }

    /// Move a full log aside. Caller must hold the lock.
    fn rotate_if_full(&self, now: DateTime<Utc>) -> Result<Option<PathBuf>, LogError> {
        if self.max_bytes == 0 {
            return Ok(None);
        }
        let len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if len < self.max_bytes {
            return Ok(None);
        }

        let rotated = rotated_path(&self.path, now);
        fs::rename(&self.path, &rotated)?;
        Ok(Some(rotated))
    }
}

/// `dir/name.csv` → `dir/name-20260101T120000123Z.csv`, or
/// `dir/name-20260101T120000123Z-1.csv` (`-2`, …) when that name is taken.
/// `fs::rename` replaces an existing target, so the name must be free.
fn rotated_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unrecognized".into());
    let stamp = now.format("%Y%m%dT%H%M%S%3fZ").to_string();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut seq: u32 = 0;
    loop {
        let base = match seq {
            0 => format!("{stem}-{stamp}"),
            n => format!("{stem}-{stamp}-{n}"),
        };
        let candidate = path.with_file_name(match &ext {
            Some(ext) => format!("{base}.{ext}"),
            None => base,
        });
        if !candidate.exists() {
            return candidate;
        }
        seq += 1;
    }
}
