use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rxtract_core::NormalizedPatientRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of the store: the record plus its id and write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "_ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub record: NormalizedPatientRecord,
}

/// Append-only JSON Lines file of extracted records.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &NormalizedPatientRecord) -> Result<StoredRecord> {
        let stored = StoredRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            record: record.clone(),
        };
        let line = serde_json::to_string(&stored)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open store {}", self.path.display()))?;
        writeln!(file, "{line}")?;

        tracing::debug!(id = %stored.id, path = %self.path.display(), "Stored record");
        Ok(stored)
    }

    /// Up to `limit` records, newest first. Lines that don't parse are
    /// skipped and a missing file is an empty store.
    pub fn list(&self, limit: usize) -> Result<Vec<StoredRecord>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };

        let mut records = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(line = number + 1, "Skipping malformed store line: {}", e),
            }
        }

        Ok(records.into_iter().rev().take(limit).collect())
    }
}
