//! Last-run history used to rank the root list.
//!
//! The history file is a JSON object mapping item ids to the Unix timestamp
//! (seconds) of their last run. It is advisory: a missing or corrupt file
//! reads as empty, and write failures are logged and dropped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::LumenResult;

/// Persistent id → last-run mapping.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: BTreeMap<String, i64>,

    /// Path to the data file. `None` keeps the store in memory only.
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Create an in-memory store that never touches disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`.
    ///
    /// Returns an empty store if the file doesn't exist or is corrupted.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path).unwrap_or_default();
        Self {
            entries,
            path: Some(path),
        }
    }

    /// Unix timestamp of the last run of `id`, 0 if it never ran.
    pub fn last_run(&self, id: &str) -> i64 {
        self.entries.get(id).copied().unwrap_or(0)
    }

    pub fn entries(&self) -> &BTreeMap<String, i64> {
        &self.entries
    }

    /// Record a run of `id` at `timestamp` and rewrite the history file.
    ///
    /// Entries written by other processes since load are merged in first.
    /// Timestamps never move backwards. Persistence errors are logged and
    /// swallowed.
    pub fn record_and_persist(&mut self, id: &str, timestamp: i64) {
        if let Some(ref path) = self.path {
            if let Some(on_disk) = read_entries(path) {
                for (key, value) in on_disk {
                    let entry = self.entries.entry(key).or_insert(value);
                    *entry = (*entry).max(value);
                }
            }
        }

        let entry = self.entries.entry(id.to_string()).or_insert(timestamp);
        *entry = (*entry).max(timestamp);

        if let Err(e) = self.save() {
            tracing::debug!(error = %e, "failed to persist history");
        }
    }

    /// Write the whole mapping to disk, creating the state directory first.
    pub fn save(&self) -> LumenResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec(&self.entries)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current Unix time in seconds.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn read_entries(path: &Path) -> Option<BTreeMap<String, i64>> {
    let data = fs::read(path).ok()?;
    serde_json::from_slice(&data).ok()
}
