//! Snapshot loading.
//!
//! A snapshot is a JSON array of loosely-typed place records. [`SnapshotCache`]
//! keeps decoded snapshots keyed by path and modification time, so an edited
//! file is re-read on the next load and callers can drop entries explicitly.

use crate::error::LoadError;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Raw records exactly as decoded from disk. Shared read-only.
pub type RawSnapshot = Arc<Vec<Value>>;

/// Reads and decodes the snapshot at `path`.
///
/// # Errors
///
/// Returns [`LoadError::MissingDataSource`] when the file does not exist, and
/// the other variants when it cannot be read or is not a JSON array.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_snapshot(path: &Path) -> Result<Vec<Value>, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingDataSource {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_snapshot(path, &content)
}

/// Decodes snapshot text. `path` is only used for error reporting.
pub fn parse_snapshot(path: &Path, content: &str) -> Result<Vec<Value>, LoadError> {
    let value: Value = serde_json::from_str(content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Array(records) => {
            debug!(records = records.len(), "Snapshot decoded");
            Ok(records)
        }
        _ => Err(LoadError::NotAnArray {
            path: path.to_path_buf(),
        }),
    }
}

struct CacheEntry {
    modified: Option<SystemTime>,
    snapshot: RawSnapshot,
}

/// Decoded snapshots keyed by source identity (path + modification time).
#[derive(Default)]
pub struct SnapshotCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot for `path`, reloading it if the file changed.
    pub fn load(&mut self, path: &Path) -> Result<RawSnapshot, LoadError> {
        let modified = match std::fs::metadata(path) {
            Ok(meta) => meta.modified().ok(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.entries.remove(path);
                return Err(LoadError::MissingDataSource {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if let Some(entry) = self.entries.get(path) {
            if modified.is_some() && entry.modified == modified {
                debug!(path = %path.display(), "Snapshot cache hit");
                return Ok(Arc::clone(&entry.snapshot));
            }
        }

        let snapshot = Arc::new(load_snapshot(path)?);
        info!(path = %path.display(), records = snapshot.len(), "Snapshot loaded");

        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                snapshot: Arc::clone(&snapshot),
            },
        );
        Ok(snapshot)
    }

    /// Drops the cached snapshot for `path`. Returns whether one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
