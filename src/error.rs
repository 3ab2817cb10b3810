//! Error types for snapshot loading, record normalization, and time input.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading a snapshot file. Any of these ends the invocation.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("data source not found: {}", path.display())]
    MissingDataSource { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {} is not a JSON array of records", path.display())]
    NotAnArray { path: PathBuf },
}

/// A single record that could not be normalized. The rest of the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record #{index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("record #{index} ({name}): popular_times has unsupported type {found}")]
    PopularTimesShape {
        index: usize,
        name: String,
        found: &'static str,
    },
}

impl RecordError {
    /// Index of the rejected record within the raw snapshot.
    pub fn index(&self) -> usize {
        match self {
            RecordError::NotAnObject { index }
            | RecordError::PopularTimesShape { index, .. } => *index,
        }
    }
}

/// Invalid `(day, hour)` input from the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MomentError {
    #[error("hour {0} is outside 0-23")]
    InvalidHour(u32),

    #[error("unknown weekday '{0}', expected Monday..Sunday")]
    UnknownWeekday(String),
}
