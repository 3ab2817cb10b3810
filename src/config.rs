//! Runtime settings read from the environment (after `.env` is loaded).

use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data_dashboard.json";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/busyness_rater.log";

/// Where to find the snapshot and where to write logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub log_file_path: PathBuf,
}

impl Settings {
    /// Reads `BUSYNESS_DATA_PATH` and `LOG_FILE_PATH`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            data_path: PathBuf::from(get("BUSYNESS_DATA_PATH", DEFAULT_DATA_PATH)),
            log_file_path: PathBuf::from(get("LOG_FILE_PATH", DEFAULT_LOG_FILE_PATH)),
        }
    }
}
