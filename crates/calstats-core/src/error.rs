use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the calendar-stats crates.
///
/// The statistics engine itself never fails; these variants cover the
/// loaders that feed it.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// An explicitly requested input path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the calendar-stats crates.
pub type Result<T> = std::result::Result<T, StatsError>;
