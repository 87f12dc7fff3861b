//! Error types for lifelog-ingest

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Snapshot file errors
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reasons a new entry is rejected before it is stored
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    #[error("activity must not be empty")]
    EmptyActivity,

    #[error("time entries need a duration")]
    MissingDuration,

    #[error("money entries need an amount")]
    MissingAmount,

    #[error("satisfaction must be between 1 and 5, got {0}")]
    InvalidSatisfaction(u8),

    #[error("{0} has no such wall-clock time in the display timezone")]
    InvalidDate(NaiveDate),
}
