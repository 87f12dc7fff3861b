//! Error types for lifelog-core

use thiserror::Error;

/// Main error type for the aggregation engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A stored record whose timestamp cannot be resolved to an instant
    #[error("malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    /// A budget ceiling that is not a positive, finite number
    #[error("invalid budget ceiling: {0}")]
    InvalidBudget(f64),

    /// An IANA timezone name chrono-tz does not know
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// A record id that is not present in the snapshot
    #[error("record not found: {0}")]
    UnknownRecord(String),
}

impl Error {
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for lifelog-core
pub type Result<T> = std::result::Result<T, Error>;
