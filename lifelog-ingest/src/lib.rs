//! lifelog-ingest: stored-record shapes, normalization, snapshot files and new-entry drafts.

pub mod draft;
pub mod error;
pub mod normalize;
pub mod snapshot;
pub mod types;

pub use draft::{DraftKind, RecordDraft};
pub use error::{DraftError, IngestError};
pub use normalize::{normalize, normalize_all, resolve_timestamp, Normalized, Rejected};
pub use snapshot::Snapshot;
pub use types::{RawOutputData, RawRecord, RawTaskInfo};
