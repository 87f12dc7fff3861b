//! File-backed snapshots: `records.json` and `projects.json`.
//!
//! Both files hold either a bare JSON array or the document store's
//! `{"data": [...]}` response envelope.

use std::fs;
use std::path::{Path, PathBuf};

use lifelog_core::ProjectMeta;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::types::RawRecord;

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Data { data: Vec<T> },
    List(Vec<T>),
}

impl<T> Envelope<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Envelope::Data { data } => data,
            Envelope::List(items) => items,
        }
    }
}

/// Everything the engine needs from storage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: Vec<RawRecord>,
    pub projects: Vec<ProjectMeta>,
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> IngestError + '_ {
    move |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_err(path: &Path) -> impl FnOnce(serde_json::Error) -> IngestError + '_ {
    move |source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    }
}

/// Parse a list from JSON text (array or `{"data": [...]}`).
pub fn parse_list<T: DeserializeOwned>(text: &str) -> serde_json::Result<Vec<T>> {
    serde_json::from_str::<Envelope<T>>(text).map(Envelope::into_vec)
}

fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IngestError> {
    let text = fs::read_to_string(path).map_err(io_err(path))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    parse_list(&text).map_err(json_err(path))
}

/// Load `records.json`. A missing file is an empty log.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_list(path)
}

/// Load `projects.json`. Missing or unreadable metadata degrades to an empty
/// list; records still aggregate with default statuses.
pub fn load_projects(path: &Path) -> Vec<ProjectMeta> {
    if !path.exists() {
        return Vec::new();
    }
    match read_list(path) {
        Ok(metas) => metas,
        Err(error) => {
            tracing::warn!(%error, "ignoring project metadata");
            Vec::new()
        }
    }
}

impl Snapshot {
    /// Load both files from a state directory.
    pub fn load(dir: &Path) -> Result<Self, IngestError> {
        Ok(Self {
            records: load_records(&records_path(dir))?,
            projects: load_projects(&projects_path(dir)),
        })
    }
}

pub fn records_path(dir: &Path) -> PathBuf {
    dir.join("records.json")
}

pub fn projects_path(dir: &Path) -> PathBuf {
    dir.join("projects.json")
}

/// Write a list as pretty JSON, replacing the file.
pub fn write_list<T: Serialize>(path: &Path, items: &[T]) -> Result<(), IngestError> {
    let json = serde_json::to_string_pretty(items).map_err(json_err(path))?;
    fs::write(path, json).map_err(io_err(path))
}
