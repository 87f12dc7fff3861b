use anyhow::{Context, Result};
use lifelog_core::ViewState;
use std::fs;
use std::path::{Path, PathBuf};

/// `$LIFELOG_HOME`, or `~/.lifelog`.
pub fn lifelog_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LIFELOG_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".lifelog"))
}

pub fn ensure_lifelog_home() -> Result<PathBuf> {
    let dir = lifelog_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn view_path(dir: &Path) -> PathBuf {
    dir.join("view.json")
}

/// Persisted expanded/collapsed flags. Missing file means defaults.
pub fn read_view(dir: &Path) -> Result<ViewState> {
    let p = view_path(dir);
    if !p.exists() {
        return Ok(ViewState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn write_view(dir: &Path, view: &ViewState) -> Result<()> {
    let p = view_path(dir);
    let json = serde_json::to_string_pretty(view)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
