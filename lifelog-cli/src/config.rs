use anyhow::{Context, Result};
use chrono_tz::Tz;
use lifelog_core::time::{parse_timezone, DEFAULT_TIMEZONE};
use lifelog_core::{BudgetCeiling, GroupMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub budget: BudgetSection,
    #[serde(default)]
    pub view: ViewSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySection {
    /// IANA name; every day/week/month boundary is computed in this zone
    pub timezone: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSection {
    pub monthly: BudgetCeiling,
}

/// How the time tab is shown: the project list or a week/month timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeView {
    #[default]
    Project,
    Week,
    Month,
}

impl TimeView {
    /// Bucketing used for the time timeline. The project view still carries
    /// weekly groups in JSON output.
    pub fn group_mode(&self) -> GroupMode {
        match self {
            TimeView::Month => GroupMode::Month,
            TimeView::Project | TimeView::Week => GroupMode::Week,
        }
    }
}

impl FromStr for TimeView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "project" | "projects" => Ok(TimeView::Project),
            "week" => Ok(TimeView::Week),
            "month" => Ok(TimeView::Month),
            other => Err(format!("unknown time view: {other} (project, week, month)")),
        }
    }
}

impl fmt::Display for TimeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeView::Project => "project",
            TimeView::Week => "week",
            TimeView::Month => "month",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSection {
    pub time: TimeView,
    pub money: GroupMode,
    pub output: GroupMode,
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            time: TimeView::Project,
            money: GroupMode::Month,
            output: GroupMode::Month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// EnvFilter directive used when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.display.timezone).context("invalid [display] timezone in config.toml")
    }
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join("config.toml")
}

pub fn load_config(dir: &Path) -> Result<Config> {
    let p = config_path(dir);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(dir: &Path, cfg: &Config) -> Result<()> {
    let p = config_path(dir);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(dir: &Path) -> Result<()> {
    let p = config_path(dir);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(dir, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
