//! Engine configuration stored in ~/.taskline/config.json
//!
//! Every field has a serde default, so a missing file or an empty object
//! yields the stock configuration: Sunday-first weeks in UTC.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Label recorded on tasks whose entry does not name its creating agent.
pub const DEFAULT_AGENT_LABEL: &str = "AI Task Allocator";

/// First day of the week used to anchor timeline windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub week_start: WeekStart,
    /// IANA timezone name; window days start at local midnight here
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_agent_label")]
    pub default_agent_label: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_agent_label() -> String {
    DEFAULT_AGENT_LABEL.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            timezone: default_timezone(),
            default_agent_label: default_agent_label(),
        }
    }
}

impl EngineConfig {
    /// Parsed timezone.
    pub fn tz(&self) -> Result<Tz, EngineError> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| EngineError::InvalidTimezone(self.timezone.clone()))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.tz().map(|_| ())
    }
}

/// Get the canonical config file path (~/.taskline/config.json)
pub fn config_path() -> Result<PathBuf, EngineError> {
    let home = dirs::home_dir().ok_or_else(|| EngineError::ConfigRead {
        path: PathBuf::from("~"),
        message: "Could not find home directory".to_string(),
    })?;
    Ok(home.join(".taskline").join("config.json"))
}

/// Load configuration from ~/.taskline/config.json, or defaults if absent.
pub fn load_config() -> Result<EngineConfig, EngineError> {
    let path = config_path()?;
    if !path.exists() {
        log::info!("No config at {}; using defaults", path.display());
        return Ok(EngineConfig::default());
    }
    load_config_from(&path)
}

/// Load and validate configuration from a specific file.
pub fn load_config_from(path: &Path) -> Result<EngineConfig, EngineError> {
    let content = fs::read_to_string(path).map_err(|e| EngineError::ConfigRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let config: EngineConfig =
        serde_json::from_str(&content).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
    config.validate()?;

    Ok(config)
}
