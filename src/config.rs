// Configuration loading
//
// Lookup order: explicit path > $TASKLIST_CONFIG > <config dir>/tasklist/config.yaml > defaults.

use crate::models::Priority;
use crate::store::TaskDefaults;
use chrono::format::{Item, StrftimeItems};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "TASKLIST_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Title prefix for synthesized tasks ("Task" gives "Task 1", "Task 2", ...)
    pub default_title_prefix: String,
    /// Priority for synthesized tasks
    pub default_priority: Priority,
    /// Colour priority labels in text output
    pub color: bool,
    /// chrono format string for due dates
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_title_prefix: "Task".to_string(),
            default_priority: Priority::Medium,
            color: true,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl Config {
    /// Resolve and load the configuration.
    ///
    /// An explicit path or `$TASKLIST_CONFIG` must point at an existing file;
    /// the per-user file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(eyre!("Config file not found: {}", path.display()));
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config {}", path.display()))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    /// `<config dir>/tasklist/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tasklist").join("config.yaml"))
    }

    pub fn task_defaults(&self) -> TaskDefaults {
        TaskDefaults {
            title_prefix: self.default_title_prefix.clone(),
            priority: self.default_priority,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.default_title_prefix.trim().is_empty() {
            return Err(eyre!("default_title_prefix cannot be empty"));
        }
        if self.date_format.trim().is_empty() {
            return Err(eyre!("date_format cannot be empty"));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(eyre!("Invalid date_format: {}", self.date_format));
        }
        Ok(())
    }
}
