// YAML configuration

use crate::models::StatusSet;
use crate::store::{DEFAULT_PAGE_SIZE, StoreOptions};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "TASKLIST_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the `.tasklist` store (default: current directory)
    pub store_path: Option<PathBuf>,
    pub page_size: usize,
    /// Status set used until one is stored
    pub statuses: Vec<String>,
    /// Refuse commands other than `login` until logged in
    pub require_login: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            statuses: StatusSet::default().labels().to_vec(),
            require_login: true,
        }
    }
}

impl Config {
    /// Load from an explicit path, `$TASKLIST_CONFIG`, or the user config dir
    ///
    /// A missing file at the default location yields the default config; a
    /// missing file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&contents).with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        // An empty document deserializes as null
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(contents).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(eyre!("page_size must be at least 1"));
        }
        if self.statuses.is_empty() {
            return Err(eyre!("statuses cannot be empty"));
        }
        let set = StatusSet::new(&self.statuses);
        if set.len() != self.statuses.len() {
            return Err(eyre!("statuses must be unique and non-empty: {:?}", self.statuses));
        }
        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            page_size: self.page_size,
            default_statuses: StatusSet::new(&self.statuses),
        }
    }
}

/// `<config dir>/tasklist/tasklist.yml`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tasklist").join("tasklist.yml"))
}
