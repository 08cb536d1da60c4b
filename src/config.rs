//! The train config file at `~/.train/config.toml`.
//!
//! A missing file yields the defaults, and a partial file is filled in from
//! them. Writes go through a temp file in the same directory and are renamed
//! into place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ConfigError;

const CONFIG_DIR_NAME: &str = ".train";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_RELEASE_BRANCH: &str = "release";
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 10.0;
pub const DEFAULT_BURST: u32 = 25;

/// Slowest accepted positive rate. Zero still disables throttling.
pub const MIN_REQUESTS_PER_SECOND: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub release_branch: String,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub limits: Limits,
    pub ignores: Ignores,
}

/// Outbound request throttle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub requests_per_second: f64,
    pub burst: u32,
}

/// Repositories and topics the create and release passes leave alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ignores {
    /// Repository names or `owner/name` pairs.
    pub repos: Vec<String>,
    pub topics: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            release_branch: DEFAULT_RELEASE_BRANCH.to_string(),
            github: GitHubConfig::default(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            burst: DEFAULT_BURST,
        }
    }
}

impl Config {
    /// Path of the config file in the user's home directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
    }

    /// Load from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load and validate the config at `path`, or the defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    /// Write the config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(content.as_bytes()).map_err(write_err)?;
        temp.persist(path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.github.limits.requests_per_second;
        if !rate.is_finite() || rate < 0.0 {
            return Err(ConfigError::InvalidLimits(format!(
                "requests_per_second must be a non-negative number, got {rate}"
            )));
        }
        if rate > 0.0 && rate < MIN_REQUESTS_PER_SECOND {
            return Err(ConfigError::InvalidLimits(format!(
                "requests_per_second must be 0 or at least {MIN_REQUESTS_PER_SECOND}, got {rate}"
            )));
        }
        Ok(())
    }

    /// Update a single field by name, as `train config <field> <value>` does.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        match field {
            "release_branch" => {
                self.release_branch = value.trim().to_string();
                Ok(())
            }
            other => Err(ConfigError::UnknownField(other.to_string())),
        }
    }
}
