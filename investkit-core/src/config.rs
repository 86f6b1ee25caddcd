//! Fetch configuration, loaded from TOML.
//!
//! ```toml
//! base_url = "https://es.investing.com"
//! recent_timeout_secs = 5
//! historical_timeout_secs = 30
//! catalog_dir = "catalogs"
//! user_agents = ["Mozilla/5.0 ..."]
//! ```
//!
//! Every key is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Site root, without trailing slash.
    pub base_url: String,
    /// Timeout for the recent-data page and other single-page GETs.
    pub recent_timeout_secs: u64,
    /// Timeout for each `HistoricalDataAjax` POST.
    pub historical_timeout_secs: u64,
    /// Replaces the built-in user-agent pool when non-empty.
    pub user_agents: Vec<String>,
    /// Directory of catalog CSVs overriding the bundled ones.
    pub catalog_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://es.investing.com".into(),
            recent_timeout_secs: 5,
            historical_timeout_secs: 30,
            user_agents: Vec::new(),
            catalog_dir: None,
        }
    }
}

impl FetchConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: FetchConfig = toml::from_str(content)?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        if self.recent_timeout_secs == 0 || self.historical_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least one second".into()));
        }
        Ok(())
    }

    pub fn recent_timeout(&self) -> Duration {
        Duration::from_secs(self.recent_timeout_secs)
    }

    pub fn historical_timeout(&self) -> Duration {
        Duration::from_secs(self.historical_timeout_secs)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize: {e}")))
    }
}
