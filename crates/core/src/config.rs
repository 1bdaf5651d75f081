//! Configuration management
//!
//! Settings live in `config.toml` under the user's config directory
//! (`SELCTL_CONFIG_DIR` overrides the location). A missing file yields the
//! defaults. Credentials are never written here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default authentication endpoint
pub const DEFAULT_AUTH_URL: &str = "https://auth.selcdn.ru/";

/// Seconds added to the token lifetime before it is treated as expired
pub const DEFAULT_TOKEN_MARGIN_SECS: u64 = 10;

/// Environment variable overriding the configuration directory
pub const ENV_CONFIG_DIR: &str = "SELCTL_CONFIG_DIR";

/// Environment variable naming the default container
pub const ENV_CONTAINER: &str = "SELECTEL_CONTAINER";

const CONFIG_FILE: &str = "config.toml";

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Authentication endpoint
    pub auth_url: String,

    /// Safety margin applied to token expiry, in seconds
    pub token_margin_secs: u64,

    /// Transport timeout in seconds; unset means no timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Container used when a command does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_container: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_margin_secs: DEFAULT_TOKEN_MARGIN_SECS,
            timeout_secs: None,
            default_container: None,
        }
    }
}

/// Loads and saves [`Config`] from a directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    dir: PathBuf,
}

impl ConfigManager {
    /// Use `SELCTL_CONFIG_DIR`, or `<config_dir>/selctl`
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var(ENV_CONFIG_DIR)
            && !dir.is_empty()
        {
            return Ok(Self::with_dir(dir));
        }

        let base = dirs::config_dir()
            .ok_or_else(|| Error::Config("Unable to determine config directory".to_string()))?;
        Ok(Self::with_dir(base.join("selctl")))
    }

    /// Use an explicit directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the config file
    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Load the config file, falling back to defaults when it does not exist
    pub fn load(&self) -> Result<Config> {
        let path = self.path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        Self::read(&path)
    }

    /// Write the config file, creating the directory if needed
    pub fn save(&self, config: &Config) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(self.path(), content)?;
        Ok(())
    }

    fn read(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config {}: {e}", path.display())))
    }
}
