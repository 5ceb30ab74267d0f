//! Global CLI configuration management
//!
//! Stores the database URL and session secret in ~/.routerdesk/config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterdeskConfig {
    /// Database used when `--database-url` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Session signing secret used when `--jwt-secret` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
}

impl RouterdeskConfig {
    /// Flag or environment value first, then this file
    pub fn database_url_or(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.database_url.clone())
    }

    pub fn jwt_secret_or(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.jwt_secret.clone())
    }
}

/// Configuration manager
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the default location, `~/.routerdesk/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(Self::at(home.join(".routerdesk").join("config.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration from disk
    pub fn load(&self) -> Result<RouterdeskConfig> {
        // Return default config if file doesn't exist
        if !self.path.exists() {
            return Ok(RouterdeskConfig::default());
        }

        let json = fs::read_to_string(&self.path)
            .context(format!("Failed to read config file: {:?}", self.path))?;

        let config: RouterdeskConfig = serde_json::from_str(&json)
            .context(format!("Failed to parse config file: {:?}", self.path))?;

        Ok(config)
    }

    /// Save the configuration to disk
    pub fn save(&self, config: &RouterdeskConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.path, json)
            .context(format!("Failed to write config file: {:?}", self.path))?;

        Ok(())
    }

    pub fn set_database_url(&self, url: String) -> Result<()> {
        let mut config = self.load()?;
        config.database_url = Some(url);
        self.save(&config)
    }

    pub fn set_jwt_secret(&self, secret: String) -> Result<()> {
        let mut config = self.load()?;
        config.jwt_secret = Some(secret);
        self.save(&config)
    }

    /// Remove every stored setting
    pub fn clear(&self) -> Result<()> {
        self.save(&RouterdeskConfig::default())
    }
}
