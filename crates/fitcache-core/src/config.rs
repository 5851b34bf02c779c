//! Application configuration management.
//!
//! This module handles loading and saving the configuration: the backend
//! base URL, the user whose data is read, an optional request timeout and the
//! cache staleness window.
//!
//! Configuration is stored at `~/.config/fitcache/config.json`. Environment
//! variables (`FITCACHE_API_URL`, `FITCACHE_USER_ID`, `FITCACHE_TIMEOUT_SECS`)
//! override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;
use crate::api::ApiClient;
use crate::cache::CacheOptions;

/// Application name used for the config directory path
const APP_NAME: &str = "fitcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_API_URL: &str = "FITCACHE_API_URL";
const ENV_USER_ID: &str = "FITCACHE_USER_ID";
const ENV_TIMEOUT_SECS: &str = "FITCACHE_TIMEOUT_SECS";

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_stale_after_minutes() -> Option<i64> {
    Some(60)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Owner of every cached collection. There is no login flow yet, so this
    /// must be supplied explicitly.
    #[serde(default)]
    pub user_id: Option<String>,
    /// `None` leaves timeouts to the HTTP transport.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// `None` keeps cached data until it is invalidated.
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_id: None,
            request_timeout_secs: None,
            stale_after_minutes: default_stale_after_minutes(),
        }
    }
}

impl Config {
    /// Load from the config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .stale_after()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from a variable lookup (the process environment in `load`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(user_id) = lookup(ENV_USER_ID).filter(|v| !v.trim().is_empty()) {
            self.user_id = Some(user_id);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
            self.request_timeout_secs = Some(secs);
        }
        Ok(())
    }

    pub fn user_id(&self) -> Result<&str> {
        self.user_id.as_deref().ok_or_else(|| {
            anyhow::anyhow!("No user configured; set {} or user_id in the config file", ENV_USER_ID)
        })
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        let timeout = self.request_timeout_secs.map(Duration::from_secs);
        ApiClient::with_timeout(&self.api_base_url, timeout)
            .with_context(|| format!("Failed to create API client for {}", self.api_base_url))
    }

    /// Staleness window as a duration. Negative or out-of-range minutes are rejected.
    pub fn stale_after(&self) -> Result<Option<chrono::Duration>> {
        let Some(minutes) = self.stale_after_minutes else {
            return Ok(None);
        };
        if minutes < 0 {
            bail!("stale_after_minutes must not be negative (got {})", minutes);
        }
        chrono::Duration::try_minutes(minutes)
            .map(Some)
            .with_context(|| format!("stale_after_minutes is too large (got {})", minutes))
    }

    pub fn cache_options(&self) -> Result<CacheOptions> {
        Ok(CacheOptions {
            stale_after: self.stale_after()?,
        })
    }
}
