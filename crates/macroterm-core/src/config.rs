//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! where the dashboard is hosted, which cache version is current, and the
//! request timeout.
//!
//! Configuration is stored at `~/.config/macroterm/config.json`.
//! `MACROTERM_BASE_URL` and `MACROTERM_CACHE_VERSION` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::cache::{cache_name, WorkerConfig};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "macroterm";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

const DEFAULT_CACHE_VERSION: &str = "v1";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "MACROTERM_BASE_URL";
pub const ENV_CACHE_VERSION: &str = "MACROTERM_CACHE_VERSION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub cache_version: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_CACHE_VERSION).ok(),
        );
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Replace fields with non-empty override values.
    pub fn apply_overrides(&mut self, base_url: Option<String>, cache_version: Option<String>) {
        if let Some(url) = base_url.filter(|s| !s.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(version) = cache_version.filter(|s| !s.trim().is_empty()) {
            self.cache_version = version.trim().to_string();
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Base URL with a trailing slash, so relative asset paths resolve under it.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("Invalid base URL: {}", self.base_url))
    }

    pub fn cache_name(&self) -> String {
        cache_name(&self.cache_version)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn worker_config(&self) -> Result<WorkerConfig> {
        Ok(WorkerConfig::new(self.base_url()?, &self.cache_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = Config {
            base_url: "https://example.github.io/macro".to_string(),
            ..Config::default()
        };
        let url = config.base_url().expect("valid base url");
        assert_eq!(url.as_str(), "https://example.github.io/macro/");
        assert_eq!(
            url.join("./data/dashboard.json").expect("join").as_str(),
            "https://example.github.io/macro/data/dashboard.json"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.base_url().is_err());
    }

    #[test]
    fn test_cache_name_from_version() {
        let mut config = Config::default();
        assert_eq!(config.cache_name(), "macro-terminal-v1");
        config.apply_overrides(None, Some("v2".to_string()));
        assert_eq!(config.cache_name(), "macro-terminal-v2");
        assert_eq!(
            config.worker_config().expect("worker config").cache_name,
            "macro-terminal-v2"
        );
    }

    #[test]
    fn test_overrides_ignore_empty_values() {
        let mut config = Config::default();
        config.apply_overrides(Some("  ".to_string()), Some(String::new()));
        assert_eq!(config, Config::default());

        config.apply_overrides(Some(" http://10.0.0.5:9000 ".to_string()), None);
        assert_eq!(config.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn test_load_save_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert_eq!(Config::load_from(&path).expect("load missing"), Config::default());

        let config = Config {
            base_url: "http://dash.local/".to_string(),
            cache_version: "v3".to_string(),
            request_timeout_secs: 5,
        };
        config.save_to(&path).expect("save failed");
        assert_eq!(Config::load_from(&path).expect("load failed"), config);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"cache_version": "v9"}"#).expect("write config");

        let config = Config::load_from(&path).expect("load failed");
        assert_eq!(config.cache_version, "v9");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
