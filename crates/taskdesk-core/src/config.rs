//! Application configuration management.
//!
//! Holds the backend URL, which credential storage backend to use, and the
//! last email used to log in.
//!
//! Configuration is stored at `~/.config/taskdesk/config.json`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{CredentialStore, FileCredentialStore, KeyringCredentialStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "taskdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";

/// Environment overrides, applied over the config file
pub const ENV_API_URL: &str = "TASKDESK_API_URL";
pub const ENV_STORAGE: &str = "TASKDESK_STORAGE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub storage: StorageBackend,
    pub last_email: Option<String>,
    /// Transport timeout; unset means the HTTP client's default
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage: StorageBackend::default(),
            last_email: None,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `TASKDESK_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(std::env::var(ENV_API_URL).ok(), std::env::var(ENV_STORAGE).ok());
    }

    fn apply_overrides(&mut self, api_url: Option<String>, storage: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(storage) = storage {
            match storage.parse() {
                Ok(backend) => self.storage = backend,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_STORAGE),
            }
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Open the configured credential storage backend
    pub fn credential_store(&self) -> Result<Arc<dyn CredentialStore>> {
        Ok(match self.storage {
            StorageBackend::File => Arc::new(FileCredentialStore::new(self.data_dir()?)),
            StorageBackend::Keyring => Arc::new(KeyringCredentialStore::new()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.storage, StorageBackend::File);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"storage":"keyring","request_timeout_secs":15}"#)
            .expect("Failed to parse config");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.storage, StorageBackend::Keyring);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("https://tasks.example.com/api".to_string()), Some("KEYRING".to_string()));
        assert_eq!(config.api_base_url, "https://tasks.example.com/api");
        assert_eq!(config.storage, StorageBackend::Keyring);

        config.apply_overrides(Some("  ".to_string()), Some("floppy".to_string()));
        assert_eq!(config.api_base_url, "https://tasks.example.com/api");
        assert_eq!(config.storage, StorageBackend::Keyring);
    }
}
