//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which selects
//! the storage backend (local files or a remote API) and its parameters.
//!
//! Configuration is stored at `~/.config/casebook/config.json`; environment
//! variables (`CASEBOOK_BACKEND`, `CASEBOOK_DATA_DIR`, `CASEBOOK_API_URL`,
//! `CASEBOOK_API_TOKEN`) override the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::HttpStorage;
use crate::storage::{FileStorage, StorageAdapter};

/// Application name used for config/data directory paths
const APP_NAME: &str = "casebook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Remote,
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "remote" => Ok(BackendKind::Remote),
            other => Err(anyhow::anyhow!("Unknown backend '{}', expected local or remote", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Read from the file or env but never written back by `save`.
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Ok(serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
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

    /// Apply `CASEBOOK_*` overrides from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(backend) = lookup("CASEBOOK_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("CASEBOOK_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = lookup("CASEBOOK_API_URL") {
            self.api_base_url = Some(url);
        }
        if let Some(token) = lookup("CASEBOOK_API_TOKEN") {
            self.api_token = Some(token);
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding local collections and log files.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Build the storage adapter this config selects.
    pub fn open_storage(&self) -> Result<Arc<dyn StorageAdapter>> {
        match self.backend {
            BackendKind::Local => {
                let dir = self.data_dir()?;
                debug!(dir = %dir.display(), "Using local file storage");
                Ok(Arc::new(FileStorage::new(dir)?))
            }
            BackendKind::Remote => {
                let url = self
                    .api_base_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("Remote backend needs api_base_url or CASEBOOK_API_URL"))?;
                let mut storage = HttpStorage::new(url)?;
                if let Some(ref token) = self.api_token {
                    storage = storage.with_token(token.clone());
                }
                debug!(url = storage.base_url(), "Using remote API storage");
                Ok(Arc::new(storage))
            }
        }
    }
}
