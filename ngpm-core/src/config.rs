//! ngpm configuration
//!
//! Resolution order, later sources winning:
//! 1. Built-in defaults (`packages`, `installed` in the working directory)
//! 2. Config file: explicit path, or `config.yaml` in the platform config dir
//! 3. Environment: `NGPM_PACKAGES_DIR`, `NGPM_INSTALLED_DIR`, `NGPM_REGISTRY_URL`
//! 4. Command-line overrides, applied by the caller

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::package::DEFAULT_REGISTRY_URL;

pub const ENV_PACKAGES_DIR: &str = "NGPM_PACKAGES_DIR";
pub const ENV_INSTALLED_DIR: &str = "NGPM_INSTALLED_DIR";
pub const ENV_REGISTRY_URL: &str = "NGPM_REGISTRY_URL";

/// Config file name inside the platform config directory
const CONFIG_FILE: &str = "config.yaml";

/// Default HTTP request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NgpmConfig {
    /// Where fetched archives live
    pub packages_dir: PathBuf,

    /// Where installed packages live
    pub installed_dir: PathBuf,

    /// Registry base URL; packages are at `{registry_url}/<name>@v-<version>`
    pub registry_url: String,

    pub request_timeout_secs: u64,
}

impl Default for NgpmConfig {
    fn default() -> Self {
        Self {
            packages_dir: PathBuf::from("packages"),
            installed_dir: PathBuf::from("installed"),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NgpmConfig {
    /// Load configuration from an explicit file or the default location,
    /// then apply environment overrides
    ///
    /// An explicit path must exist. The default file is optional. Call
    /// [`NgpmConfig::validate`] once command-line overrides are applied.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content).context("Invalid config YAML")
    }

    /// Platform config file location, e.g. `~/.config/ngpm/config.yaml`
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "ngpm", "ngpm")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("ngpm")))
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_PACKAGES_DIR).filter(|v| !v.is_empty()) {
            self.packages_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_INSTALLED_DIR).filter(|v| !v.is_empty()) {
            self.installed_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(ENV_REGISTRY_URL).filter(|v| !v.is_empty()) {
            self.registry_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        crate::package::validate_base_url(&self.registry_url)?;

        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }

        if self.packages_dir == self.installed_dir {
            anyhow::bail!(
                "packages_dir and installed_dir must differ (both are {})",
                self.packages_dir.display()
            );
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
