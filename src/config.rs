use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::providers::html_meta::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:4000".to_string(),
        }
    }
}

/// The single source of the implicit defaults the handlers share, so create
/// and update paths can never drift apart.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ItemDefaults {
    /// Percentage, e.g. 14 for 14%.
    pub sales_tax_rate: f64,
    pub target_years: u32,
    /// Fraction, e.g. 0.07 for 7%.
    pub expected_return: f64,
    /// Placeholder identity used when requests carry no userId.
    pub user_id: String,
}

impl Default for ItemDefaults {
    fn default() -> Self {
        ItemDefaults {
            sales_tax_rate: 14.0,
            target_years: 5,
            expected_return: 0.07,
            user_id: "demo".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PreviewConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// When true, items persist in a fjall keyspace under `data_dir` (or the
    /// platform data directory); otherwise an in-memory store is used.
    pub persist: bool,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub defaults: ItemDefaults,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "wishvest")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "wishvest")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
