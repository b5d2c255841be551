//! Configuration loading and resolution for the MetaDump client
//!
//! Resolution priority for every setting:
//! 1. Environment variable (highest)
//! 2. TOML config file (`~/.config/mdump/config.toml` or `/etc/mdump/config.toml`)
//! 3. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Optional settings read from the TOML config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the annotation backend
    pub api_base_url: Option<String>,
    /// Session status poll interval in seconds
    pub poll_interval_secs: Option<u64>,
    /// Path of the local session history file
    pub history_path: Option<String>,
}

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the annotation backend (no trailing slash)
    pub api_base_url: String,
    /// Fixed delay between session status polls
    pub poll_interval: Duration,
    /// Path of the local session history file
    pub history_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            history_path: default_history_path(),
        }
    }
}

impl ClientConfig {
    /// Resolve configuration following ENV → TOML → default priority
    pub fn resolve() -> Self {
        let toml_config = load_config_file()
            .and_then(|path| read_toml_config(&path).ok())
            .unwrap_or_default();
        Self::from_sources(&toml_config)
    }

    /// Build a configuration from an already-loaded TOML config plus the environment
    pub fn from_sources(toml_config: &TomlConfig) -> Self {
        let api_base_url = std::env::var("MDUMP_API_BASE_URL")
            .ok()
            .or_else(|| toml_config.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let poll_interval_secs = std::env::var("MDUMP_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| match v.parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    warn!("MDUMP_POLL_INTERVAL_SECS is not a number, ignoring: {}", v);
                    None
                }
            })
            .or(toml_config.poll_interval_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        let history_path = std::env::var("MDUMP_HISTORY_PATH")
            .ok()
            .or_else(|| toml_config.history_path.clone())
            .map(PathBuf::from)
            .unwrap_or_else(default_history_path);

        Self {
            api_base_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            history_path,
        }
    }
}

/// Find the configuration file for the platform, if one exists
fn load_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mdump").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mdump/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Write a TOML config file, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// OS-dependent default location of the session history file
fn default_history_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mdump").join("sessions.json"))
        .unwrap_or_else(|| PathBuf::from("./mdump_sessions.json"))
}
