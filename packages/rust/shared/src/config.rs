//! Application configuration for the Enrich client.
//!
//! User config lives at `~/.enrich/enrich.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "enrich.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".enrich";

// ---------------------------------------------------------------------------
// Config structs (matching enrich.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend API settings.
    #[serde(default)]
    pub api: ApiSettings,

    /// Task polling policy.
    #[serde(default)]
    pub polling: PollingSettings,

    /// Display defaults.
    #[serde(default)]
    pub ui: UiSettings,
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base address of the Enrich backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. No operation may hang indefinitely.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiSettings {
    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[polling]` section — client-side policy for watching async tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Fixed interval between status polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    /// Give up waiting after this many seconds. Timing out does not cancel
    /// the task on the backend.
    #[serde(default = "default_poll_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl PollingSettings {
    /// The poll interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// The overall poll timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_poll_timeout_secs() -> u64 {
    600
}

/// `[ui]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Articles per page in list and search views.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    12
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.enrich/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EnrichError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.enrich/enrich.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EnrichError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| EnrichError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EnrichError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EnrichError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EnrichError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("page_size"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.api.base_url, "http://localhost:8000");
        assert_eq!(parsed.api.timeout_secs, 30);
        assert_eq!(parsed.polling.interval_ms, 2000);
        assert_eq!(parsed.ui.page_size, 12);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[api]
base_url = "https://enrich.example.com"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.api.base_url, "https://enrich.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ui.page_size, 12);
    }

    #[test]
    fn durations_derived_from_settings() {
        let config = AppConfig::default();
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.polling.interval(), Duration::from_millis(2000));
        assert_eq!(config.polling.timeout(), Duration::from_secs(600));
    }
}
