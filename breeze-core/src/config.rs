use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// The stored value the interactive setup writes before a real key exists.
/// Treated the same as "no key": demo mode.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Environment variable consulted when the config file carries no usable key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Geolocation settings.
///
/// Example TOML:
/// [geolocation]
/// enabled = false
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Set false on machines that must not call the IP-lookup service.
    pub enabled: bool,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeatherMap API key. Absent, empty or placeholder means demo mode.
    pub api_key: Option<String>,

    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

impl Config {
    /// Effective API key, if any.
    ///
    /// Filters out empty and placeholder values; when the file holds no
    /// usable key, falls back to the `OPENWEATHER_API_KEY` environment
    /// variable. `None` puts every weather/AQI operation in demo mode.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
            .map(str::to_string)
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "breeze", "breeze-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Convenience helper: set/replace the API key.
    pub fn upsert_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_placeholder_keys_mean_demo_mode() {
        // The env fallback is not set in the test environment.
        let mut cfg = Config::default();
        assert!(cfg.api_key().is_none());

        cfg.api_key = Some(String::new());
        assert!(cfg.api_key().is_none());

        cfg.api_key = Some("   ".into());
        assert!(cfg.api_key().is_none());

        cfg.api_key = Some(PLACEHOLDER_API_KEY.into());
        assert!(cfg.api_key().is_none());
        assert!(!cfg.is_configured());
    }

    #[test]
    fn real_key_is_returned_trimmed() {
        let mut cfg = Config::default();
        cfg.upsert_api_key(" real-key ".into());

        assert_eq!(cfg.api_key().as_deref(), Some("real-key"));
        assert!(cfg.is_configured());
    }

    #[test]
    fn geolocation_defaults_to_enabled() {
        let cfg: Config = toml::from_str("api_key = \"k\"").expect("minimal config must parse");
        assert!(cfg.geolocation.enabled);

        let cfg: Config =
            toml::from_str("[geolocation]\nenabled = false").expect("config must parse");
        assert!(!cfg.geolocation.enabled);
    }
}
