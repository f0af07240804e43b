use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::alert::AlertThresholds;

/// OpenWeatherMap access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API key; unset until `cropguard configure` has run.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Unit system sent to the API: metric, imperial or standard.
    pub units: String,
    /// Language code for condition descriptions.
    pub language: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org".to_string(),
            units: "metric".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Application-level timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between automatic refresh cycles in watch mode.
    pub auto_refresh_interval_secs: u64,
    /// Timeout handed to the position provider.
    pub geolocation_timeout_ms: u64,
    /// Maximum acceptable age of a cached position fix.
    pub geolocation_max_age_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auto_refresh_interval_secs: 30 * 60,
            geolocation_timeout_ms: 10_000,
            geolocation_max_age_ms: 300_000,
        }
    }
}

impl AppConfig {
    pub fn auto_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_interval_secs)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn geolocation_max_age(&self) -> Duration {
        Duration::from_millis(self.geolocation_max_age_ms)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherConfig,
    pub app: AppConfig,
    pub alerts: AlertThresholds,
}

impl Config {
    /// API key, or an actionable error when it was never configured.
    pub fn api_key(&self) -> Result<&str> {
        self.weather.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `cropguard configure` and enter your OpenWeatherMap key."
            )
        })
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
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
        let dirs = ProjectDirs::from("dev", "cropguard", "cropguard-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the API key.
    pub fn set_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key);
    }
}
