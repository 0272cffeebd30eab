use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{geolocation, model::Coordinates, provider::openweather};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [home]
/// lat = 52.52
/// lon = 13.41
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// OpenWeather API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override for the OpenWeather API root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Override for the IP geolocation endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation_url: Option<String>,

    /// Fixed position used for "my location" lookups instead of IP geolocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<Coordinates>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// The API key from the environment wins over the file.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            Self::parse(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        Ok(cfg.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
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
        let dirs = ProjectDirs::from("dev", "weatherly", "weatherly")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the stored key with `key` when it is set and non-blank.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Returns the API key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(openweather::DEFAULT_BASE_URL)
    }

    pub fn geolocation_url(&self) -> &str {
        self.geolocation_url
            .as_deref()
            .unwrap_or(geolocation::DEFAULT_GEOLOCATION_URL)
    }

    /// Validated home position, if one is configured.
    pub fn home_position(&self) -> Result<Option<Coordinates>> {
        self.home
            .map(|home| Coordinates::new(home.lat, home.lon))
            .transpose()
            .context("Configured home position is out of range")
    }

    pub fn set_home(&mut self, home: Option<Coordinates>) {
        self.home = home;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::parse("").expect("empty config is valid");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.base_url(), openweather::DEFAULT_BASE_URL);
        assert_eq!(cfg.geolocation_url(), geolocation::DEFAULT_GEOLOCATION_URL);
    }

    #[test]
    fn parses_full_config() {
        let cfg = Config::parse(
            r#"
            api_key = "OPEN_KEY"
            base_url = "http://localhost:8080"

            [home]
            lat = 52.52
            lon = 13.41
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.api_key(), Some("OPEN_KEY"));
        assert_eq!(cfg.base_url(), "http://localhost:8080");

        let home = cfg.home_position().unwrap().expect("home is set");
        assert_eq!(home, Coordinates { lat: 52.52, lon: 13.41 });
    }

    #[test]
    fn out_of_range_home_is_an_error() {
        let cfg = Config::parse("[home]\nlat = 120.0\nlon = 0.0\n").expect("config must parse");
        let err = cfg.home_position().unwrap_err();
        assert!(err.to_string().contains("home position is out of range"));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cfg = cfg.with_api_key_override(Some("ENV_KEY".into()));
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cfg = cfg
            .with_api_key_override(Some("   ".into()))
            .with_api_key_override(None);
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn blank_stored_key_counts_as_missing() {
        let cfg = Config {
            api_key: Some("  ".into()),
            ..Config::default()
        };
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn save_format_round_trips() {
        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".into());
        cfg.set_home(Some(Coordinates::new(-33.87, 151.21).unwrap()));

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(!text.contains("base_url"));
        assert_eq!(Config::parse(&text).unwrap(), cfg);
    }
}
