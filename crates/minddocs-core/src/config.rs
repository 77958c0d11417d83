use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ApiError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_SPLASH_MILLIS: u64 = 1500;
pub const API_URL_ENV: &str = "MINDDOCS_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub splash_millis: Option<u64>,
    pub export_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Backend base URL: explicit override, then `MINDDOCS_API_URL`, then
    /// the config file, then the default.
    pub fn resolve_api_url(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| std::env::var(API_URL_ENV).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn splash_duration(&self) -> Duration {
        Duration::from_millis(self.splash_millis.unwrap_or(DEFAULT_SPLASH_MILLIS))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("minddocs.log")),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine config directory",
            ))
        })?;

        Ok(config_dir.join("minddocs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.splash_duration(), Duration::from_millis(1500));
        assert_eq!(config.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minddocs").join("config.json");
        let config = Config {
            api_url: Some("http://docs.internal:9000".to_string()),
            splash_millis: Some(250),
            export_dir: Some(PathBuf::from("/tmp/reports")),
            log_file: None,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_flag_wins_over_file() {
        let config = Config {
            api_url: Some("http://from-file".to_string()),
            ..Config::default()
        };
        assert_eq!(config.resolve_api_url(Some("http://from-flag")), "http://from-flag");
    }

    // The only test touching the process environment, so it owns every
    // env-dependent case.
    #[test]
    fn test_api_url_precedence_env_file_default() {
        let from_file = Config {
            api_url: Some("http://from-file".to_string()),
            ..Config::default()
        };

        std::env::set_var(API_URL_ENV, "http://from-env");
        assert_eq!(from_file.resolve_api_url(None), "http://from-env");
        assert_eq!(from_file.resolve_api_url(Some("http://from-flag")), "http://from-flag");

        std::env::set_var(API_URL_ENV, "");
        assert_eq!(from_file.resolve_api_url(None), "http://from-file");

        std::env::remove_var(API_URL_ENV);
        assert_eq!(from_file.resolve_api_url(None), "http://from-file");
        assert_eq!(Config::default().resolve_api_url(None), DEFAULT_API_URL);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ api_url: ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
