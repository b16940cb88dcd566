//! Gateway configuration management
//! Handles loading and saving the config file

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::DEFAULT_BASE_URL;

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the gateway backend API
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

fn default_backend_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
        }
    }
}

impl Config {
    /// Load config from the default location or specified path
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = Self::config_path(path)?;

        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&raw).context("Failed to parse config file")?;

        debug!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = Self::config_path(path)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(&self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        info!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Resolve the config location: explicit path, then the GATEWAY_CONFIG
    /// env override, then ~/.gateway/config.yml.
    fn config_path(path: Option<&str>) -> Result<PathBuf> {
        if let Some(p) = path {
            return Ok(PathBuf::from(p));
        }

        if let Ok(env_path) = std::env::var("GATEWAY_CONFIG") {
            return Ok(PathBuf::from(env_path));
        }

        let home = dirs::home_dir().context("Cannot find home directory")?;
        Ok(home.join(".gateway").join("config.yml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default_and_writes_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BASE_URL);
        assert!(path.exists());
    }

    #[test]
    fn explicit_path_wins_over_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("env.yml");
        let flag_path = dir.path().join("flag.yml");

        let config = Config {
            backend_url: "http://flag.internal:5000/api".to_string(),
        };
        config.save(Some(flag_path.to_str().unwrap())).unwrap();

        std::env::set_var("GATEWAY_CONFIG", env_path.to_str().unwrap());
        let loaded = Config::load(Some(flag_path.to_str().unwrap()));
        std::env::remove_var("GATEWAY_CONFIG");

        assert_eq!(loaded.unwrap(), config);
        assert!(!env_path.exists());
    }

    #[test]
    fn config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let config = Config {
            backend_url: "http://backend.internal:5000/api".to_string(),
        };
        config.save(Some(path.to_str().unwrap())).unwrap();

        let loaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded, config);
    }
}
