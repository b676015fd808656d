//! Runtime configuration: optional YAML file, then environment overrides.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::data::DEFAULT_PRESETS_PATH;

pub const DEFAULT_CONFIG_PATH: &str = "cdr-heatmap.yaml";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

pub const CONFIG_PATH_ENV: &str = "CDR_HEATMAP_CONFIG";
pub const BIND_ENV: &str = "CDR_HEATMAP_BIND";
pub const PRESETS_ENV: &str = "CDR_HEATMAP_PRESETS";
pub const WORKERS_ENV: &str = "CDR_HEATMAP_WORKERS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub presets_path: String,
    /// Rayon worker threads for preset sweeps; 0 uses every core.
    pub workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            presets_path: DEFAULT_PRESETS_PATH.to_string(),
            workers: 0,
        }
    }
}

impl AppConfig {
    /// Load from `CDR_HEATMAP_CONFIG` (or `cdr-heatmap.yaml`) and apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env(|var| env::var(var).ok())?;
        Ok(config)
    }

    /// Missing file yields defaults.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            debug!(path, "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_addr = bind;
        }
        if let Some(path) = lookup(PRESETS_ENV) {
            self.presets_path = path;
        }
        if let Some(raw) = lookup(WORKERS_ENV) {
            self.workers = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: WORKERS_ENV,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }
}
