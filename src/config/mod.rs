//! Configuration management
//!
//! Configuration is read from a YAML file or from `RBAC_*` environment
//! variables and validated before use.

pub mod models;

pub use models::*;

use crate::utils::error::{RbacError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RbacError::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| RbacError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        if let Ok(url) = std::env::var("RBAC_API_BASE_URL") {
            config.client.base_url = url;
        }
        if let Some(secs) = env_parse::<u64>("RBAC_API_TIMEOUT_SECS")? {
            config.client.timeout_secs = secs;
        }
        if let Some(secs) = env_parse::<u64>("RBAC_SWEEP_INTERVAL_SECS")? {
            config.engine.sweep_interval_secs = secs;
        }
        if let Some(depth) = env_parse::<usize>("RBAC_MAX_HIERARCHY_DEPTH")? {
            config.engine.max_hierarchy_depth = depth;
        }
        if let Ok(level) = std::env::var("RBAC_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(json) = env_parse::<bool>("RBAC_LOG_JSON")? {
            config.logging.json = json;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.client
            .validate()
            .map_err(|e| RbacError::config(format!("Client config error: {}", e)))?;
        self.engine
            .validate()
            .map_err(|e| RbacError::config(format!("Engine config error: {}", e)))?;

        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| RbacError::config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RbacError::config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
