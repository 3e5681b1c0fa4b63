//! In-process engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Period of the assignment expiry sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Longest allowed root-to-leaf role chain
    #[serde(default = "default_max_hierarchy_depth")]
    pub max_hierarchy_depth: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            max_hierarchy_depth: default_max_hierarchy_depth(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl EngineConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be greater than 0".to_string());
        }
        if self.max_hierarchy_depth == 0 {
            return Err("max_hierarchy_depth must be at least 1".to_string());
        }
        if self.max_page_size == 0 {
            return Err("max_page_size must be greater than 0".to_string());
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(format!(
                "default_page_size must be within 1..={}",
                self.max_page_size
            ));
        }
        Ok(())
    }
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_hierarchy_depth() -> usize {
    5
}

fn default_page_size() -> u64 {
    20
}

fn default_max_page_size() -> u64 {
    100
}
