//! Top-level configuration for the monitor.
//!
//! Every section has defaults, so an empty JSON object is a valid file.

use crate::analysis::ThresholdSpec;
use crate::classify::ClassifierConfig;
use crate::error::{MonitorError, Result};
use crate::storage::StorageConfig;
use crate::timeout::DEFAULT_TIMEOUT_SECONDS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub classifier: ClassifierConfig,
    pub storage: StorageConfig,
    /// Analyzers in report order.
    pub analyzers: Vec<ThresholdSpec>,
    /// Wall-clock budget for classifying one archive.
    pub timeout_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            storage: StorageConfig::default(),
            analyzers: Vec::new(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl MonitorConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| MonitorError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MonitorError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loading configuration");
        Self::from_json(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(MonitorError::InvalidConfig(
                "timeout_seconds must be positive".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for spec in &self.analyzers {
            if !seen.insert(spec.name.as_str()) {
                return Err(MonitorError::InvalidConfig(format!(
                    "duplicate analyzer name {:?}",
                    spec.name
                )));
            }
        }
        Ok(())
    }

    pub fn analyzer_names(&self) -> Vec<&str> {
        self.analyzers.iter().map(|a| a.name.as_str()).collect()
    }
}
