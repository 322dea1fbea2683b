//! Configuration for the archive classifier.

use serde::{Deserialize, Serialize};

/// Tunables for one classification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Maximum nesting depth for containers inside the top-level archive
    /// (default: 8). The top-level archive is depth 0.
    pub max_depth: usize,
    /// Largest uncompressed entry that will be read into memory
    /// (default: 268435456 = 256MB).
    pub max_entry_size: u64,
    /// WHATWG label of the encoding used to decode `.txt` entries
    /// (default: "utf-8").
    pub text_encoding: String,
    /// Stop walking once every kind is filled (default: true).
    pub stop_when_complete: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_entry_size: 256 * 1024 * 1024,
            text_encoding: "utf-8".to_string(),
            stop_when_complete: true,
        }
    }
}
