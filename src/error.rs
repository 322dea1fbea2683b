//! Error types for the DWDM monitor.
//!
//! Each subsystem has its own `thiserror` enum; [`MonitorError`] wraps them
//! for callers that drive several subsystems (the CLI, timeouts).

use crate::analysis::AnalysisError;
use crate::classify::ClassifyError;
use crate::io::error::IoError;
use crate::storage::StorageError;
use thiserror::Error;

/// Main error type for DWDM monitor operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The top-level archive could not be classified
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// Bounded archive reading failed
    #[error(transparent)]
    Io(#[from] IoError),

    /// Upload storage errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Analyzer errors
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Configuration could not be loaded or is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation exceeded its wall-clock budget
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for DWDM monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;
