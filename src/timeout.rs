//! Wall-clock budgets around classification.
//!
//! The classifier itself has no cancellation points. Callers that need
//! bounded latency run it on a blocking thread and stop waiting when the
//! budget expires.

use crate::classify::{Classifier, ClassifierConfig};
use crate::core::ClassificationResult;
use crate::error::{MonitorError, Result};
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

/// Default timeout duration in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300; // 5 minutes

/// Timeout configuration for an operation
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the operation
    pub duration: Duration,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self {
            duration: Duration::from_secs(seconds),
            operation_name: operation.into(),
        }
    }

    pub fn default_timeout(operation: impl Into<String>) -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS, operation)
    }
}

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(
        "Starting operation '{}' with timeout of {}s",
        config.operation_name,
        config.duration.as_secs()
    );

    match timeout(config.duration, future).await {
        Ok(result) => result,
        Err(_) => {
            error!(
                "Operation '{}' timed out after {}s",
                config.operation_name,
                config.duration.as_secs()
            );
            Err(MonitorError::Timeout {
                seconds: config.duration.as_secs(),
            })
        }
    }
}

/// Classify on a blocking thread, giving up after `seconds`.
///
/// On expiry the walk keeps running to completion in the background; only
/// the caller stops waiting for it.
pub async fn classify_with_timeout(
    classifier: Arc<Classifier>,
    bytes: Bytes,
    seconds: u64,
) -> Result<ClassificationResult> {
    let config = TimeoutConfig::new(seconds, "classify archive");
    with_timeout(config, async move {
        tokio::task::spawn_blocking(move || classifier.classify(&bytes))
            .await
            .map_err(|e| MonitorError::Internal(e.to_string()))?
            .map_err(MonitorError::from)
    })
    .await
}

/// Convenience wrapper building a classifier from `config`.
pub async fn classify_bytes_with_timeout(
    bytes: Bytes,
    config: &ClassifierConfig,
    seconds: u64,
) -> Result<ClassificationResult> {
    let classifier = Arc::new(Classifier::new(config.clone())?);
    classify_with_timeout(classifier, bytes, seconds).await
}
