//! Entry points for classifying archives.

use crate::classify::config::ClassifierConfig;
use crate::classify::diagnostics::{DiagnosticSink, TracingSink};
use crate::classify::errors::ClassifyError;
use crate::classify::loaders::LoaderRegistry;
use crate::classify::walk::Walker;
use crate::core::ClassificationResult;
use crate::error::{MonitorError, Result};
use crate::io::{read_archive, IOLimits};
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, info_span};

/// Reusable classifier: a loader registry plus configuration.
///
/// Holds no per-run state, so one instance may classify many archives,
/// including concurrently from several threads.
pub struct Classifier {
    registry: LoaderRegistry,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let registry = LoaderRegistry::from_config(&config)
            .map_err(|e| MonitorError::InvalidConfig(e.to_string()))?;
        Ok(Self { registry, config })
    }

    /// Use a custom registry (extra extensions, replacement loaders).
    pub fn with_registry(config: ClassifierConfig, registry: LoaderRegistry) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Classify with recoverable problems logged through `tracing`.
    pub fn classify(
        &self,
        bytes: &[u8],
    ) -> std::result::Result<ClassificationResult, ClassifyError> {
        self.classify_with_sink(bytes, &mut TracingSink)
    }

    pub fn classify_with_sink(
        &self,
        bytes: &[u8],
        sink: &mut dyn DiagnosticSink,
    ) -> std::result::Result<ClassificationResult, ClassifyError> {
        let span = info_span!("classify", size = bytes.len());
        let _guard = span.enter();
        let result = Walker::new(&self.registry, &self.config, sink).run(bytes)?;
        info!(
            found = result.found_kinds().len(),
            missing = result.missing_kinds().len(),
            "Archive classified"
        );
        Ok(result)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_registry(ClassifierConfig::default(), LoaderRegistry::default())
    }
}

/// Classify an in-memory archive.
pub fn classify_bytes(bytes: &[u8], config: &ClassifierConfig) -> Result<ClassificationResult> {
    let classifier = Classifier::new(config.clone())?;
    Ok(classifier.classify(bytes)?)
}

/// Classify an in-memory archive, routing recoverable problems to `sink`.
pub fn classify_bytes_with_sink(
    bytes: &[u8],
    config: &ClassifierConfig,
    sink: &mut dyn DiagnosticSink,
) -> Result<ClassificationResult> {
    let classifier = Classifier::new(config.clone())?;
    Ok(classifier.classify_with_sink(bytes, sink)?)
}

/// Read an archive from disk under `limits`, then classify it.
pub fn classify_path(
    path: &Path,
    config: &ClassifierConfig,
    limits: &IOLimits,
) -> Result<ClassificationResult> {
    let bytes = read_archive(path, limits)?;
    classify_bytes(&bytes, config)
}

/// Classify several archives in parallel. Each archive gets its own
/// accumulator; results are returned in input order.
pub fn classify_many<B>(
    archives: &[B],
    config: &ClassifierConfig,
) -> Result<Vec<Result<ClassificationResult>>>
where
    B: AsRef<[u8]> + Sync,
{
    let classifier = Classifier::new(config.clone())?;
    Ok(archives
        .par_iter()
        .map(|a| classifier.classify(a.as_ref()).map_err(MonitorError::from))
        .collect())
}
