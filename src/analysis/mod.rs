//! Analyzers that flag out-of-threshold readings in classified reports.
//!
//! An analyzer consumes one or two kinds from a
//! [`ClassificationResult`] and returns the rows it considers abnormal. The
//! thresholds themselves come from configuration or from reference
//! workbooks; nothing here hard-codes equipment limits.

pub mod threshold;

use crate::core::{ClassificationResult, ReportKind, Table};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub use threshold::{Bound, ReferenceSpec, ThresholdAnalyzer, ThresholdCheck, ThresholdSpec};

/// Name of the column appended to flagged rows.
pub const FINDING_COLUMN: &str = "Finding";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Absence is reported the same way whatever the cause (no file,
    /// unparseable file, wrong extension).
    #[error("no qualifying {} file was found", .0.label())]
    MissingInput(ReportKind),

    #[error("{kind} report is text, expected a table")]
    NotTabular { kind: ReportKind },

    #[error("column {column:?} not found in {kind} report")]
    MissingColumn { kind: ReportKind, column: String },

    #[error("reference table {path}: {reason}")]
    Reference { path: String, reason: String },
}

/// Flagged rows produced by one analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analyzer: String,
    pub kind: ReportKind,
    /// Archive entries the analyzer read, in `required_kinds` order.
    pub sources: Vec<String>,
    pub total_rows: usize,
    /// Input rows outside their bounds, plus a [`FINDING_COLUMN`].
    pub flagged: Table,
}

impl AnalysisOutcome {
    pub fn is_clean(&self) -> bool {
        self.flagged.is_empty()
    }
}

pub trait Analyzer: Send + Sync {
    fn name(&self) -> &str;

    /// Kinds that must be present; the first is the one analysed.
    fn required_kinds(&self) -> Vec<ReportKind>;

    fn analyze(&self, result: &ClassificationResult) -> Result<AnalysisOutcome, AnalysisError>;
}

/// Outcomes of running several analyzers over one classification.
#[derive(Debug, Default)]
pub struct AnalysisRun {
    pub outcomes: Vec<AnalysisOutcome>,
    /// Analyzers that could not run, with the reason.
    pub skipped: Vec<(String, AnalysisError)>,
}

/// Run every analyzer; failures are collected rather than aborting the run.
pub fn run_analyzers(
    analyzers: &[Box<dyn Analyzer>],
    result: &ClassificationResult,
) -> AnalysisRun {
    let mut run = AnalysisRun::default();
    for analyzer in analyzers {
        match analyzer.analyze(result) {
            Ok(outcome) => {
                info!(
                    analyzer = analyzer.name(),
                    flagged = outcome.flagged.len(),
                    total = outcome.total_rows,
                    "Analyzer finished"
                );
                run.outcomes.push(outcome);
            }
            Err(e) => {
                warn!(analyzer = analyzer.name(), error = %e, "Analyzer skipped");
                run.skipped.push((analyzer.name().to_string(), e));
            }
        }
    }
    run
}

/// Build analyzers from configuration, loading any reference workbooks.
pub fn build_analyzers(specs: &[ThresholdSpec]) -> Result<Vec<Box<dyn Analyzer>>, AnalysisError> {
    specs
        .iter()
        .map(|s| ThresholdAnalyzer::new(s.clone()).map(|a| Box::new(a) as Box<dyn Analyzer>))
        .collect()
}
