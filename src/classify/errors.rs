//! Error taxonomy for archive classification.
//!
//! Only [`ClassifyError::ContainerFormat`] is ever returned to callers. The
//! other variants describe conditions that the walker absorbs and reports to a
//! [`DiagnosticSink`](crate::classify::diagnostics::DiagnosticSink).

use crate::core::ReportKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The top-level input is not a readable container.
    #[error("Invalid container format: {0}")]
    ContainerFormat(#[source] zip::result::ZipError),

    /// A nested member named like a container could not be opened.
    #[error("Nested container {entry} could not be opened: {reason}")]
    NestedContainer { entry: String, reason: String },

    /// A nested container sits deeper than the configured limit.
    #[error("Nested container {entry} exceeds maximum depth {max_depth}")]
    DepthExceeded { entry: String, max_depth: usize },

    /// A recognized entry failed to load under its kind's loader.
    #[error("Failed to parse {entry} as {kind}: {source}")]
    Parse {
        entry: String,
        kind: ReportKind,
        #[source]
        source: LoadError,
    },

    /// The entry's bytes could not be read out of its container.
    #[error("Failed to read entry {entry}: {reason}")]
    EntryRead { entry: String, reason: String },
}

impl ClassifyError {
    /// Whether the walk continues after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ClassifyError::ContainerFormat(_))
    }
}

/// Failures raised by individual loaders.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("unknown text encoding label: {0}")]
    UnknownEncoding(String),

    #[error("entry of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}
