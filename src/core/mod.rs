//! Core data types for DWDM archive classification.
//!
//! Report kinds, the tabular representation of vendor spreadsheets, and the
//! per-archive classification result handed to analyzers.

pub mod classification;
pub mod kind;
pub mod table;

pub use classification::{
    ClassificationResult, ClassificationSummary, ClassifiedReport, ReportContent, SummaryEntry,
};
pub use kind::ReportKind;
pub use table::{Cell, Table};
