//! Classification and threshold analysis of DWDM vendor export archives.
//!
//! An uploaded ZIP (possibly holding nested ZIPs) is walked once; each
//! spreadsheet or text entry is assigned a report kind from keywords in its
//! path, and the first qualifying entry of each kind is parsed. Analyzers
//! then flag out-of-range readings and [`report`] renders the findings.

/// Threshold analyzers over classified reports
pub mod analysis;
/// Archive classification runtime
pub mod classify;
pub mod config;
/// Core data types
pub mod core;
pub mod error;
/// Bounded file reading
pub mod io;
pub mod logging;
pub mod report;
/// Upload persistence
pub mod storage;
pub mod timeout;

pub use crate::classify::{
    classify_bytes, classify_path, Classifier, ClassifierConfig, ClassifyError,
};
pub use crate::config::MonitorConfig;
pub use crate::core::{ClassificationResult, ReportKind};
pub use crate::error::{MonitorError, Result};
