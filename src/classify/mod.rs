//! Archive classification runtime.
//!
//! Walks uploaded ZIP archives (recursing into nested ZIPs), assigns each
//! supported entry a [`ReportKind`](crate::core::ReportKind) from its name,
//! and parses the first qualifying entry of every kind.

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod loaders;
pub mod rules;
pub mod walk;

pub use api::{classify_bytes, classify_bytes_with_sink, classify_many, classify_path, Classifier};
pub use config::ClassifierConfig;
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, NullSink, TracingSink};
pub use errors::{ClassifyError, LoadError};
pub use loaders::{Loader, LoaderRegistry, SpreadsheetLoader, TextLoader};
pub use rules::{match_kind, KindRule, RULES};
