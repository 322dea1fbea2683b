//! Sinks for recoverable problems absorbed during a classification walk.

use crate::classify::errors::ClassifyError;
use tracing::warn;

/// A swallowed error and where it happened.
#[derive(Debug)]
pub struct Diagnostic {
    /// Names of enclosing nested containers, outermost first.
    pub containers: Vec<String>,
    pub error: ClassifyError,
}

impl Diagnostic {
    pub fn depth(&self) -> usize {
        self.containers.len()
    }
}

/// Receives recoverable errors. The walk never depends on what the sink does.
pub trait DiagnosticSink {
    fn record(&mut self, diagnostic: Diagnostic);
}

/// Logs every diagnostic at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        warn!(
            depth = diagnostic.depth(),
            containers = %diagnostic.containers.join("!"),
            error = %diagnostic.error,
            "Skipped archive member"
        );
    }
}

/// Keeps diagnostics in memory for callers that want to inspect them.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _diagnostic: Diagnostic) {}
}
