//! Classification output: one optional parsed report per [`ReportKind`].

use crate::core::kind::ReportKind;
use crate::core::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parsed content of a recognized archive entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "data", rename_all = "lowercase")]
pub enum ReportContent {
    Table(Table),
    Text(String),
}

impl ReportContent {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            ReportContent::Table(t) => Some(t),
            ReportContent::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReportContent::Text(s) => Some(s),
            ReportContent::Table(_) => None,
        }
    }

    /// Data rows for tables, lines for text.
    pub fn record_count(&self) -> usize {
        match self {
            ReportContent::Table(t) => t.len(),
            ReportContent::Text(s) => s.lines().count(),
        }
    }
}

/// A report found in an archive, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReport {
    pub kind: ReportKind,
    pub content: ReportContent,
    /// Entry name inside the container that held it.
    pub source: String,
    /// Names of the nested containers walked to reach the entry, outermost first.
    pub containers: Vec<String>,
}

impl ClassifiedReport {
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    /// `outer.zip!inner.zip!entry.xlsx` style path.
    pub fn display_path(&self) -> String {
        let mut parts: Vec<&str> = self.containers.iter().map(String::as_str).collect();
        parts.push(&self.source);
        parts.join("!")
    }
}

/// Per-archive result. Each kind is either absent or holds the first
/// qualifying entry found during the walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    reports: BTreeMap<ReportKind, ClassifiedReport>,
}

impl ClassificationResult {
    pub(crate) fn from_reports(reports: BTreeMap<ReportKind, ClassifiedReport>) -> Self {
        Self { reports }
    }

    pub fn get(&self, kind: ReportKind) -> Option<&ClassifiedReport> {
        self.reports.get(&kind)
    }

    pub fn is_present(&self, kind: ReportKind) -> bool {
        self.reports.contains_key(&kind)
    }

    pub fn found_kinds(&self) -> Vec<ReportKind> {
        self.reports.keys().copied().collect()
    }

    pub fn missing_kinds(&self) -> Vec<ReportKind> {
        ReportKind::ALL
            .iter()
            .copied()
            .filter(|k| !self.reports.contains_key(k))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Every kind in declaration order, present or not.
    pub fn iter(&self) -> impl Iterator<Item = (ReportKind, Option<&ClassifiedReport>)> {
        ReportKind::ALL.into_iter().map(|k| (k, self.reports.get(&k)))
    }

    /// Replace this result's kinds with every kind present in `later`.
    ///
    /// Used when several archives are analysed together: the most recently
    /// classified archive supplies each kind it contains.
    pub fn overlay(&mut self, later: ClassificationResult) {
        self.reports.extend(later.reports);
    }

    pub fn summary(&self) -> ClassificationSummary {
        let kinds = self
            .iter()
            .map(|(kind, report)| {
                let entry = report.map(|r| SummaryEntry {
                    source: r.source.clone(),
                    path: r.display_path(),
                    records: r.content.record_count(),
                });
                (kind, entry)
            })
            .collect();
        ClassificationSummary { kinds }
    }
}

/// Serializable overview of a [`ClassificationResult`] without the payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub kinds: BTreeMap<ReportKind, Option<SummaryEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub source: String,
    pub path: String,
    pub records: usize,
}
