//! Plain-text and JSON summary of an analysis run.

use crate::analysis::{AnalysisOutcome, AnalysisRun};
use crate::core::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

pub const DEFAULT_TITLE: &str = "DWDM Network Summary Report";
pub const CLEAN_MESSAGE: &str = "No abnormal values found.";

/// One analyzer's section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section {
    Analyzed(AnalysisOutcome),
    Skipped { analyzer: String, reason: String },
}

impl Section {
    pub fn analyzer(&self) -> &str {
        match self {
            Section::Analyzed(o) => &o.analyzer,
            Section::Skipped { analyzer, .. } => analyzer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// Archives the classification was drawn from.
    pub archives: Vec<String>,
    pub sections: Vec<Section>,
}

impl SummaryReport {
    /// Build a report from a run. Sections follow analyzer order: `order`
    /// lists analyzer names as configured; names not in `order` go last.
    pub fn from_run(run: AnalysisRun, order: &[&str], archives: Vec<String>) -> Self {
        let mut sections: Vec<Section> = run
            .outcomes
            .into_iter()
            .map(Section::Analyzed)
            .chain(run.skipped.into_iter().map(|(analyzer, e)| Section::Skipped {
                analyzer,
                reason: e.to_string(),
            }))
            .collect();
        sections.sort_by_key(|s| {
            order
                .iter()
                .position(|n| *n == s.analyzer())
                .unwrap_or(usize::MAX)
        });
        Self {
            title: DEFAULT_TITLE.to_string(),
            generated_at: Utc::now(),
            archives,
            sections,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn flagged_rows(&self) -> usize {
        self.sections
            .iter()
            .map(|s| match s {
                Section::Analyzed(o) => o.flagged.len(),
                Section::Skipped { .. } => 0,
            })
            .sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Render as plain text.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(
            f,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        if !self.archives.is_empty() {
            writeln!(f, "Archives: {}", self.archives.join(", "))?;
        }
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.analyzer())?;
            writeln!(f, "{}", "-".repeat(section.analyzer().chars().count()))?;
            match section {
                Section::Analyzed(outcome) => write_outcome(f, outcome)?,
                Section::Skipped { reason, .. } => writeln!(f, "Skipped: {}", reason)?,
            }
        }
        Ok(())
    }
}

fn write_outcome(f: &mut fmt::Formatter<'_>, outcome: &AnalysisOutcome) -> fmt::Result {
    if !outcome.sources.is_empty() {
        writeln!(f, "Source: {}", outcome.sources.join(", "))?;
    }
    if outcome.is_clean() {
        return writeln!(f, "{}", CLEAN_MESSAGE);
    }
    writeln!(
        f,
        "{} of {} rows flagged",
        outcome.flagged.len(),
        outcome.total_rows
    )?;
    f.write_str(&render_table(&outcome.flagged))
}

/// Left-aligned columns separated by two spaces.
pub fn render_table(table: &Table) -> String {
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let mut line = |cells: &[String]| {
        let mut text = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                text.push_str("  ");
            }
            let width = widths.get(i).copied().unwrap_or(0);
            let _ = write!(text, "{:<width$}", cell, width = width);
        }
        out.push_str(text.trim_end());
        out.push('\n');
    };
    line(&table.headers);
    for row in &rendered {
        line(row);
    }
    out
}
