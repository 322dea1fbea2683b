//! Min/max threshold checks, optionally joined against a reference table.

use crate::analysis::{AnalysisError, AnalysisOutcome, Analyzer, FINDING_COLUMN};
use crate::classify::loaders::parse_workbook;
use crate::core::{Cell, ClassificationResult, ReportKind, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// A limit: a fixed number, or a column read from the row (or its reference
/// row) holding the limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Fixed(f64),
    Column(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCheck {
    /// Column holding the measured value.
    pub column: String,
    #[serde(default)]
    pub min: Option<Bound>,
    #[serde(default)]
    pub max: Option<Bound>,
}

/// Workbook of per-equipment limits joined to report rows by key columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSpec {
    pub path: PathBuf,
    pub join_on: Vec<String>,
}

/// Configuration for one [`ThresholdAnalyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSpec {
    pub name: String,
    pub kind: ReportKind,
    /// Additional kinds that must be present for the analysis to run.
    #[serde(default)]
    pub also_requires: Vec<ReportKind>,
    pub checks: Vec<ThresholdCheck>,
    #[serde(default)]
    pub reference: Option<ReferenceSpec>,
}

struct Reference {
    table: Table,
    join_on: Vec<String>,
    rows_by_key: HashMap<Vec<String>, usize>,
}

impl Reference {
    fn build(table: Table, join_on: Vec<String>, origin: &str) -> Result<Self, AnalysisError> {
        let mut cols = Vec::with_capacity(join_on.len());
        for key in &join_on {
            let idx = table
                .column_index(key)
                .ok_or_else(|| AnalysisError::Reference {
                    path: origin.to_string(),
                    reason: format!("join column {:?} missing", key),
                })?;
            cols.push(idx);
        }
        let mut rows_by_key = HashMap::new();
        for (i, row) in table.rows.iter().enumerate() {
            // First row wins for duplicate keys.
            rows_by_key.entry(row_key(row, &cols)).or_insert(i);
        }
        Ok(Self {
            table,
            join_on,
            rows_by_key,
        })
    }
}

fn row_key(row: &[Cell], cols: &[usize]) -> Vec<String> {
    cols.iter()
        .map(|&c| row.get(c).map(|v| v.to_string().trim().to_string()).unwrap_or_default())
        .collect()
}

pub struct ThresholdAnalyzer {
    spec: ThresholdSpec,
    reference: Option<Reference>,
}

impl ThresholdAnalyzer {
    /// Build the analyzer, reading the reference workbook if one is configured.
    pub fn new(spec: ThresholdSpec) -> Result<Self, AnalysisError> {
        let reference = match &spec.reference {
            Some(r) => {
                let origin = r.path.display().to_string();
                let bytes = std::fs::read(&r.path).map_err(|e| AnalysisError::Reference {
                    path: origin.clone(),
                    reason: e.to_string(),
                })?;
                let table = parse_workbook(&bytes).map_err(|e| AnalysisError::Reference {
                    path: origin.clone(),
                    reason: e.to_string(),
                })?;
                Some(Reference::build(table, r.join_on.clone(), &origin)?)
            }
            None => None,
        };
        Ok(Self { spec, reference })
    }

    /// Build the analyzer with an already loaded reference table.
    pub fn with_reference_table(
        spec: ThresholdSpec,
        table: Table,
        join_on: Vec<String>,
    ) -> Result<Self, AnalysisError> {
        let reference = Reference::build(table, join_on, &spec.name)?;
        Ok(Self {
            spec,
            reference: Some(reference),
        })
    }

    pub fn spec(&self) -> &ThresholdSpec {
        &self.spec
    }

    fn resolve(
        &self,
        bound: &Bound,
        table: &Table,
        row: &[Cell],
        reference_row: Option<&[Cell]>,
    ) -> Option<f64> {
        match bound {
            Bound::Fixed(v) => Some(*v),
            Bound::Column(name) => table
                .column_index(name)
                .and_then(|c| row.get(c))
                .and_then(Cell::as_f64)
                .or_else(|| {
                    let reference = self.reference.as_ref()?;
                    let c = reference.table.column_index(name)?;
                    reference_row?.get(c)?.as_f64()
                }),
        }
    }

    fn missing_column(&self, column: &str) -> AnalysisError {
        AnalysisError::MissingColumn {
            kind: self.spec.kind,
            column: column.to_string(),
        }
    }
}

impl Analyzer for ThresholdAnalyzer {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn required_kinds(&self) -> Vec<ReportKind> {
        let mut kinds = vec![self.spec.kind];
        kinds.extend(self.spec.also_requires.iter().copied());
        kinds
    }

    fn analyze(&self, result: &ClassificationResult) -> Result<AnalysisOutcome, AnalysisError> {
        let mut sources = Vec::new();
        for kind in self.required_kinds() {
            let report = result.get(kind).ok_or(AnalysisError::MissingInput(kind))?;
            sources.push(report.display_path());
        }
        let kind = self.spec.kind;
        let table = result
            .get(kind)
            .and_then(|r| r.content.as_table())
            .ok_or(AnalysisError::NotTabular { kind })?;

        let mut value_cols = Vec::with_capacity(self.spec.checks.len());
        for check in &self.spec.checks {
            let idx = table
                .column_index(&check.column)
                .ok_or_else(|| self.missing_column(&check.column))?;
            value_cols.push(idx);
        }
        let join_cols = match &self.reference {
            Some(r) => r
                .join_on
                .iter()
                .map(|k| table.column_index(k).ok_or_else(|| self.missing_column(k)))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let mut flagged = Table {
            headers: table.headers.clone(),
            rows: Vec::new(),
        };
        flagged.headers.push(FINDING_COLUMN.to_string());

        for row in &table.rows {
            let reference_row = self.reference.as_ref().and_then(|r| {
                r.rows_by_key
                    .get(&row_key(row, &join_cols))
                    .map(|&i| r.table.rows[i].as_slice())
            });

            let mut findings = Vec::new();
            for (check, &col) in self.spec.checks.iter().zip(&value_cols) {
                let Some(value) = row.get(col).and_then(Cell::as_f64) else {
                    continue;
                };
                let min = check
                    .min
                    .as_ref()
                    .and_then(|b| self.resolve(b, table, row, reference_row));
                let max = check
                    .max
                    .as_ref()
                    .and_then(|b| self.resolve(b, table, row, reference_row));
                if let Some(min) = min.filter(|m| value < *m) {
                    findings.push(format!("{} {} below minimum {}", check.column, value, min));
                }
                if let Some(max) = max.filter(|m| value > *m) {
                    findings.push(format!("{} {} above maximum {}", check.column, value, max));
                }
            }

            if !findings.is_empty() {
                let mut out = row.clone();
                out.push(Cell::Text(findings.join("; ")));
                flagged.rows.push(out);
            }
        }

        debug!(
            analyzer = %self.spec.name,
            rows = table.len(),
            flagged = flagged.len(),
            "Threshold checks applied"
        );

        Ok(AnalysisOutcome {
            analyzer: self.spec.name.clone(),
            kind,
            sources,
            total_rows: table.len(),
            flagged,
        })
    }
}
