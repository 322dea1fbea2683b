//! Recursive depth-first walk over (possibly nested) ZIP archives.

use crate::classify::config::ClassifierConfig;
use crate::classify::diagnostics::{Diagnostic, DiagnosticSink};
use crate::classify::errors::{ClassifyError, LoadError};
use crate::classify::loaders::LoaderRegistry;
use crate::classify::rules::{is_container_name, match_kind};
use crate::core::{ClassificationResult, ClassifiedReport, ReportKind};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek};
use std::ops::ControlFlow;
use tracing::{debug, trace};
use zip::ZipArchive;

// Upper bound on the up-front buffer reservation for one entry.
const READ_CAPACITY_HINT: u64 = 64 * 1024;

/// Per-run record of which kinds have been resolved.
#[derive(Debug, Default)]
pub struct Accumulator {
    reports: BTreeMap<ReportKind, ClassifiedReport>,
}

impl Accumulator {
    pub fn is_filled(&self, kind: ReportKind) -> bool {
        self.reports.contains_key(&kind)
    }

    pub fn is_complete(&self) -> bool {
        self.reports.len() == ReportKind::COUNT
    }

    /// Store a report unless its kind is already resolved. Returns whether
    /// it was stored.
    pub fn fill(&mut self, report: ClassifiedReport) -> bool {
        if self.is_filled(report.kind) {
            return false;
        }
        self.reports.insert(report.kind, report);
        true
    }

    pub fn into_result(self) -> ClassificationResult {
        ClassificationResult::from_reports(self.reports)
    }
}

/// One classification run: borrows the registry and config, owns nothing
/// beyond the current path of container names.
pub struct Walker<'a> {
    registry: &'a LoaderRegistry,
    config: &'a ClassifierConfig,
    sink: &'a mut dyn DiagnosticSink,
    containers: Vec<String>,
}

impl<'a> Walker<'a> {
    pub fn new(
        registry: &'a LoaderRegistry,
        config: &'a ClassifierConfig,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            registry,
            config,
            sink,
            containers: Vec::new(),
        }
    }

    /// Open `bytes` as the top-level container and walk it.
    pub fn run(mut self, bytes: &[u8]) -> Result<ClassificationResult, ClassifyError> {
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(ClassifyError::ContainerFormat)?;
        let mut acc = Accumulator::default();
        let _ = self.walk(archive, &mut acc);
        Ok(acc.into_result())
    }

    fn walk<R: Read + Seek>(
        &mut self,
        mut archive: ZipArchive<R>,
        acc: &mut Accumulator,
    ) -> ControlFlow<()> {
        let registry = self.registry;
        for index in 0..archive.len() {
            if self.config.stop_when_complete && acc.is_complete() {
                return ControlFlow::Break(());
            }

            let mut entry = match archive.by_index(index) {
                Ok(e) => e,
                Err(e) => {
                    self.report(ClassifyError::EntryRead {
                        entry: format!("#{}", index),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let name = entry.name().to_string();

            if entry.is_dir() || name.ends_with('/') || name.ends_with('\\') {
                trace!(entry = %name, "Skipping directory marker");
                continue;
            }

            if is_container_name(&name) {
                if self.containers.len() >= self.config.max_depth {
                    self.report(ClassifyError::DepthExceeded {
                        entry: name,
                        max_depth: self.config.max_depth,
                    });
                    continue;
                }
                let declared = entry.size();
                let read = self.read_entry(&mut entry, declared);
                drop(entry);
                let bytes = match read {
                    Ok(b) => b,
                    Err(e) => {
                        self.report(ClassifyError::NestedContainer {
                            entry: name,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };
                match ZipArchive::new(Cursor::new(bytes)) {
                    Ok(nested) => {
                        debug!(
                            entry = %name,
                            depth = self.containers.len() + 1,
                            "Descending into nested container"
                        );
                        self.containers.push(name);
                        let flow = self.walk(nested, acc);
                        self.containers.pop();
                        if flow.is_break() {
                            return flow;
                        }
                    }
                    Err(e) => self.report(ClassifyError::NestedContainer {
                        entry: name,
                        reason: e.to_string(),
                    }),
                }
                continue;
            }

            let Some((extension, loader)) = registry.lookup(&name) else {
                trace!(entry = %name, "Unsupported extension");
                continue;
            };
            let Some(kind) = match_kind(&name, extension) else {
                trace!(entry = %name, "No report kind matched");
                continue;
            };
            if acc.is_filled(kind) {
                trace!(entry = %name, %kind, "Kind already resolved");
                continue;
            }

            let declared = entry.size();
            let read = self.read_entry(&mut entry, declared);
            drop(entry);
            let parsed = read.and_then(|bytes| loader.load(&bytes));
            match parsed {
                Ok(content) => {
                    debug!(
                        entry = %name,
                        %kind,
                        depth = self.containers.len(),
                        "Resolved report kind"
                    );
                    acc.fill(ClassifiedReport {
                        kind,
                        content,
                        source: name,
                        containers: self.containers.clone(),
                    });
                }
                Err(source) => self.report(ClassifyError::Parse {
                    entry: name,
                    kind,
                    source,
                }),
            }
        }
        ControlFlow::Continue(())
    }

    // Reads at most `max_entry_size` bytes; sizes in the header are not trusted.
    fn read_entry(&self, reader: &mut impl Read, declared: u64) -> Result<Vec<u8>, LoadError> {
        let limit = self.config.max_entry_size;
        if declared > limit {
            return Err(LoadError::TooLarge {
                size: declared,
                limit,
            });
        }
        let mut buf = Vec::with_capacity(declared.min(READ_CAPACITY_HINT) as usize);
        reader.take(limit.saturating_add(1)).read_to_end(&mut buf)?;
        if buf.len() as u64 > limit {
            return Err(LoadError::TooLarge {
                size: buf.len() as u64,
                limit,
            });
        }
        Ok(buf)
    }

    fn report(&mut self, error: ClassifyError) {
        self.sink.record(Diagnostic {
            containers: self.containers.clone(),
            error,
        });
    }
}
