//! Extension-keyed loaders turning raw entry bytes into report content.

use crate::classify::config::ClassifierConfig;
use crate::classify::errors::LoadError;
use crate::classify::rules::{SPREADSHEET_EXTENSIONS, TEXT_EXTENSIONS};
use crate::core::{Cell, ReportContent, Table};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use encoding_rs::Encoding;
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;

/// Parses the bytes of one archive entry.
pub trait Loader: Send + Sync {
    fn load(&self, bytes: &[u8]) -> Result<ReportContent, LoadError>;
}

/// Reads the first worksheet of an `.xlsx`/`.xls` workbook, using its first
/// row as the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetLoader;

impl Loader for SpreadsheetLoader {
    fn load(&self, bytes: &[u8]) -> Result<ReportContent, LoadError> {
        parse_workbook(bytes).map(ReportContent::Table)
    }
}

/// Parse the first worksheet of a workbook. The container type is sniffed
/// from the content, so a mislabelled `.xls` that is really OOXML still loads.
pub fn parse_workbook(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(first) => header_names(first),
        None => return Ok(Table::default()),
    };
    let body = rows
        .map(|r| r.iter().map(to_cell).collect::<Vec<_>>())
        .collect();
    Ok(Table::new(headers, body))
}

// Blank headers become "Unnamed: N"; repeats get ".1", ".2", ... suffixes.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    row.iter()
        .enumerate()
        .map(|(i, d)| {
            let raw = d.to_string();
            let base = if raw.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                raw
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

/// Decodes text, replacing malformed sequences instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct TextLoader {
    encoding: &'static Encoding,
}

impl TextLoader {
    pub fn new(label: &str) -> Result<Self, LoadError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| LoadError::UnknownEncoding(label.to_string()))?;
        Ok(Self { encoding })
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl Loader for TextLoader {
    fn load(&self, bytes: &[u8]) -> Result<ReportContent, LoadError> {
        // A BOM overrides the configured encoding.
        let (text, used, had_errors) = self.encoding.decode(bytes);
        if had_errors {
            debug!(
                encoding = used.name(),
                "Replaced malformed sequences while decoding text"
            );
        }
        Ok(ReportContent::Text(text.into_owned()))
    }
}

/// Mapping from lowercase extension (with leading dot) to loader.
pub struct LoaderRegistry {
    loaders: Vec<(String, Box<dyn Loader>)>,
}

impl LoaderRegistry {
    pub fn empty() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Spreadsheet loader for `.xlsx`/`.xls`, text loader for `.txt`.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, LoadError> {
        let text = TextLoader::new(&config.text_encoding)?;
        let mut registry = Self::empty();
        for ext in SPREADSHEET_EXTENSIONS {
            registry.register(ext, SpreadsheetLoader);
        }
        for ext in TEXT_EXTENSIONS {
            registry.register(ext, text);
        }
        Ok(registry)
    }

    /// Add or replace the loader for an extension.
    pub fn register(&mut self, extension: &str, loader: impl Loader + 'static) {
        let ext = normalize_extension(extension);
        self.loaders.retain(|(e, _)| *e != ext);
        self.loaders.push((ext, Box::new(loader)));
    }

    /// Longest registered extension that `name` ends with.
    pub fn lookup(&self, name: &str) -> Option<(&str, &dyn Loader)> {
        let lowered = name.to_lowercase();
        self.loaders
            .iter()
            .filter(|(ext, _)| lowered.ends_with(ext.as_str()))
            .max_by_key(|(ext, _)| ext.len())
            .map(|(ext, loader)| (ext.as_str(), loader.as_ref()))
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.loaders.iter().map(|(e, _)| e.as_str())
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for ext in SPREADSHEET_EXTENSIONS {
            registry.register(ext, SpreadsheetLoader);
        }
        for ext in TEXT_EXTENSIONS {
            registry.register(ext, TextLoader::default());
        }
        registry
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
