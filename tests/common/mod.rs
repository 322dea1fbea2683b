//! Fixture builders shared by the integration tests.
//!
//! Archives and workbooks are generated in memory so the tests need no
//! checked-in samples.

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Builds a ZIP archive entry by entry, preserving insertion order.
#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<(String, Option<Vec<u8>>)>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.to_string(), Some(bytes.into())));
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, bytes) in self.entries {
            match bytes {
                Some(bytes) => {
                    writer.start_file(name, options).unwrap();
                    writer.write_all(&bytes).unwrap();
                }
                None => writer.add_directory(name, options).unwrap(),
            }
        }
        writer.finish().unwrap().into_inner()
    }
}

/// A one-sheet workbook. Cells that parse as numbers are written as numbers.
pub fn xlsx(headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            match value.parse::<f64>() {
                Ok(n) => sheet.write_number(r, col as u16, n).unwrap(),
                Err(_) => sheet.write_string(r, col as u16, *value).unwrap(),
            };
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// CPU usage sheet with three boards, one above its maximum threshold.
pub fn cpu_sheet() -> Vec<u8> {
    xlsx(
        &["NE Name", "Board", "CPU Usage(%)", "Max threshold"],
        &[
            &["NE-1", "SCC", "35", "80"],
            &["NE-1", "LINE-1", "92", "80"],
            &["NE-2", "SCC", "41", "80"],
        ],
    )
}

pub fn fan_sheet() -> Vec<u8> {
    xlsx(
        &["NE Name", "Fan", "Value of Fan Rotate Speed(Rps)"],
        &[&["NE-1", "FAN-1", "48"], &["NE-2", "FAN-1", "51"]],
    )
}

/// The `site1.zip` layout: two top-level sheets and a nested `logs.zip`
/// holding a WASON log and a second CPU sheet.
pub fn site1_zip() -> Vec<u8> {
    let logs = ZipBuilder::new()
        .file("wason_trace.txt", "WASON trace\nlink up\n")
        .file("CPU_Report_dup.xlsx", xlsx(&["Board"], &[&["DUP"]]))
        .build();
    ZipBuilder::new()
        .file("CPU_Report.xlsx", cpu_sheet())
        .file("fan_fan.xls", fan_sheet())
        .file("logs.zip", logs)
        .build()
}
