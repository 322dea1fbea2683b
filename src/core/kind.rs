//! Report kinds recognized inside uploaded archives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed report categories produced by DWDM element exports.
///
/// Declaration order matters: it is the "first-computed" order used when a
/// filename hits several kinds and none of the ranked rules decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Cpu,
    Fan,
    Msu,
    Client,
    Line,
    /// WASON session log / terminal transcript.
    Wason,
    Osc,
    /// Fault management (alarm) export.
    Fm,
    /// Optical attenuation report.
    Atten,
    /// Preset status captured from a terminal session.
    Preset,
    Apo,
}

impl ReportKind {
    pub const COUNT: usize = 11;

    pub const ALL: [ReportKind; Self::COUNT] = [
        ReportKind::Cpu,
        ReportKind::Fan,
        ReportKind::Msu,
        ReportKind::Client,
        ReportKind::Line,
        ReportKind::Wason,
        ReportKind::Osc,
        ReportKind::Fm,
        ReportKind::Atten,
        ReportKind::Preset,
        ReportKind::Apo,
    ];

    /// Stable lowercase identifier (`cpu`, `fan`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Cpu => "cpu",
            ReportKind::Fan => "fan",
            ReportKind::Msu => "msu",
            ReportKind::Client => "client",
            ReportKind::Line => "line",
            ReportKind::Wason => "wason",
            ReportKind::Osc => "osc",
            ReportKind::Fm => "fm",
            ReportKind::Atten => "atten",
            ReportKind::Preset => "preset",
            ReportKind::Apo => "apo",
        }
    }

    /// Human-facing label used in reports and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Cpu => "CPU",
            ReportKind::Fan => "FAN",
            ReportKind::Msu => "MSU",
            ReportKind::Client => "Client board",
            ReportKind::Line => "Line board",
            ReportKind::Wason => "WASON log",
            ReportKind::Osc => "OSC optical",
            ReportKind::Fm => "Fault management",
            ReportKind::Atten => "Optical attenuation",
            ReportKind::Preset => "Preset status",
            ReportKind::Apo => "APO remnant",
        }
    }

    /// Position in [`ReportKind::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ReportKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| format!("unknown report kind: {}", s))
    }
}
