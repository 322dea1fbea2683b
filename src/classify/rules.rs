//! Filename rules mapping archive entries to report kinds.
//!
//! The rule table is evaluated by [`match_kind`]: every rule whose keywords
//! occur in the lowercased entry path is a hit, the extension gate decides
//! whether the hit is ranked, unranked or dropped, and the lowest
//! `(rank, declaration index)` wins.

use crate::core::ReportKind;
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

/// Extensions parsed as spreadsheets.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &[".xlsx", ".xls"];
/// Extensions parsed as text.
pub const TEXT_EXTENSIONS: &[&str] = &[".txt"];
/// Extensions of nested archives that are opened and walked.
pub const CONTAINER_EXTENSIONS: &[&str] = &[".zip"];

/// Whether an entry name denotes a nested container.
pub fn is_container_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    CONTAINER_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}

/// How an entry's extension affects a keyword hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionGate {
    /// The rule's rank applies for every extension.
    Any,
    /// The rank applies for these extensions; otherwise the hit is unranked.
    Prefer(&'static [&'static str]),
    /// The hit is discarded for any other extension.
    Require(&'static [&'static str]),
}

/// One row of the kind registry.
#[derive(Debug, Clone, Copy)]
pub struct KindRule {
    pub kind: ReportKind,
    pub keywords: &'static [&'static str],
    pub gate: ExtensionGate,
    /// Lower wins. `None` hits are only chosen when no ranked rule hit.
    pub rank: Option<u8>,
}

/// The registry, in [`ReportKind::ALL`] order.
pub static RULES: [KindRule; ReportKind::COUNT] = [
    KindRule {
        kind: ReportKind::Cpu,
        keywords: &["cpu"],
        gate: ExtensionGate::Any,
        rank: Some(4),
    },
    KindRule {
        kind: ReportKind::Fan,
        keywords: &["fan"],
        gate: ExtensionGate::Any,
        rank: Some(3),
    },
    KindRule {
        kind: ReportKind::Msu,
        keywords: &["msu"],
        gate: ExtensionGate::Any,
        rank: Some(5),
    },
    KindRule {
        kind: ReportKind::Client,
        keywords: &["client", "client board"],
        gate: ExtensionGate::Any,
        rank: Some(6),
    },
    KindRule {
        kind: ReportKind::Line,
        keywords: &["line", "line board"],
        gate: ExtensionGate::Require(SPREADSHEET_EXTENSIONS),
        rank: Some(2),
    },
    KindRule {
        kind: ReportKind::Wason,
        keywords: &["wason", "log"],
        gate: ExtensionGate::Prefer(TEXT_EXTENSIONS),
        rank: Some(0),
    },
    KindRule {
        kind: ReportKind::Osc,
        keywords: &["osc", "osc optical"],
        gate: ExtensionGate::Any,
        rank: Some(7),
    },
    KindRule {
        kind: ReportKind::Fm,
        keywords: &["fm", "alarm", "fault management"],
        gate: ExtensionGate::Any,
        rank: Some(8),
    },
    KindRule {
        kind: ReportKind::Atten,
        keywords: &[
            "optical attenuation report",
            "optical_attenuation_report",
            "optical attenuation",
        ],
        gate: ExtensionGate::Any,
        rank: Some(9),
    },
    KindRule {
        kind: ReportKind::Preset,
        keywords: &["mobaxterm", "moba xterm", "moba"],
        gate: ExtensionGate::Prefer(TEXT_EXTENSIONS),
        rank: Some(1),
    },
    KindRule {
        kind: ReportKind::Apo,
        keywords: &["apo"],
        gate: ExtensionGate::Any,
        rank: None,
    },
];

impl KindRule {
    /// Effective rank for an extension: `None` drops the hit, `Some(None)`
    /// keeps it unranked.
    fn rank_for(&self, extension: &str) -> Option<Option<u8>> {
        match self.gate {
            ExtensionGate::Any => Some(self.rank),
            ExtensionGate::Prefer(exts) => {
                if exts.contains(&extension) {
                    Some(self.rank)
                } else {
                    Some(None)
                }
            }
            ExtensionGate::Require(exts) => {
                if exts.contains(&extension) {
                    Some(self.rank)
                } else {
                    None
                }
            }
        }
    }
}

struct KeywordMatcher {
    automaton: AhoCorasick,
    // pattern id -> rule index
    owners: Vec<usize>,
}

static MATCHER: Lazy<KeywordMatcher> = Lazy::new(|| {
    let mut patterns = Vec::new();
    let mut owners = Vec::new();
    for (idx, rule) in RULES.iter().enumerate() {
        for kw in rule.keywords {
            patterns.push(*kw);
            owners.push(idx);
        }
    }
    let automaton = AhoCorasick::new(&patterns).expect("valid keyword automaton");
    KeywordMatcher { automaton, owners }
});

/// Rule indices whose keywords occur in `path` (case-insensitive), in
/// declaration order.
fn hit_rules(path: &str) -> Vec<usize> {
    let lowered = path.to_lowercase();
    let mut hits = [false; ReportKind::COUNT];
    for m in MATCHER.automaton.find_overlapping_iter(&lowered) {
        hits[MATCHER.owners[m.pattern().as_usize()]] = true;
    }
    hits.iter()
        .enumerate()
        .filter_map(|(i, hit)| hit.then_some(i))
        .collect()
}

/// Kinds whose keywords occur in `path`, ignoring extension gates.
pub fn keyword_hits(path: &str) -> Vec<ReportKind> {
    hit_rules(path).into_iter().map(|i| RULES[i].kind).collect()
}

/// Classify an entry path. `extension` is the lowercase registry extension
/// (with leading dot) the entry was matched under.
pub fn match_kind(path: &str, extension: &str) -> Option<ReportKind> {
    const UNRANKED: u16 = u16::MAX;
    hit_rules(path)
        .into_iter()
        .filter_map(|i| {
            RULES[i]
                .rank_for(extension)
                .map(|rank| (rank.map_or(UNRANKED, u16::from), i))
        })
        .min()
        .map(|(_, i)| RULES[i].kind)
}
