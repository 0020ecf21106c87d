//! Line classification for `ldms_ls -l` output.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// One parsed metadata table row, borrowing from the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRow<'a> {
    pub schema: &'a str,
    pub instance: &'a str,
    pub flags: &'a str,
    pub meta_sz: &'a str,
    pub data_sz: &'a str,
    pub uid: &'a str,
    pub gid: &'a str,
    pub perm: &'a str,
    pub update: &'a str,
    pub duration: &'a str,
    pub info: Option<&'a str>,
}

/// The `Total Sets: ...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary<'a> {
    pub total_sets: &'a str,
    pub meta_kb: &'a str,
    pub data_kb: &'a str,
    pub memory_kb: &'a str,
}

/// A metric row: optional flag column, type tag, name and value region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow<'a> {
    pub flag: Option<&'a str>,
    pub tag: &'a str,
    pub name: &'a str,
    pub value: &'a str,
}

/// What a single trimmed, non-blank line is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `Schema  Instance  Flags ... Info` table header.
    MetaBegin,
    /// `------ --------` separator under the table header.
    MetaDashes,
    MetaRow(MetaRow<'a>),
    MetaSummary(Summary<'a>),
    /// `=====` rule closing the table.
    MetaEnd,
    SetHeader { name: &'a str, ts: &'a str },
    Metric(MetricRow<'a>),
}

impl LineKind<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            LineKind::MetaBegin => "meta_begin",
            LineKind::MetaDashes => "meta_dashes",
            LineKind::MetaRow(_) => "meta_row",
            LineKind::MetaSummary(_) => "meta_summary",
            LineKind::MetaEnd => "meta_end",
            LineKind::SetHeader { .. } => "set_header",
            LineKind::Metric(_) => "metric",
        }
    }
}

struct LinePatterns {
    meta_begin: Regex,
    meta_dashes: Regex,
    meta_row: Regex,
    meta_summary: Regex,
    meta_end: Regex,
    set_header: Regex,
    metric: Regex,
}

static PATTERNS: Lazy<LinePatterns> = Lazy::new(|| LinePatterns {
    meta_begin: Regex::new(r"^Schema\s+Instance\s+Flags.*\s+Info").expect("valid meta_begin regex"),
    meta_dashes: Regex::new(r"^[ -]+$").expect("valid meta_dashes regex"),
    meta_row: Regex::new(concat!(
        r"^(?P<schema>\S+)\s+",
        r"(?P<instance>\S+)\s+",
        r"(?P<flags>\D+)\s+",
        r"(?P<meta_sz>\d+)\s+",
        r"(?P<data_sz>\d+)\s+",
        r"(?P<uid>\d+)\s+",
        r"(?P<gid>\d+)\s+",
        r"(?P<perm>-(?:[r-][w-][x-]){3})\s+",
        r"(?P<update>\d+\.\d+)\s+",
        r"(?P<duration>\d+\.\d+)",
        r"(?:\s+(?P<info>.*))?$",
    ))
    .expect("valid meta_row regex"),
    meta_summary: Regex::new(concat!(
        r"^Total Sets: (?P<sets>\d+), ",
        r"Meta Data \(kB\):? (?P<meta>\d+(?:\.\d+)?), ",
        r"Data \(kB\):? (?P<data>\d+(?:\.\d+)?), ",
        r"Memory \(kB\):? (?P<mem>\d+(?:\.\d+)?)",
    ))
    .expect("valid meta_summary regex"),
    meta_end: Regex::new(r"^=+$").expect("valid meta_end regex"),
    set_header: Regex::new(r"^(?P<name>[^:]+): .* last update: (?P<ts>.*)$")
        .expect("valid set_header regex"),
    metric: Regex::new(r"^(?:(?P<flag>\S) )?(?P<tag>\S+)\s+(?P<name>\S+)\s+(?P<value>.*)$")
        .expect("valid metric regex"),
});

/// Ordered line matchers. The first matching alternative wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineGrammar;

impl LineGrammar {
    pub fn new() -> Self {
        Self
    }

    /// Classify a trimmed line; `None` when no alternative matches.
    pub fn classify<'a>(&self, line: &'a str) -> Option<LineKind<'a>> {
        let p = &*PATTERNS;

        if p.meta_begin.is_match(line) {
            return Some(LineKind::MetaBegin);
        }
        if p.meta_dashes.is_match(line) {
            return Some(LineKind::MetaDashes);
        }
        if let Some(caps) = p.meta_row.captures(line) {
            return Some(LineKind::MetaRow(MetaRow {
                schema: group(&caps, "schema"),
                instance: group(&caps, "instance"),
                flags: group(&caps, "flags").trim(),
                meta_sz: group(&caps, "meta_sz"),
                data_sz: group(&caps, "data_sz"),
                uid: group(&caps, "uid"),
                gid: group(&caps, "gid"),
                perm: group(&caps, "perm"),
                update: group(&caps, "update"),
                duration: group(&caps, "duration"),
                info: caps.name("info").map(|m| m.as_str()).filter(|s| !s.is_empty()),
            }));
        }
        if let Some(caps) = p.meta_summary.captures(line) {
            return Some(LineKind::MetaSummary(Summary {
                total_sets: group(&caps, "sets"),
                meta_kb: group(&caps, "meta"),
                data_kb: group(&caps, "data"),
                memory_kb: group(&caps, "mem"),
            }));
        }
        if p.meta_end.is_match(line) {
            return Some(LineKind::MetaEnd);
        }
        if let Some(caps) = p.set_header.captures(line) {
            return Some(LineKind::SetHeader {
                name: group(&caps, "name"),
                ts: group(&caps, "ts"),
            });
        }
        if let Some(caps) = p.metric.captures(line) {
            return Some(LineKind::Metric(MetricRow {
                flag: caps.name("flag").map(|m| m.as_str()),
                tag: group(&caps, "tag"),
                name: group(&caps, "name"),
                value: group(&caps, "value"),
            }));
        }
        None
    }
}

fn group<'a>(caps: &Captures<'a>, name: &str) -> &'a str {
    caps.name(name).map_or("", |m| m.as_str())
}
