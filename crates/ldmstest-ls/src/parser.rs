//! Section-aware parser over [`LineGrammar`].

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::decoder::TypeTag;
use crate::error::{LsError, LsResult};
use crate::grammar::{LineGrammar, LineKind, MetricRow};
use crate::record::{Metadata, SetRecord};

/// Parsed sets keyed by instance or set name, in order of first appearance.
pub type LsSets = IndexMap<String, SetRecord>;

/// Parse a full `ldms_ls -l` listing.
pub fn parse(text: &str) -> LsResult<LsSets> {
    LsParser::new().parse(text)
}

/// `ldms_ls -l` listing parser.
#[derive(Debug, Clone, Default)]
pub struct LsParser {
    grammar: LineGrammar,
}

#[derive(Default)]
struct ParseState {
    sets: LsSets,
    in_meta: bool,
    /// Key of the set whose metric rows are being read.
    current: Option<String>,
}

impl LsParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, text: &str) -> LsResult<LsSets> {
        let mut state = ParseState::default();

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() {
                state.current = None;
                continue;
            }

            let kind = self
                .grammar
                .classify(line)
                .ok_or_else(|| LsError::BadLineFormat {
                    line_no,
                    line: line.to_string(),
                })?;
            trace!(line_no, kind = kind.name(), "classified line");
            state.apply(kind, line_no, line)?;
        }

        debug!(sets = state.sets.len(), "parsed ldms_ls listing");
        Ok(state.sets)
    }
}

impl ParseState {
    fn apply(&mut self, kind: LineKind<'_>, line_no: usize, line: &str) -> LsResult<()> {
        let unexpected_meta = || LsError::UnexpectedMetaInfo {
            line_no,
            line: line.to_string(),
        };
        let unexpected_data = || LsError::UnexpectedDataInfo {
            line_no,
            line: line.to_string(),
        };

        match kind {
            LineKind::MetaBegin => {
                if self.in_meta {
                    return Err(unexpected_meta());
                }
                self.in_meta = true;
            }
            LineKind::MetaDashes | LineKind::MetaSummary(_) => {
                if !self.in_meta {
                    return Err(unexpected_meta());
                }
            }
            LineKind::MetaEnd => {
                if !self.in_meta {
                    return Err(unexpected_meta());
                }
                self.in_meta = false;
            }
            LineKind::MetaRow(row) => {
                if !self.in_meta {
                    return Err(unexpected_meta());
                }
                let meta = Metadata::from_row(&row).ok_or_else(|| LsError::BadLineFormat {
                    line_no,
                    line: line.to_string(),
                })?;
                self.record(row.instance).meta = Some(meta);
            }
            LineKind::SetHeader { name, ts } => {
                if self.in_meta {
                    return Err(unexpected_data());
                }
                let record = self.record(name);
                if record.has_data() {
                    warn!(set = name, line_no, "set listed again, keeping the later snapshot");
                }
                record.reset_data(ts);
                self.current = Some(name.to_string());
            }
            LineKind::Metric(row) => {
                if self.in_meta {
                    return Err(unexpected_data());
                }
                self.metric(row, line_no, line)?;
            }
        }
        Ok(())
    }

    fn record(&mut self, name: &str) -> &mut SetRecord {
        self.sets
            .entry(name.to_string())
            .or_insert_with(|| SetRecord::new(name))
    }

    fn metric(&mut self, row: MetricRow<'_>, line_no: usize, line: &str) -> LsResult<()> {
        let record = self
            .current
            .as_ref()
            .and_then(|key| self.sets.get_mut(key))
            .ok_or_else(|| LsError::MetricOutsideSet {
                line_no,
                line: line.to_string(),
            })?;

        let tag: TypeTag = row.tag.parse().map_err(|e| LsError::decode(line_no, e))?;
        let raw = if tag.keeps_unit() {
            row.value
        } else {
            row.value.split(' ').next().unwrap_or_default()
        };
        let value = tag.decode(raw).map_err(|e| LsError::decode(line_no, e))?;
        record.insert_metric(row.name, tag, value);
        Ok(())
    }
}
