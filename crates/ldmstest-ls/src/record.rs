//! Parsed set records.

use indexmap::IndexMap;
use serde::Serialize;

use crate::decoder::{MetricValue, TypeTag};
use crate::grammar::MetaRow;

/// One row of the metadata table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub schema: String,
    pub instance: String,
    pub flags: String,
    pub meta_sz: u64,
    pub data_sz: u64,
    pub uid: u32,
    pub gid: u32,
    pub perm: String,
    /// Seconds since the epoch, as printed.
    pub update: String,
    /// Seconds, as printed.
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl Metadata {
    /// `None` when a numeric column does not fit its type.
    pub(crate) fn from_row(row: &MetaRow<'_>) -> Option<Self> {
        Some(Self {
            schema: row.schema.to_string(),
            instance: row.instance.to_string(),
            flags: row.flags.to_string(),
            meta_sz: row.meta_sz.parse().ok()?,
            data_sz: row.data_sz.parse().ok()?,
            uid: row.uid.parse().ok()?,
            gid: row.gid.parse().ok()?,
            perm: row.perm.to_string(),
            update: row.update.to_string(),
            duration: row.duration.to_string(),
            info: row.info.map(str::to_string),
        })
    }

    pub fn update_secs(&self) -> Option<f64> {
        self.update.parse().ok()
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration.parse().ok()
    }

    /// Consistent sets carry `C` in their flags.
    pub fn is_consistent(&self) -> bool {
        self.flags.contains('C')
    }
}

/// Everything the listing says about one set.
///
/// `meta` comes from the metadata table, `ts`/`data`/`data_type` from the
/// set's own block; either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Metadata>,
    pub data: IndexMap<String, MetricValue>,
    pub data_type: IndexMap<String, TypeTag>,
}

impl SetRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether a set header for this set was seen.
    pub fn has_data(&self) -> bool {
        self.ts.is_some()
    }

    pub fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.data.get(name)
    }

    pub fn metric_type(&self, name: &str) -> Option<TypeTag> {
        self.data_type.get(name).copied()
    }

    pub(crate) fn reset_data(&mut self, ts: &str) {
        self.ts = Some(ts.to_string());
        self.data.clear();
        self.data_type.clear();
    }

    pub(crate) fn insert_metric(&mut self, name: &str, tag: TypeTag, value: MetricValue) {
        self.data.insert(name.to_string(), value);
        self.data_type.insert(name.to_string(), tag);
    }
}
