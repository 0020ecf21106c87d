use ldmstest_common_core::{Classify, ErrorKind};
use thiserror::Error;

/// Failure to decode one metric value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported metric type `{tag}`")]
    UnsupportedType { tag: String },

    #[error("bad `{tag}` value: {value:?}")]
    BadValue { tag: String, value: String },
}

/// Errors raised while parsing an `ldms_ls` listing.
///
/// `line_no` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LsError {
    #[error("line {line_no}: bad line format: {line}")]
    BadLineFormat { line_no: usize, line: String },

    #[error("line {line_no}: unexpected meta info: {line}")]
    UnexpectedMetaInfo { line_no: usize, line: String },

    #[error("line {line_no}: unexpected data info: {line}")]
    UnexpectedDataInfo { line_no: usize, line: String },

    #[error("line {line_no}: metric outside of a set: {line}")]
    MetricOutsideSet { line_no: usize, line: String },

    #[error("line {line_no}: unsupported metric type `{tag}`")]
    UnsupportedType { line_no: usize, tag: String },

    #[error("line {line_no}: bad `{tag}` value: {value:?}")]
    BadValue {
        line_no: usize,
        tag: String,
        value: String,
    },
}

impl LsError {
    pub(crate) fn decode(line_no: usize, err: DecodeError) -> Self {
        match err {
            DecodeError::UnsupportedType { tag } => LsError::UnsupportedType { line_no, tag },
            DecodeError::BadValue { tag, value } => LsError::BadValue {
                line_no,
                tag,
                value,
            },
        }
    }

    /// 1-based number of the offending line.
    pub fn line_no(&self) -> usize {
        match self {
            LsError::BadLineFormat { line_no, .. }
            | LsError::UnexpectedMetaInfo { line_no, .. }
            | LsError::UnexpectedDataInfo { line_no, .. }
            | LsError::MetricOutsideSet { line_no, .. }
            | LsError::UnsupportedType { line_no, .. }
            | LsError::BadValue { line_no, .. } => *line_no,
        }
    }
}

impl Classify for DecodeError {
    fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            DecodeError::BadValue { .. } => ErrorKind::MalformedTelemetry,
        }
    }
}

impl Classify for LsError {
    fn kind(&self) -> ErrorKind {
        match self {
            LsError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            _ => ErrorKind::MalformedTelemetry,
        }
    }
}

impl From<LsError> for ldmstest_common_core::Error {
    fn from(err: LsError) -> Self {
        ldmstest_common_core::Error::domain(err)
    }
}

pub type LsResult<T> = std::result::Result<T, LsError>;
