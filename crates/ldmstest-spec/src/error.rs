//! Resolver errors.

use std::path::PathBuf;

use ldmstest_common_core::{Classify, ErrorKind};
use thiserror::Error;

/// Errors raised while loading or resolving a spec.
///
/// `path` fields locate the offending node as `$.nodes[0].listen_port`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("unsupported value at {path}: {found}")]
    UnsupportedNode { path: String, found: &'static str },

    #[error("expansion exceeding maximum depth ({max}) at {path}")]
    DepthExceeded { path: String, max: usize },

    #[error("template cycle: {}", chain.join(" -> "))]
    TemplateCycle { chain: Vec<String> },

    #[error("`{name}` template not found (referenced at {path})")]
    UnknownTemplate { name: String, path: String },

    #[error("undefined variable `%{name}%` at {path}")]
    UndefinedVariable { name: String, path: String },

    #[error("`!extends` at {path} must be a template name")]
    InvalidExtends { path: String },

    #[error("template `{name}` must be a mapping")]
    InvalidTemplate { name: String },

    #[error("failed to parse spec: {0}")]
    Parse(String),

    #[error("failed to read spec {}: {message}", path.display())]
    Read { path: PathBuf, message: String },
}

impl Classify for SpecError {
    fn kind(&self) -> ErrorKind {
        match self {
            SpecError::UnknownTemplate { .. } => ErrorKind::UnknownTemplate,
            SpecError::Read { .. } => ErrorKind::Io,
            _ => ErrorKind::MalformedSpec,
        }
    }
}

impl From<SpecError> for ldmstest_common_core::Error {
    fn from(err: SpecError) -> Self {
        ldmstest_common_core::Error::domain(err)
    }
}

/// Result alias for resolver operations.
pub type SpecResult<T> = std::result::Result<T, SpecError>;

/// `$.a` joined with `b` gives `$.a.b`.
pub(crate) fn key_path(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}

/// `$.a` joined with index 3 gives `$.a[3]`.
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Path of the tree root.
pub(crate) const ROOT_PATH: &str = "$";
