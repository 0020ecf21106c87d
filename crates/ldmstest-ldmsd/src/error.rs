//! Daemon and cluster errors.

use ldmstest_common_core::{Classify, ErrorKind};
use ldmstest_ls::LsError;
use ldmstest_spec::SpecError;
use thiserror::Error;

/// Errors raised while turning a spec into daemon configuration or while
/// driving a node.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("invalid spec at {path}: {message}")]
    InvalidSpec { path: String, message: String },

    #[error("`{section}` entry is missing `{name}`")]
    MissingAttribute { section: String, name: String },

    #[error("`env` must be a list of NAME=VALUE strings or a mapping, got {found}")]
    InvalidEnv { found: String },

    #[error("bad ldmsd version: {0}")]
    BadVersion(String),

    #[error("{host}: {message}")]
    Channel { host: String, message: String },

    #[error("{host}: `{command}` exited with status {status}: {output}")]
    CommandFailed {
        host: String,
        command: String,
        status: i32,
        output: String,
    },

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Telemetry(#[from] LsError),
}

impl DaemonError {
    pub fn invalid_spec(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing(section: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingAttribute {
            section: section.into(),
            name: name.into(),
        }
    }
}

impl Classify for DaemonError {
    fn kind(&self) -> ErrorKind {
        match self {
            DaemonError::Spec(err) => err.kind(),
            DaemonError::Telemetry(err) => err.kind(),
            DaemonError::Channel { .. } | DaemonError::CommandFailed { .. } => ErrorKind::Io,
            DaemonError::BadVersion(_) => ErrorKind::MalformedTelemetry,
            DaemonError::InvalidSpec { .. }
            | DaemonError::MissingAttribute { .. }
            | DaemonError::InvalidEnv { .. } => ErrorKind::Config,
        }
    }
}

impl From<DaemonError> for ldmstest_common_core::Error {
    fn from(err: DaemonError) -> Self {
        ldmstest_common_core::Error::domain(err)
    }
}

pub type DaemonResult<T> = std::result::Result<T, DaemonError>;

/// Framing errors of the console message protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("end of input")]
    EndOfInput,

    #[error("not a start of message")]
    NotStartOfMessage,

    #[error("bad message header")]
    BadHeader,

    #[error("incomplete message")]
    Incomplete,

    #[error("bad json message: {0}")]
    Json(String),
}

impl Classify for MessageError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedTelemetry
    }
}
