//! Error taxonomy shared by the harness crates.

use std::fmt;

use thiserror::Error;

/// Broad classification of a harness failure.
///
/// Every domain error maps onto exactly one kind. None of them is retryable:
/// the input that produced the error has to be fixed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown node kind, depth exceeded, template cycle or unresolved variable.
    MalformedSpec,
    /// An `!extends` target missing from the template registry.
    UnknownTemplate,
    /// A telemetry line that fails the grammar or violates section ordering.
    MalformedTelemetry,
    /// A metric type tag outside the decoding table.
    UnsupportedType,
    /// Harness or daemon configuration problem.
    Config,
    /// Filesystem or command channel failure.
    Io,
}

impl ErrorKind {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedSpec => "malformed_spec",
            ErrorKind::UnknownTemplate => "unknown_template",
            ErrorKind::MalformedTelemetry => "malformed_telemetry",
            ErrorKind::UnsupportedType => "unsupported_type",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by crate-local errors that belong to the shared taxonomy.
pub trait Classify {
    /// The taxonomy bucket of this error.
    fn kind(&self) -> ErrorKind;
}

/// The umbrella error type for harness operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A classified domain error from one of the harness crates.
    #[error("{source}")]
    Domain {
        kind: ErrorKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a classified crate-local error.
    pub fn domain<E>(err: E) -> Self
    where
        E: Classify + std::error::Error + Send + Sync + 'static,
    {
        Self::Domain {
            kind: err.kind(),
            source: Box::new(err),
        }
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Domain { kind, .. } => *kind,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias using the harness Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[derive(Debug, Error)]
    #[error("template `{0}` not found")]
    struct MissingTemplate(String);

    impl Classify for MissingTemplate {
        fn kind(&self) -> ErrorKind {
            ErrorKind::UnknownTemplate
        }
    }

    #[test]
    fn test_domain_error_keeps_kind_and_message() {
        let err = Error::domain(MissingTemplate("base".into()));
        assert_eq!(err.kind(), ErrorKind::UnknownTemplate);
        assert_eq!(err.to_string(), "template `base` not found");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test_case(ErrorKind::MalformedSpec, "malformed_spec")]
    #[test_case(ErrorKind::UnknownTemplate, "unknown_template")]
    #[test_case(ErrorKind::MalformedTelemetry, "malformed_telemetry")]
    #[test_case(ErrorKind::UnsupportedType, "unsupported_type")]
    fn test_kind_names(kind: ErrorKind, name: &str) {
        assert_eq!(kind.to_string(), name);
    }
}
