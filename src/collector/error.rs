//! Error type shared by every collector.

use std::io;

use thiserror::Error;

use crate::collector::binary::DecodeError;
use crate::collector::procfs::parser::ParseError;

/// Error type for collection failures.
///
/// No variant is retried: every sample is a point-in-time read and callers
/// re-invoke the whole operation if they want another attempt.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Required file, kernel interface or binary is missing on this system.
    #[error("{0} is not available on this system")]
    SourceUnavailable(String),
    /// Read access to the source was refused.
    #[error("permission denied reading {0}")]
    PermissionDenied(String),
    /// External command exited non-zero or produced no output.
    #[error("{name} failed: {reason}")]
    QueryFailed { name: String, reason: String },
    /// A binary record header did not match the expected layout.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// A recognized text field failed to parse.
    #[error("malformed source: {0}")]
    MalformedSource(#[from] ParseError),
    /// Any other I/O failure while reading a source.
    #[error("I/O error reading {name}: {err}")]
    Io {
        name: String,
        #[source]
        err: io::Error,
    },
}

impl CollectError {
    /// Classifies an I/O error raised while reading `name`.
    pub fn from_io(name: impl Into<String>, err: io::Error) -> Self {
        let name = name.into();
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::Unsupported => {
                CollectError::SourceUnavailable(name)
            }
            io::ErrorKind::PermissionDenied => CollectError::PermissionDenied(name),
            _ => CollectError::Io { name, err },
        }
    }

    pub fn query_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CollectError::QueryFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
