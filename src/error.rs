use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors returned by the CIRCL/NVD client.
///
/// Batch operations record these per identifier inside a
/// [`ResultSet`](crate::ResultSet), so the type is cheap to clone: the
/// underlying transport and decode errors are shared behind an `Arc`.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// An empty or blank identifier was passed to a single-item fetch.
    #[error("missing {kind}")]
    InvalidInput { kind: &'static str },

    /// The request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Transport(Arc<reqwest::Error>),

    /// The caller's context was cancelled or its deadline passed.
    #[error("request cancelled")]
    Cancelled,

    /// The upstream answered with a status other than the expected one.
    #[error("unexpected status code: {status}. Body: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body was not valid JSON for the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(Arc<serde_json::Error>),

    /// No record matching the requested identifier was returned.
    #[error("missing or invalid {key}")]
    NotFound { key: String },

    /// A result entry holds a different kind of record than requested.
    #[error("cannot convert entry type to {expected}: {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The input is not a well-formed CPE 2.2 or 2.3 URI.
    #[error("unable to extract components of CPE {uri}")]
    InvalidCpe { uri: String },

    /// A configuration file could not be read or parsed.
    #[error("invalid configuration {path}: {details}")]
    Config { path: PathBuf, details: String },
}

impl Error {
    pub(crate) fn not_found(key: impl Into<String>) -> Self {
        Error::NotFound { key: key.into() }
    }
}

impl From<reqwest::Error> for Error {
    fn from(inner: reqwest::Error) -> Self {
        Error::Transport(Arc::new(inner))
    }
}

impl From<serde_json::Error> for Error {
    fn from(inner: serde_json::Error) -> Self {
        Error::Decode(Arc::new(inner))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
