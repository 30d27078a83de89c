//! Error types shared by the catalog, the weather cache and the fetch layer
//!
//! Every fallible operation in the library returns [`Result`]. Callers that only
//! need to branch on the category of failure can use [`Error::kind`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the city catalog, the weather cache and weather sources
#[derive(Debug, Error)]
pub enum Error {
    /// A lookup missed (city name, collection node, cache entry)
    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },

    /// An index outside `[0, len)` (or `[0, len]` for insertion)
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// Malformed JSON, wrong field types, unsafe names or unparsable timestamps
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A city with the same name is already present
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The caller passed a value the operation refuses to interpret
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Directory or file access failed
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The weather source failed or timed out
    #[error("remote failure: {reason}")]
    Remote { reason: String, retryable: bool },
}

/// Coarse error category, mirroring the variants of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    OutOfRange,
    InvalidFormat,
    DuplicateKey,
    InvalidArgument,
    Io,
    Remote,
}

impl Error {
    pub(crate) fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        Error::NotFound {
            what,
            key: key.into(),
        }
    }

    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::OutOfRange { .. } => ErrorKind::OutOfRange,
            Error::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Error::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Io { .. } => ErrorKind::Io,
            Error::Remote { .. } => ErrorKind::Remote,
        }
    }

    /// Whether retrying the same operation later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Remote { retryable: true, .. })
    }

    /// Returns a short message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "Nothing was found with that name.",
            Error::OutOfRange { .. } => "That position does not exist.",
            Error::InvalidFormat(_) => "Stored data is damaged or in an unexpected format.",
            Error::DuplicateKey(_) => "An entry with that name already exists.",
            Error::InvalidArgument(_) => "The request was not valid.",
            Error::Io { .. } => "A file operation failed. Please try again.",
            Error::Remote {
                retryable: true, ..
            } => "The weather service is unreachable right now. Please try again.",
            Error::Remote { .. } => "The weather service rejected the request.",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidFormat(err.to_string())
    }
}
