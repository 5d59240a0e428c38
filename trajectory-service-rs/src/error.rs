// trajectory-service-rs/src/error.rs
// Error types for trajectory loading and parsing

use std::path::PathBuf;

use thiserror::Error;

/// Result type for load/parse operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors raised while loading or parsing trajectory sources.
///
/// Only `UnsupportedFormat` is treated as a hard error by the loader (an
/// explicitly requested format the service does not know is a caller bug).
/// Everything else is caught at a batch boundary, logged, and skipped.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Auto-detection found no known format for the path
    #[error("cannot detect trajectory format for {0}")]
    UnknownFormat(PathBuf),

    /// Caller explicitly named a format the service does not support
    #[error("unsupported trajectory format: {0}")]
    UnsupportedFormat(String),

    /// Filesystem error while reading a source
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source contained invalid JSON
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Source container had an unexpected shape (e.g. top level not an array)
    #[error("malformed source {path}: {reason}")]
    MalformedSource { path: PathBuf, reason: String },

    /// A dataset shard in an encoding the service cannot deserialize
    #[error("unsupported dataset shard {0}")]
    UnsupportedShard(PathBuf),

    /// One record inside a source could not be parsed
    #[error("malformed record {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        LoadError::Json {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_record(index: usize, reason: impl Into<String>) -> Self {
        LoadError::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}
