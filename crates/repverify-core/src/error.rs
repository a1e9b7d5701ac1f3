//! Error taxonomy for loading episode records.

use std::path::PathBuf;

/// Why a line could not be decoded as a record.
#[derive(Debug, thiserror::Error)]
pub enum RecordParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Fatal errors raised while reading the input file. Any of these aborts the
/// run before a table is rendered.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{} not found", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record on line {line}: {content}")]
    MalformedRecord {
        line: usize,
        content: String,
        #[source]
        source: RecordParseError,
    },

    #[error("schema violation on line {line}: {reason}")]
    SchemaViolation { line: usize, reason: String },
}

impl LoadError {
    pub(crate) fn schema(line: usize, reason: impl Into<String>) -> Self {
        LoadError::SchemaViolation {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;
