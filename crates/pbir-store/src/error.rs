//! Error types for the document store

use std::path::PathBuf;

use crate::path::PathError;

/// Errors raised while loading, encoding, or flushing documents
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO failure on a specific filesystem path
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failure
    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A filesystem or caller-supplied path could not become a document path
    #[error("invalid document path: {0}")]
    InvalidPath(#[from] PathError),

    /// JSON encoding failed
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
