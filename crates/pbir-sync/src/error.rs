//! Error types for layout sync
//!
//! Two layers:
//! - [`ValidationError`]: bad input, always raised before anything is staged
//! - [`SyncError`]: everything an operation can fail with

use std::path::PathBuf;

use pbir_catalog::FilterShapeError;
use pbir_store::{PathError, StoreError};

/// Input rejected before any mutation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A requested target page does not exist (or is the source page)
    #[error("unknown target page: {0}")]
    UnknownTargetPage(String),

    /// Name filter is neither absent, a string, nor a list of strings
    #[error("unsupported filter: {0}")]
    UnsupportedFilterShape(#[from] FilterShapeError),

    /// The filter selected no element on the source page
    #[error("nothing to copy from page {page}: no visual matches {filter}")]
    NothingToCopy {
        /// Source page
        page: String,
        /// Rendered filter
        filter: String,
    },

    /// The source page has no readable page.json
    #[error("source page not found: {0}")]
    SourcePageNotFound(String),

    /// Report or page name cannot be used as a path segment
    #[error("invalid name: {0}")]
    InvalidName(#[from] PathError),
}

/// Layout sync error
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Input validation failed
    #[error("input validation failed: {0}")]
    InputValidation(#[from] ValidationError),

    /// Reading or writing the project tree failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Job configuration could not be read or parsed
    #[error("configuration error in {}: {message}", path.display())]
    Config {
        /// Configuration file
        path: PathBuf,
        /// What went wrong
        message: String,
    },
}

impl SyncError {
    /// Create configuration error
    #[inline]
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if the error is an input validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InputValidation(_))
    }
}

impl From<PathError> for SyncError {
    fn from(err: PathError) -> Self {
        Self::Store(StoreError::InvalidPath(err))
    }
}

impl From<FilterShapeError> for SyncError {
    fn from(err: FilterShapeError) -> Self {
        Self::InputValidation(err.into())
    }
}

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
