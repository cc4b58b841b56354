//! Error types for project materialization

use pbir_store::StoreError;

/// Errors raised while stamping a new project
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The project name cannot be used as a file name
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName {
        /// Rejected name
        name: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Writing the project failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TemplateError {
    /// Create invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidProjectName {
            name: name.into(),
            reason,
        }
    }
}

/// Result type alias for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;
