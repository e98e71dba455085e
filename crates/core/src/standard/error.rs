//! Standard error types.

use thiserror::Error;

use ledgerguard_shared::AppError;

/// Errors raised while resolving accounting standards.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StandardError {
    /// The value does not name a supported standard.
    #[error("Unknown accounting standard: {0}")]
    UnknownStandard(String),
}

impl StandardError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStandard(_) => "UNKNOWN_STANDARD",
        }
    }
}

impl From<StandardError> for AppError {
    fn from(err: StandardError) -> Self {
        Self::Validation(err.to_string())
    }
}
