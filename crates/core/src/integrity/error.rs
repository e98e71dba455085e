//! Integrity error types.

use thiserror::Error;

use ledgerguard_shared::AppError;

use crate::repository::RepositoryError;

/// Errors raised by the integrity audit.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// No check has this identifier.
    #[error("Integrity check not found: {0}")]
    UnknownCheck(String),

    /// A data source failed while a check was running.
    #[error("Data source error: {0}")]
    Repository(#[from] RepositoryError),

    /// A check panicked.
    #[error("Check aborted: {0}")]
    Panicked(String),
}

impl IntegrityError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCheck(_) => "UNKNOWN_CHECK",
            Self::Repository(err) => err.error_code(),
            Self::Panicked(_) => "CHECK_PANICKED",
        }
    }
}

impl From<IntegrityError> for AppError {
    fn from(err: IntegrityError) -> Self {
        match err {
            IntegrityError::UnknownCheck(id) => Self::NotFound(format!("integrity check {id}")),
            IntegrityError::Repository(inner) => inner.into(),
            IntegrityError::Panicked(msg) => Self::Internal(msg),
        }
    }
}
