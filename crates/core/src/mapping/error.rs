//! Mapping error types.

use thiserror::Error;

use ledgerguard_shared::AppError;

use crate::repository::RepositoryError;

/// Errors raised while mapping roles to accounts.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The chart of accounts could not be read.
    #[error("Chart of accounts unavailable: {0}")]
    Repository(#[from] RepositoryError),
}

impl MappingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Repository(err) => err.error_code(),
        }
    }
}

impl From<MappingError> for AppError {
    fn from(err: MappingError) -> Self {
        match err {
            MappingError::Repository(inner) => inner.into(),
        }
    }
}
