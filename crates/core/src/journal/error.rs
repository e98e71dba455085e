//! Journal error types.

use thiserror::Error;

use ledgerguard_shared::AppError;

use super::types::EntryValidation;
use crate::mapping::MappingError;
use crate::repository::RepositoryError;

/// Errors raised while validating or posting journal entries.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The entry has blocking validation errors.
    #[error("Journal entry rejected: {}", .0.errors.join("; "))]
    Rejected(EntryValidation),

    /// Every allocated entry number collided with an existing one.
    #[error("Could not allocate a unique entry number after {attempts} attempts")]
    NumberExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// The chart of accounts could not be read.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The journal store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "ENTRY_REJECTED",
            Self::NumberExhausted { .. } => "ENTRY_NUMBER_EXHAUSTED",
            Self::Mapping(err) => err.error_code(),
            Self::Repository(err) => err.error_code(),
        }
    }

    /// Returns true if the operation may succeed when retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NumberExhausted { .. } => true,
            Self::Repository(err) => err.is_retryable(),
            Self::Rejected(_) | Self::Mapping(_) => false,
        }
    }
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Rejected(validation) => Self::Validation(validation.errors.join("; ")),
            JournalError::NumberExhausted { attempts } => Self::Conflict(format!(
                "Could not allocate a unique entry number after {attempts} attempts"
            )),
            JournalError::Mapping(inner) => inner.into(),
            JournalError::Repository(inner) => inner.into(),
        }
    }
}
