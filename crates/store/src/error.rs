//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

use ledgerguard_shared::AppError;
use ledgerguard_shared::types::CompanyId;

/// Errors raised while loading a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The snapshot file cannot be read.
    #[error("Cannot read snapshot {path}: {source}")]
    Io {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON for the expected format.
    #[error("Invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two companies share the same id.
    #[error("Company {0} appears twice in the snapshot")]
    DuplicateCompany(CompanyId),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "SNAPSHOT_UNREADABLE",
            Self::Parse(_) => "SNAPSHOT_INVALID",
            Self::DuplicateCompany(_) => "DUPLICATE_COMPANY",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io { .. } => Self::DataSource(err.to_string()),
            StoreError::Parse(_) | StoreError::DuplicateCompany(_) => {
                Self::Validation(err.to_string())
            }
        }
    }
}
