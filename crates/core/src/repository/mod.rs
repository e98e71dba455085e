//! Data-source ports consumed by the engine.
//!
//! These traits are implemented by the host's data layer (or by the in-memory
//! store crate). The engine only reads through them, except for
//! [`JournalRepository::insert_entry`].

mod records;

use std::future::Future;

use chrono::NaiveDate;
use thiserror::Error;

use ledgerguard_shared::AppError;
use ledgerguard_shared::types::{CompanyId, JournalEntryId, JournalId};

pub use records::{
    AccountBalance, AccountingPeriod, ChartAccount, CompanyProfile, ControlItem, EntryStatus,
    JournalEntryRecord, NewJournalEntry, PostedLine, ReportPeriod, VatPosition, account_class,
};

/// Errors reported by a data source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The requested record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The data source cannot answer this query.
    #[error("Data not available: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("Data source failure: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UniqueViolation(_) => "UNIQUE_VIOLATION",
            Self::Unavailable(_) => "DATA_UNAVAILABLE",
            Self::Backend(_) => "DATA_SOURCE_ERROR",
        }
    }

    /// Returns true if retrying with a freshly computed value may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::UniqueViolation(msg) => Self::Conflict(msg),
            RepositoryError::Unavailable(msg) | RepositoryError::Backend(msg) => {
                Self::DataSource(msg)
            }
        }
    }
}

/// Company metadata reader.
pub trait CompanyDirectory: Send + Sync {
    /// Returns the company profile, or `None` if the company is unknown.
    fn company_profile(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Option<CompanyProfile>, RepositoryError>> + Send;
}

/// Chart-of-accounts reader.
pub trait ChartOfAccountsReader: Send + Sync {
    /// Returns the active accounts of a company, in storage order.
    fn active_accounts(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<ChartAccount>, RepositoryError>> + Send;
}

/// Journal and journal-entry reader/writer.
pub trait JournalRepository: Send + Sync {
    /// Returns the short code of a journal (`"VE"`, `"BQ"`), or `None` if it does not exist.
    fn journal_code(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
    ) -> impl Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Returns the entry number with the highest sequence among the journal's
    /// `<code>-<year>-<sequence>` numbers. Numbers in any other shape are ignored.
    fn last_entry_number(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        year: i32,
    ) -> impl Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Returns entries dated within the period with the given status.
    fn entries(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
        status: EntryStatus,
    ) -> impl Future<Output = Result<Vec<JournalEntryRecord>, RepositoryError>> + Send;

    /// Counts entries created or modified within the period.
    fn count_modified_entries(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Persists an entry. Must fail with [`RepositoryError::UniqueViolation`]
    /// when the entry number is already taken.
    fn insert_entry(
        &self,
        entry: NewJournalEntry,
    ) -> impl Future<Output = Result<JournalEntryId, RepositoryError>> + Send;
}

/// Audit-log reader.
pub trait AuditLogReader: Send + Sync {
    /// Counts audit-log entries recorded within the period.
    fn count_audit_entries(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Accounting-period reader.
pub trait PeriodReader: Send + Sync {
    /// Returns the periods lying within the window.
    fn accounting_periods(
        &self,
        company_id: CompanyId,
        window: ReportPeriod,
    ) -> impl Future<Output = Result<Vec<AccountingPeriod>, RepositoryError>> + Send;
}

/// Balance-snapshot query.
pub trait BalanceSnapshotReader: Send + Sync {
    /// Balances at the end of `date`, after all its movements.
    fn closing_balances(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<AccountBalance>, RepositoryError>> + Send;

    /// Balances brought forward at the start of `date`, before its movements.
    fn opening_balances(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<AccountBalance>, RepositoryError>> + Send;
}

/// Computed controls delegated to the host.
pub trait ControlsReader: Send + Sync {
    /// VAT collected, deductible, and due over the period.
    fn vat_position(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
    ) -> impl Future<Output = Result<VatPosition, RepositoryError>> + Send;

    /// Depreciation plans evaluated over the period.
    fn depreciation_controls(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
    ) -> impl Future<Output = Result<Vec<ControlItem>, RepositoryError>> + Send;

    /// Provisions evaluated over the period.
    fn provision_controls(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
    ) -> impl Future<Output = Result<Vec<ControlItem>, RepositoryError>> + Send;
}

/// Everything the integrity audit reads.
pub trait IntegritySource:
    CompanyDirectory
    + ChartOfAccountsReader
    + JournalRepository
    + AuditLogReader
    + PeriodReader
    + BalanceSnapshotReader
    + ControlsReader
{
}

impl<T> IntegritySource for T where
    T: CompanyDirectory
        + ChartOfAccountsReader
        + JournalRepository
        + AuditLogReader
        + PeriodReader
        + BalanceSnapshotReader
        + ControlsReader
{
}
