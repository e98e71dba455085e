//! In-memory store over a ledger snapshot.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use ledgerguard_core::journal::entry_sequence;
use ledgerguard_core::repository::{
    AccountBalance, AccountingPeriod, AuditLogReader, BalanceSnapshotReader,
    ChartOfAccountsReader, ChartAccount, CompanyDirectory, CompanyProfile, ControlItem,
    ControlsReader, EntryStatus, JournalEntryRecord, JournalRepository, NewJournalEntry,
    PeriodReader, ReportPeriod, RepositoryError, VatPosition,
};
use ledgerguard_shared::types::{CompanyId, JournalEntryId, JournalId};

use crate::error::StoreError;
use crate::snapshot::{
    AuditEvent, CompanyBooks, LedgerSnapshot, SnapshotKind, StoredEntry, net_balances,
};

/// Ledger store kept in memory.
///
/// Entry numbers are unique per company; a clashing insert fails with
/// [`RepositoryError::UniqueViolation`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    books: RwLock<HashMap<CompanyId, CompanyBooks>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the companies of a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateCompany` if two companies share an id.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, StoreError> {
        let mut books = HashMap::with_capacity(snapshot.companies.len());
        for company in snapshot.companies {
            let id = company.company_id();
            if books.insert(id, company).is_some() {
                return Err(StoreError::DuplicateCompany(id));
            }
        }
        info!(companies = books.len(), "Ledger snapshot loaded");
        Ok(Self {
            books: RwLock::new(books),
        })
    }

    /// Parses a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` on invalid JSON, or `StoreError::DuplicateCompany`.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read, otherwise as
    /// [`InMemoryStore::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Adds or replaces the books of a company.
    pub async fn insert_company(&self, company: CompanyBooks) {
        self.books
            .write()
            .await
            .insert(company.company_id(), company);
    }

    /// Ids of the companies in the store, sorted.
    pub async fn company_ids(&self) -> Vec<CompanyId> {
        let mut ids: Vec<CompanyId> = self.books.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Exports the current content of the store.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let books = self.books.read().await;
        let mut companies: Vec<CompanyBooks> = books.values().cloned().collect();
        companies.sort_by_key(CompanyBooks::company_id);
        LedgerSnapshot { companies }
    }

    async fn with_books<T, F>(&self, company_id: CompanyId, empty: T, read: F) -> T
    where
        F: FnOnce(&CompanyBooks) -> T,
    {
        match self.books.read().await.get(&company_id) {
            Some(books) => read(books),
            None => {
                debug!(company_id = %company_id, "Unknown company");
                empty
            }
        }
    }

    async fn balances_at(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
        kind: SnapshotKind,
    ) -> Vec<AccountBalance> {
        self.with_books(company_id, Vec::new(), |books| {
            if let Some(recorded) = books
                .balance_snapshots
                .iter()
                .find(|s| s.date == date && s.kind == kind)
            {
                return recorded.balances.clone();
            }
            net_balances(books.booked_entries().filter(|e| match kind {
                SnapshotKind::Opening => e.entry_date < date,
                SnapshotKind::Closing => e.entry_date <= date,
            }))
        })
        .await
    }
}

impl CompanyDirectory for InMemoryStore {
    async fn company_profile(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<CompanyProfile>, RepositoryError> {
        Ok(self
            .with_books(company_id, None, |books| Some(books.profile.clone()))
            .await)
    }
}

impl ChartOfAccountsReader for InMemoryStore {
    async fn active_accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<ChartAccount>, RepositoryError> {
        Ok(self
            .with_books(company_id, Vec::new(), |books| {
                books.chart().into_iter().filter(|a| a.is_active).collect()
            })
            .await)
    }
}

impl JournalRepository for InMemoryStore {
    async fn journal_code(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .with_books(company_id, None, |books| {
                books
                    .journals
                    .iter()
                    .find(|j| j.id == journal_id)
                    .map(|j| j.code.clone())
            })
            .await)
    }

    async fn last_entry_number(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        year: i32,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .with_books(company_id, None, |books| {
                let code = &books.journals.iter().find(|j| j.id == journal_id)?.code;
                books
                    .entries
                    .iter()
                    .map(|e| &e.record)
                    .filter(|e| e.journal_id == Some(journal_id) && e.entry_date.year() == year)
                    .filter_map(|e| {
                        let number = e.entry_number.as_deref()?;
                        entry_sequence(number, code, year).map(|sequence| (sequence, number))
                    })
                    .max_by_key(|(sequence, _)| *sequence)
                    .map(|(_, number)| number.to_string())
            })
            .await)
    }

    async fn entries(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
        status: EntryStatus,
    ) -> Result<Vec<JournalEntryRecord>, RepositoryError> {
        Ok(self
            .with_books(company_id, Vec::new(), |books| {
                books
                    .entries
                    .iter()
                    .map(|e| &e.record)
                    .filter(|e| e.status == status && period.contains(e.entry_date))
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn count_modified_entries(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
    ) -> Result<u64, RepositoryError> {
        Ok(self
            .with_books(company_id, 0, |books| {
                books
                    .entries
                    .iter()
                    .filter(|e| period.contains(e.last_modified()))
                    .count() as u64
            })
            .await)
    }

    async fn insert_entry(&self, entry: NewJournalEntry) -> Result<JournalEntryId, RepositoryError> {
        let mut all = self.books.write().await;
        let books = all
            .get_mut(&entry.company_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("company {}", entry.company_id)))?;

        if books
            .entries
            .iter()
            .any(|e| e.record.entry_number.as_deref() == Some(entry.entry_number.as_str()))
        {
            warn!(
                company_id = %entry.company_id,
                entry_number = %entry.entry_number,
                "Entry number already taken"
            );
            return Err(RepositoryError::UniqueViolation(entry.entry_number));
        }

        let id = JournalEntryId::new();
        books.audit_log.push(AuditEvent {
            date: entry.entry_date,
            action: "entry_created".to_string(),
            entry_reference: Some(entry.entry_number.clone()),
        });
        books.entries.push(StoredEntry {
            record: JournalEntryRecord {
                id,
                journal_id: Some(entry.journal_id),
                entry_number: Some(entry.entry_number.clone()),
                reference: entry.entry_number,
                entry_date: entry.entry_date,
                status: EntryStatus::Validated,
                lines: entry.lines,
            },
            description: entry.description,
            modified_on: None,
        });
        debug!(company_id = %entry.company_id, entry_id = %id, "Entry stored");
        Ok(id)
    }
}

impl AuditLogReader for InMemoryStore {
    async fn count_audit_entries(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
    ) -> Result<u64, RepositoryError> {
        Ok(self
            .with_books(company_id, 0, |books| {
                books
                    .audit_log
                    .iter()
                    .filter(|a| period.contains(a.date))
                    .count() as u64
            })
            .await)
    }
}

impl PeriodReader for InMemoryStore {
    async fn accounting_periods(
        &self,
        company_id: CompanyId,
        window: ReportPeriod,
    ) -> Result<Vec<AccountingPeriod>, RepositoryError> {
        Ok(self
            .with_books(company_id, Vec::new(), |books| {
                books
                    .periods
                    .iter()
                    .filter(|p| p.start_date <= window.end && p.end_date >= window.start)
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl BalanceSnapshotReader for InMemoryStore {
    async fn closing_balances(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> Result<Vec<AccountBalance>, RepositoryError> {
        Ok(self.balances_at(company_id, date, SnapshotKind::Closing).await)
    }

    async fn opening_balances(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> Result<Vec<AccountBalance>, RepositoryError> {
        Ok(self.balances_at(company_id, date, SnapshotKind::Opening).await)
    }
}

impl ControlsReader for InMemoryStore {
    /// Collected VAT is credited, deductible VAT debited, and VAT due
    /// credited when the return is booked.
    async fn vat_position(
        &self,
        company_id: CompanyId,
        period: ReportPeriod,
    ) -> Result<VatPosition, RepositoryError> {
        Ok(self
            .with_books(company_id, VatPosition::default(), |books| {
                let accounts = &books.vat_accounts;
                let mut vat = VatPosition::default();
                let lines = books
                    .booked_entries()
                    .filter(|e| period.contains(e.entry_date))
                    .flat_map(|e| e.lines.iter());
                for line in lines {
                    let number = line.account_number.as_str();
                    if number.starts_with(accounts.collected.as_str()) {
                        vat.collected += line.credit;
                    } else if number.starts_with(accounts.deductible.as_str()) {
                        vat.deductible += line.debit;
                    } else if number.starts_with(accounts.due.as_str()) {
                        vat.due += line.credit;
                    }
                }
                vat
            })
            .await)
    }

    async fn depreciation_controls(
        &self,
        company_id: CompanyId,
        _period: ReportPeriod,
    ) -> Result<Vec<ControlItem>, RepositoryError> {
        Ok(self
            .with_books(company_id, Vec::new(), |books| {
                books.depreciation_controls.clone()
            })
            .await)
    }

    async fn provision_controls(
        &self,
        company_id: CompanyId,
        _period: ReportPeriod,
    ) -> Result<Vec<ControlItem>, RepositoryError> {
        Ok(self
            .with_books(company_id, Vec::new(), |books| books.provision_controls.clone())
            .await)
    }
}
