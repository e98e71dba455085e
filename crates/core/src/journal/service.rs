//! Journal service: validation against a company's chart, numbering, posting.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use ledgerguard_shared::types::{AccountId, CompanyId, JournalId};

use super::error::JournalError;
use super::numbering::generate_entry_number;
use super::types::{AccountRef, EntryValidation, JournalEntryCandidate, PostedEntry};
use super::validation::JournalEntryValidator;
use crate::mapping::UniversalAccountMapper;
use crate::repository::{
    ChartOfAccountsReader, CompanyDirectory, JournalRepository, NewJournalEntry, PostedLine,
    RepositoryError,
};
use crate::standard::{AccountingStandard, StandardDetector};

/// Validates and posts journal entries for companies.
pub struct JournalService<S> {
    source: Arc<S>,
    detector: Arc<StandardDetector<S>>,
    mapper: Arc<UniversalAccountMapper<S>>,
    validator: Arc<JournalEntryValidator>,
    max_number_attempts: u32,
}

impl<S> JournalService<S>
where
    S: CompanyDirectory + ChartOfAccountsReader + JournalRepository,
{
    /// Creates a journal service.
    #[must_use]
    pub fn new(
        source: Arc<S>,
        detector: Arc<StandardDetector<S>>,
        mapper: Arc<UniversalAccountMapper<S>>,
        validator: Arc<JournalEntryValidator>,
        max_number_attempts: u32,
    ) -> Self {
        Self {
            source,
            detector,
            mapper,
            validator,
            max_number_attempts: max_number_attempts.max(1),
        }
    }

    /// Validates a candidate under an explicit standard, resolving account ids
    /// against the company's chart.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Mapping` if the chart cannot be read.
    pub async fn validate(
        &self,
        candidate: &JournalEntryCandidate,
        standard: AccountingStandard,
    ) -> Result<EntryValidation, JournalError> {
        let numbers = self.account_numbers(candidate).await?;
        Ok(self
            .validator
            .validate(candidate, standard, |id| numbers.get(&id).cloned()))
    }

    /// Validates a candidate under the company's detected standard.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Mapping` if the chart cannot be read.
    pub async fn validate_for_company(
        &self,
        candidate: &JournalEntryCandidate,
    ) -> Result<EntryValidation, JournalError> {
        let standard = self.detector.detect(candidate.company_id).await;
        self.validate(candidate, standard).await
    }

    /// Allocates the next entry number of a journal.
    pub async fn generate_entry_number(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        entry_date: NaiveDate,
    ) -> String {
        generate_entry_number(self.source.as_ref(), company_id, journal_id, entry_date).await
    }

    /// Validates, numbers and persists an entry.
    ///
    /// When the store reports the allocated number as taken, a new number is
    /// computed and the insert retried, up to the configured attempt count.
    ///
    /// # Errors
    ///
    /// - `JournalError::Rejected` if validation finds blocking errors
    /// - `JournalError::NumberExhausted` if every attempt collided
    /// - `JournalError::Mapping` / `JournalError::Repository` on data failures
    pub async fn post_entry(
        &self,
        candidate: &JournalEntryCandidate,
    ) -> Result<PostedEntry, JournalError> {
        let company_id = candidate.company_id;
        let standard = self.detector.detect(company_id).await;
        let numbers = self.account_numbers(candidate).await?;

        let validation =
            self.validator
                .validate(candidate, standard, |id| numbers.get(&id).cloned());
        if !validation.valid {
            debug!(
                company_id = %company_id,
                errors = validation.errors.len(),
                "Journal entry rejected"
            );
            return Err(JournalError::Rejected(validation));
        }

        let lines: Vec<PostedLine> = candidate
            .lines
            .iter()
            .filter_map(|line| {
                let number = match &line.account {
                    AccountRef::Number(number) => number.clone(),
                    AccountRef::Id(id) => numbers.get(id)?.clone(),
                };
                Some(PostedLine::new(number, line.debit, line.credit))
            })
            .collect();

        for attempt in 1..=self.max_number_attempts {
            let entry_number = self
                .generate_entry_number(company_id, candidate.journal_id, candidate.entry_date)
                .await;
            let entry = NewJournalEntry {
                company_id,
                journal_id: candidate.journal_id,
                entry_number: entry_number.clone(),
                entry_date: candidate.entry_date,
                description: candidate.description.clone(),
                lines: lines.clone(),
            };

            match self.source.insert_entry(entry).await {
                Ok(id) => {
                    info!(
                        company_id = %company_id,
                        entry_number = %entry_number,
                        attempt,
                        "Journal entry posted"
                    );
                    return Ok(PostedEntry {
                        id,
                        entry_number,
                        warnings: validation.warnings,
                    });
                }
                Err(RepositoryError::UniqueViolation(_)) => {
                    warn!(
                        company_id = %company_id,
                        entry_number = %entry_number,
                        attempt,
                        "Entry number already taken, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(JournalError::NumberExhausted {
            attempts: self.max_number_attempts,
        })
    }

    /// Maps the account ids referenced by the candidate to account numbers.
    async fn account_numbers(
        &self,
        candidate: &JournalEntryCandidate,
    ) -> Result<HashMap<AccountId, String>, JournalError> {
        if !candidate
            .lines
            .iter()
            .any(|l| matches!(l.account, AccountRef::Id(_)))
        {
            return Ok(HashMap::new());
        }
        let accounts = self.mapper.accounts(candidate.company_id).await?;
        Ok(accounts
            .iter()
            .map(|a| (a.id, a.account_number.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::types::JournalLineInput;
    use crate::nature::AccountNatureClassifier;
    use crate::repository::{
        ChartAccount, CompanyProfile, EntryStatus, JournalEntryRecord, ReportPeriod,
    };
    use crate::standard::DEFAULT_SAMPLE_SIZE;
    use chrono::Datelike;
    use ledgerguard_shared::types::{JournalEntryId, Tolerance};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct FakeLedger {
        accounts: Vec<ChartAccount>,
        numbers: Mutex<Vec<String>>,
        collisions: Mutex<u32>,
    }

    impl FakeLedger {
        fn new(accounts: Vec<ChartAccount>, collisions: u32) -> Self {
            Self {
                accounts,
                numbers: Mutex::new(Vec::new()),
                collisions: Mutex::new(collisions),
            }
        }
    }

    impl CompanyDirectory for FakeLedger {
        async fn company_profile(
            &self,
            company_id: CompanyId,
        ) -> Result<Option<CompanyProfile>, RepositoryError> {
            Ok(Some(CompanyProfile {
                id: company_id,
                country_code: Some("FR".into()),
                accounting_standard: None,
            }))
        }
    }

    impl ChartOfAccountsReader for FakeLedger {
        async fn active_accounts(
            &self,
            _company_id: CompanyId,
        ) -> Result<Vec<ChartAccount>, RepositoryError> {
            Ok(self.accounts.clone())
        }
    }

    impl JournalRepository for FakeLedger {
        async fn journal_code(
            &self,
            _company_id: CompanyId,
            _journal_id: JournalId,
        ) -> Result<Option<String>, RepositoryError> {
            Ok(Some("BQ".into()))
        }

        async fn last_entry_number(
            &self,
            _company_id: CompanyId,
            _journal_id: JournalId,
            _year: i32,
        ) -> Result<Option<String>, RepositoryError> {
            Ok(self.numbers.lock().unwrap().last().cloned())
        }

        async fn entries(
            &self,
            _company_id: CompanyId,
            _period: ReportPeriod,
            _status: EntryStatus,
        ) -> Result<Vec<JournalEntryRecord>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn count_modified_entries(
            &self,
            _company_id: CompanyId,
            _period: ReportPeriod,
        ) -> Result<u64, RepositoryError> {
            Ok(0)
        }

        async fn insert_entry(
            &self,
            entry: NewJournalEntry,
        ) -> Result<JournalEntryId, RepositoryError> {
            let mut collisions = self.collisions.lock().unwrap();
            let mut numbers = self.numbers.lock().unwrap();
            if *collisions > 0 {
                // Another writer takes the number first.
                *collisions -= 1;
                numbers.push(entry.entry_number.clone());
                return Err(RepositoryError::UniqueViolation(entry.entry_number));
            }
            numbers.push(entry.entry_number);
            Ok(JournalEntryId::new())
        }
    }

    fn service(ledger: FakeLedger, attempts: u32) -> (Arc<FakeLedger>, JournalService<FakeLedger>) {
        let source = Arc::new(ledger);
        let detector = Arc::new(StandardDetector::new(
            Arc::clone(&source),
            DEFAULT_SAMPLE_SIZE,
        ));
        let mapper = Arc::new(UniversalAccountMapper::new(
            Arc::clone(&source),
            Arc::clone(&detector),
        ));
        let validator = Arc::new(JournalEntryValidator::new(
            Arc::new(AccountNatureClassifier::new()),
            Tolerance::cent(),
        ));
        let service = JournalService::new(Arc::clone(&source), detector, mapper, validator, attempts);
        (source, service)
    }

    fn candidate(company_id: CompanyId, bank: AccountId, customers: AccountId) -> JournalEntryCandidate {
        let mut lines = vec![
            JournalLineInput::debit("", dec!(250)),
            JournalLineInput::credit("", dec!(250)),
        ];
        lines[0].account = AccountRef::Id(bank);
        lines[1].account = AccountRef::Id(customers);
        JournalEntryCandidate {
            company_id,
            journal_id: JournalId::new(),
            entry_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            description: "Customer payment".into(),
            lines,
        }
    }

    fn chart(company_id: CompanyId) -> (Vec<ChartAccount>, AccountId, AccountId) {
        let bank = ChartAccount::new(company_id, "512000", "Banque");
        let customers = ChartAccount::new(company_id, "411000", "Clients");
        let (bank_id, customers_id) = (bank.id, customers.id);
        (vec![bank, customers], bank_id, customers_id)
    }

    #[tokio::test]
    async fn test_post_allocates_sequential_numbers() {
        let company = CompanyId::new();
        let (accounts, bank, customers) = chart(company);
        let (_, service) = service(FakeLedger::new(accounts, 0), 3);

        let entry = candidate(company, bank, customers);
        let first = service.post_entry(&entry).await.unwrap();
        let second = service.post_entry(&entry).await.unwrap();
        let year = entry.entry_date.year();
        assert_eq!(first.entry_number, format!("BQ-{year}-00001"));
        assert_eq!(second.entry_number, format!("BQ-{year}-00002"));
    }

    #[tokio::test]
    async fn test_post_retries_on_collision() {
        let company = CompanyId::new();
        let (accounts, bank, customers) = chart(company);
        let (source, service) = service(FakeLedger::new(accounts, 2), 3);

        let posted = service
            .post_entry(&candidate(company, bank, customers))
            .await
            .unwrap();
        assert_eq!(posted.entry_number, "BQ-2025-00003");
        assert_eq!(source.numbers.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_post_gives_up_after_max_attempts() {
        let company = CompanyId::new();
        let (accounts, bank, customers) = chart(company);
        let (_, service) = service(FakeLedger::new(accounts, 5), 2);

        let err = service
            .post_entry(&candidate(company, bank, customers))
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::NumberExhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_post_rejects_invalid_entry() {
        let company = CompanyId::new();
        let (accounts, bank, customers) = chart(company);
        let (source, service) = service(FakeLedger::new(accounts, 0), 3);

        let mut entry = candidate(company, bank, customers);
        entry.lines[1].credit = dec!(200);
        let err = service.post_entry(&entry).await.unwrap_err();
        match err {
            JournalError::Rejected(validation) => {
                assert!(!validation.valid);
                assert!(validation.errors[0].contains("difference: 50.00"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(source.numbers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_for_company_flags_unknown_id() {
        let company = CompanyId::new();
        let (accounts, bank, _) = chart(company);
        let (_, service) = service(FakeLedger::new(accounts, 0), 3);

        let validation = service
            .validate_for_company(&candidate(company, bank, AccountId::new()))
            .await
            .unwrap();
        assert!(!validation.valid);
        assert!(validation.errors[0].starts_with("Line 2: account"));
    }
}
