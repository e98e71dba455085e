//! Accounting engine facade.
//!
//! One [`AccountingEngine`] per process (or per data source) wires the
//! detector, mapper, classifier, journal service and integrity audit together
//! over a single shared data source.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use ledgerguard_shared::AppConfig;
use ledgerguard_shared::types::{AccountId, CompanyId, JournalId, Tolerance};

use crate::hao::{self, AccountNumbered, Split};
use crate::integrity::{
    IntegrityAuditEngine, IntegrityCheck, IntegrityConfig, IntegrityError, IntegrityReport,
    IntegrityResult,
};
use crate::journal::{
    EntrySide, EntryValidation, JournalEntryCandidate, JournalEntryValidator, JournalError,
    JournalService, JournalType, PostedEntry, suggest_journal_for,
};
use crate::mapping::{MappingError, UniversalAccountMapper, UniversalAccountType};
use crate::nature::{AccountNature, AccountNatureClassifier, LineSideCheck};
use crate::repository::{ChartAccount, IntegritySource, ReportPeriod, account_class};
use crate::standard::{AccountingStandard, DEFAULT_SAMPLE_SIZE, Detection, StandardDetector};

/// Engine settings, resolved from the application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Accounts sampled by the chart-scoring detection fallback.
    pub detection_sample_size: usize,
    /// Replaces the default flexible prefixes when set.
    pub flexible_prefixes: Option<Vec<String>>,
    /// Accepted imbalance of a candidate entry.
    pub journal_tolerance: Tolerance,
    /// Posting attempts on entry-number collisions.
    pub max_number_attempts: u32,
    /// Integrity audit thresholds.
    pub integrity: IntegrityConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection_sample_size: DEFAULT_SAMPLE_SIZE,
            flexible_prefixes: None,
            journal_tolerance: Tolerance::cent(),
            max_number_attempts: 3,
            integrity: IntegrityConfig::default(),
        }
    }
}

impl From<&AppConfig> for EngineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            detection_sample_size: config.engine.detection_sample_size,
            flexible_prefixes: config.engine.flexible_prefixes.clone(),
            journal_tolerance: config.journal.balance_tolerance,
            max_number_attempts: config.journal.max_number_attempts,
            integrity: IntegrityConfig::from(&config.integrity),
        }
    }
}

/// An account with its derived classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    /// The account.
    pub account: ChartAccount,
    /// Class digit of a numeric account number.
    pub class: Option<u8>,
    /// Normal balance side under the company's standard.
    pub nature: AccountNature,
    /// The company's standard.
    pub standard: AccountingStandard,
}

/// A journal template line resolved against a company's chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTemplateLine {
    /// Role of the line.
    pub role: UniversalAccountType,
    /// Side of the line.
    pub side: EntrySide,
    /// Account playing the role, if the chart has one.
    pub account: Option<ChartAccount>,
}

/// Classification, mapping, validation and integrity over one data source.
pub struct AccountingEngine<S> {
    detector: Arc<StandardDetector<S>>,
    mapper: Arc<UniversalAccountMapper<S>>,
    classifier: Arc<AccountNatureClassifier>,
    journals: JournalService<S>,
    integrity: IntegrityAuditEngine<S>,
}

impl<S: IntegritySource> AccountingEngine<S> {
    /// Builds an engine over a data source.
    #[must_use]
    pub fn new(source: Arc<S>, config: EngineConfig) -> Self {
        let detector = Arc::new(StandardDetector::new(
            Arc::clone(&source),
            config.detection_sample_size,
        ));
        let mapper = Arc::new(UniversalAccountMapper::new(
            Arc::clone(&source),
            Arc::clone(&detector),
        ));
        let classifier = Arc::new(match config.flexible_prefixes {
            Some(prefixes) => AccountNatureClassifier::with_flexible_prefixes(prefixes),
            None => AccountNatureClassifier::new(),
        });
        let validator = Arc::new(JournalEntryValidator::new(
            Arc::clone(&classifier),
            config.journal_tolerance,
        ));
        let journals = JournalService::new(
            Arc::clone(&source),
            Arc::clone(&detector),
            Arc::clone(&mapper),
            validator,
            config.max_number_attempts,
        );
        let integrity = IntegrityAuditEngine::new(source, Arc::clone(&detector), config.integrity);

        info!(
            sample_size = config.detection_sample_size,
            max_number_attempts = config.max_number_attempts,
            "Accounting engine ready"
        );

        Self {
            detector,
            mapper,
            classifier,
            journals,
            integrity,
        }
    }

    /// Pins the integrity audit's notion of today.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.integrity = self.integrity.with_today(today);
        self
    }

    // Standards

    /// Returns the company's accounting standard.
    pub async fn detect_standard(&self, company_id: CompanyId) -> AccountingStandard {
        self.detector.detect(company_id).await
    }

    /// Returns the company's accounting standard with what decided it.
    pub async fn detect_standard_with_basis(&self, company_id: CompanyId) -> Detection {
        self.detector.detect_with_basis(company_id).await
    }

    // Mapping

    /// Finds the account playing `role` in the company's chart.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read.
    pub async fn find_account_by_type(
        &self,
        company_id: CompanyId,
        role: UniversalAccountType,
    ) -> Result<Option<ChartAccount>, MappingError> {
        self.mapper.find_account_by_type(company_id, role).await
    }

    /// Resolves the main roles of the company.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read.
    pub async fn get_main_accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<BTreeMap<UniversalAccountType, ChartAccount>, MappingError> {
        self.mapper.get_main_accounts(company_id).await
    }

    /// Drops the cached chart of one company, or of every company.
    pub fn clear_cache(&self, company_id: Option<CompanyId>) {
        self.mapper.clear_cache(company_id);
    }

    /// Resolves the template of a journal type against the company's chart.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read.
    pub async fn journal_template(
        &self,
        company_id: CompanyId,
        journal_type: JournalType,
    ) -> Result<Vec<ResolvedTemplateLine>, MappingError> {
        let template = journal_type.template();
        let roles: Vec<UniversalAccountType> = template.iter().map(|l| l.role).collect();
        let resolved = self.mapper.resolve_roles(company_id, &roles).await?;

        Ok(template
            .iter()
            .map(|line| ResolvedTemplateLine {
                role: line.role,
                side: line.side,
                account: resolved.get(&line.role).cloned(),
            })
            .collect())
    }

    /// Returns an account of the company with its class and nature.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read.
    pub async fn account_info(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<Option<AccountInfo>, MappingError> {
        let Some(account) = self.mapper.find_account_by_id(company_id, account_id).await? else {
            return Ok(None);
        };
        let standard = self.detector.detect(company_id).await;
        Ok(Some(AccountInfo {
            class: account.account_class.or_else(|| account_class(&account.account_number)),
            nature: self.classifier.classify(&account.account_number, standard),
            standard,
            account,
        }))
    }

    // Nature

    /// Returns the normal balance side of an account.
    #[must_use]
    pub fn classify_nature(&self, account_number: &str, standard: AccountingStandard) -> AccountNature {
        self.classifier.classify(account_number, standard)
    }

    /// Checks the side of one journal line.
    #[must_use]
    pub fn validate_line_side(
        &self,
        account_number: &str,
        standard: AccountingStandard,
        debit: Decimal,
        credit: Decimal,
    ) -> LineSideCheck {
        self.classifier
            .validate_line_side(account_number, standard, debit, credit)
    }

    /// Replaces the flexible account prefixes of this engine.
    pub fn set_flexible_prefixes<I, P>(&self, prefixes: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.classifier.set_flexible_prefixes(prefixes);
    }

    /// Returns a copy of the flexible account prefixes.
    #[must_use]
    pub fn flexible_prefixes(&self) -> Vec<String> {
        self.classifier.flexible_prefixes()
    }

    // Journal

    /// Validates a candidate entry under `standard`, or under the company's
    /// detected standard when `None`.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Mapping` if account ids cannot be resolved.
    pub async fn validate_journal_entry(
        &self,
        candidate: &JournalEntryCandidate,
        standard: Option<AccountingStandard>,
    ) -> Result<EntryValidation, JournalError> {
        match standard {
            Some(standard) => self.journals.validate(candidate, standard).await,
            None => self.journals.validate_for_company(candidate).await,
        }
    }

    /// Allocates the next entry number of a journal.
    pub async fn generate_entry_number(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        entry_date: NaiveDate,
    ) -> String {
        self.journals
            .generate_entry_number(company_id, journal_id, entry_date)
            .await
    }

    /// Suggests a journal from the accounts used by an entry.
    #[must_use]
    pub fn suggest_journal<N: AsRef<str>>(
        &self,
        standard: AccountingStandard,
        account_numbers: &[N],
    ) -> JournalType {
        suggest_journal_for(standard, account_numbers)
    }

    /// Validates, numbers and persists an entry.
    ///
    /// # Errors
    ///
    /// See [`JournalService::post_entry`].
    pub async fn post_entry(
        &self,
        candidate: &JournalEntryCandidate,
    ) -> Result<PostedEntry, JournalError> {
        self.journals.post_entry(candidate).await
    }

    // HAO

    /// Splits revenue items between ordinary operations and HAO.
    pub fn split_revenues<T, I>(&self, items: I, standard: AccountingStandard) -> Split<T>
    where
        T: AccountNumbered,
        I: IntoIterator<Item = T>,
    {
        hao::split_revenues(items, standard)
    }

    /// Splits expense items between ordinary operations and HAO.
    pub fn split_expenses<T, I>(&self, items: I, standard: AccountingStandard) -> Split<T>
    where
        T: AccountNumbered,
        I: IntoIterator<Item = T>,
    {
        hao::split_expenses(items, standard)
    }

    /// Returns true if the account belongs to the standard's HAO class.
    #[must_use]
    pub fn is_hao(&self, account_number: &str, standard: AccountingStandard) -> bool {
        hao::is_hao(account_number, standard)
    }

    // Integrity

    /// Runs every enabled integrity check.
    pub async fn run_integrity_checks(
        &self,
        company_id: CompanyId,
        period: Option<ReportPeriod>,
    ) -> IntegrityReport {
        self.integrity.run_integrity_checks(company_id, period).await
    }

    /// Runs one integrity check.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::UnknownCheck` if no check has this id.
    pub async fn run_specific_check(
        &self,
        check_id: &str,
        company_id: CompanyId,
        period: Option<ReportPeriod>,
    ) -> Result<IntegrityResult, IntegrityError> {
        self.integrity
            .run_specific_check(check_id, company_id, period)
            .await
    }

    /// Returns the integrity check definitions with their enabled flags.
    #[must_use]
    pub fn available_checks(&self) -> Vec<IntegrityCheck> {
        self.integrity.available_checks()
    }

    /// Enables or disables an integrity check.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::UnknownCheck` if no check has this id.
    pub fn set_check_enabled(&self, check_id: &str, enabled: bool) -> Result<(), IntegrityError> {
        self.integrity.set_check_enabled(check_id, enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerguard_shared::config::LogFormat;
    use rust_decimal_macros::dec;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.detection_sample_size, 50);
        assert_eq!(config.journal_tolerance.value(), dec!(0.01));
        assert_eq!(config.max_number_attempts, 3);
        assert!(config.integrity.run_concurrently);
    }

    #[test]
    fn test_engine_config_from_app_config() {
        let mut app = AppConfig::default();
        app.engine.detection_sample_size = 10;
        app.engine.flexible_prefixes = Some(vec!["47".to_string()]);
        app.journal.max_number_attempts = 5;
        app.integrity.run_concurrently = false;
        app.integrity.vat_tolerance = Tolerance::new(dec!(0.5));
        app.logging.format = LogFormat::Json;

        let config = EngineConfig::from(&app);
        assert_eq!(config.detection_sample_size, 10);
        assert_eq!(config.flexible_prefixes, Some(vec!["47".to_string()]));
        assert_eq!(config.max_number_attempts, 5);
        assert!(!config.integrity.run_concurrently);
        assert_eq!(config.integrity.vat_tolerance.value(), dec!(0.5));
    }

    #[test]
    fn test_default_matches_default_app_config() {
        assert_eq!(EngineConfig::from(&AppConfig::default()), EngineConfig::default());
    }
}
