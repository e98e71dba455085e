use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use ledgerguard_shared::types::{CompanyId, JournalEntryId, JournalId, PeriodId};

use super::*;
use crate::repository::{
    AccountBalance, AccountingPeriod, AuditLogReader, BalanceSnapshotReader,
    ChartOfAccountsReader, ChartAccount, CompanyDirectory, CompanyProfile, ControlItem,
    ControlsReader, EntryStatus, JournalEntryRecord, JournalRepository, NewJournalEntry,
    PeriodReader, PostedLine, ReportPeriod, RepositoryError, VatPosition,
};
use crate::standard::{DEFAULT_SAMPLE_SIZE, StandardDetector};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn january() -> ReportPeriod {
    ReportPeriod::new(date(2025, 1, 1), date(2025, 1, 31))
}

#[derive(Default)]
struct FakeBooks {
    entries: Vec<JournalEntryRecord>,
    periods: Vec<AccountingPeriod>,
    closing: Vec<AccountBalance>,
    opening: Vec<AccountBalance>,
    vat: VatPosition,
    audit_entries: u64,
    modifications: u64,
    snapshots_unavailable: bool,
    controls_unavailable: bool,
    entries_fail: bool,
    vat_panics: bool,
}

impl FakeBooks {
    fn healthy() -> Self {
        Self {
            entries: vec![entry(
                "VE-2025-00001",
                vec![
                    PostedLine::new("411000", dec!(120), dec!(0)),
                    PostedLine::new("707000", dec!(0), dec!(100)),
                    PostedLine::new("445710", dec!(0), dec!(20)),
                ],
            )],
            periods: vec![AccountingPeriod {
                id: PeriodId::new(),
                start_date: date(2025, 1, 1),
                end_date: date(2025, 1, 31),
                is_open: true,
                is_closed: false,
            }],
            closing: vec![AccountBalance {
                account_number: "512000".into(),
                balance: dec!(1500),
            }],
            opening: vec![AccountBalance {
                account_number: "512000".into(),
                balance: dec!(1500),
            }],
            vat: VatPosition {
                collected: dec!(20),
                deductible: dec!(5),
                due: dec!(15),
            },
            audit_entries: 1,
            modifications: 1,
            ..Self::default()
        }
    }
}

fn entry(reference: &str, lines: Vec<PostedLine>) -> JournalEntryRecord {
    JournalEntryRecord {
        id: JournalEntryId::new(),
        journal_id: None,
        entry_number: Some(reference.to_string()),
        reference: reference.to_string(),
        entry_date: date(2025, 1, 15),
        status: EntryStatus::Validated,
        lines,
    }
}

impl CompanyDirectory for FakeBooks {
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

impl ChartOfAccountsReader for FakeBooks {
    async fn active_accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<ChartAccount>, RepositoryError> {
        Ok(vec![ChartAccount::new(company_id, "512000", "Bank")])
    }
}

impl JournalRepository for FakeBooks {
    async fn journal_code(
        &self,
        _company_id: CompanyId,
        _journal_id: JournalId,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(None)
    }

    async fn last_entry_number(
        &self,
        _company_id: CompanyId,
        _journal_id: JournalId,
        _year: i32,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(None)
    }

    async fn entries(
        &self,
        _company_id: CompanyId,
        period: ReportPeriod,
        status: EntryStatus,
    ) -> Result<Vec<JournalEntryRecord>, RepositoryError> {
        if self.entries_fail {
            return Err(RepositoryError::Backend("connection reset".into()));
        }
        Ok(self
            .entries
            .iter()
            .filter(|e| e.status == status && period.contains(e.entry_date))
            .cloned()
            .collect())
    }

    async fn count_modified_entries(
        &self,
        _company_id: CompanyId,
        _period: ReportPeriod,
    ) -> Result<u64, RepositoryError> {
        Ok(self.modifications)
    }

    async fn insert_entry(&self, _entry: NewJournalEntry) -> Result<JournalEntryId, RepositoryError> {
        Err(RepositoryError::Backend("read-only".into()))
    }
}

impl AuditLogReader for FakeBooks {
    async fn count_audit_entries(
        &self,
        _company_id: CompanyId,
        _period: ReportPeriod,
    ) -> Result<u64, RepositoryError> {
        Ok(self.audit_entries)
    }
}

impl PeriodReader for FakeBooks {
    async fn accounting_periods(
        &self,
        _company_id: CompanyId,
        _window: ReportPeriod,
    ) -> Result<Vec<AccountingPeriod>, RepositoryError> {
        Ok(self.periods.clone())
    }
}

impl BalanceSnapshotReader for FakeBooks {
    async fn closing_balances(
        &self,
        _company_id: CompanyId,
        _date: NaiveDate,
    ) -> Result<Vec<AccountBalance>, RepositoryError> {
        if self.snapshots_unavailable {
            return Err(RepositoryError::Unavailable("balance snapshots".into()));
        }
        Ok(self.closing.clone())
    }

    async fn opening_balances(
        &self,
        _company_id: CompanyId,
        _date: NaiveDate,
    ) -> Result<Vec<AccountBalance>, RepositoryError> {
        Ok(self.opening.clone())
    }
}

impl ControlsReader for FakeBooks {
    async fn vat_position(
        &self,
        _company_id: CompanyId,
        _period: ReportPeriod,
    ) -> Result<VatPosition, RepositoryError> {
        if self.vat_panics {
            panic!("vat ledger corrupted");
        }
        if self.controls_unavailable {
            return Err(RepositoryError::Unavailable("vat".into()));
        }
        Ok(self.vat)
    }

    async fn depreciation_controls(
        &self,
        _company_id: CompanyId,
        _period: ReportPeriod,
    ) -> Result<Vec<ControlItem>, RepositoryError> {
        if self.controls_unavailable {
            return Err(RepositoryError::Unavailable("depreciation".into()));
        }
        Ok(Vec::new())
    }

    async fn provision_controls(
        &self,
        _company_id: CompanyId,
        _period: ReportPeriod,
    ) -> Result<Vec<ControlItem>, RepositoryError> {
        if self.controls_unavailable {
            return Err(RepositoryError::Unavailable("provisions".into()));
        }
        Ok(vec![ControlItem {
            reference: "PRV-001".into(),
            flagged: true,
            note: Some("Provision exceeds the disputed amount".into()),
        }])
    }
}

fn engine_with(books: FakeBooks, config: IntegrityConfig) -> IntegrityAuditEngine<FakeBooks> {
    let source = Arc::new(books);
    let detector = Arc::new(StandardDetector::new(source.clone(), DEFAULT_SAMPLE_SIZE));
    IntegrityAuditEngine::new(source, detector, config).with_today(date(2025, 2, 10))
}

fn engine(books: FakeBooks) -> IntegrityAuditEngine<FakeBooks> {
    engine_with(books, IntegrityConfig::default())
}

#[tokio::test]
async fn test_report_runs_every_check() {
    let engine = engine(FakeBooks::healthy());
    let report = engine
        .run_integrity_checks(CompanyId::new(), Some(january()))
        .await;

    assert_eq!(report.checks.len(), 8);
    let ids: Vec<CheckId> = report.checks.iter().map(|r| r.check_id).collect();
    assert_eq!(ids, CheckId::ALL.to_vec());
    assert_eq!(
        report.result(CheckId::BalanceVerification).unwrap().status,
        CheckStatus::Passed
    );
    // January ended before today and is still open
    assert_eq!(
        report.result(CheckId::PeriodClosureIntegrity).unwrap().status,
        CheckStatus::Warning
    );
    assert_eq!(
        report.result(CheckId::ProvisionReasonableness).unwrap().status,
        CheckStatus::Warning
    );
    assert_eq!(report.summary.total_checks, 8);
    assert_eq!(report.summary.warnings, 2);
    assert!(!report.has_critical_issues());
}

#[tokio::test]
async fn test_unbalanced_entry_is_critical() {
    let mut books = FakeBooks::healthy();
    books.entries.push(entry(
        "AC-2025-00001",
        vec![
            PostedLine::new("607000", dec!(100), dec!(0)),
            PostedLine::new("401000", dec!(0), dec!(90)),
        ],
    ));
    let report = engine(books)
        .run_integrity_checks(CompanyId::new(), Some(january()))
        .await;

    let balance = report.result(CheckId::BalanceVerification).unwrap();
    assert_eq!(balance.status, CheckStatus::Failed);
    assert_eq!(balance.message, "1 unbalanced entries found");
    assert_eq!(
        balance.details.as_ref().unwrap()["unbalanced_entries"][0],
        "AC-2025-00001"
    );
    assert!(report.summary.critical_issues >= 1);
    assert!(report.has_critical_issues());
}

#[tokio::test]
async fn test_panicking_check_is_isolated() {
    let books = FakeBooks {
        vat_panics: true,
        ..FakeBooks::healthy()
    };
    let report = engine(books)
        .run_integrity_checks(CompanyId::new(), Some(january()))
        .await;

    assert_eq!(report.checks.len(), 8);
    let vat = report.result(CheckId::VatBalanceVerification).unwrap();
    assert_eq!(vat.status, CheckStatus::Failed);
    assert!(vat.message.starts_with("Execution error"));
    assert!(vat.message.contains("vat ledger corrupted"));
    assert_eq!(
        report.result(CheckId::BalanceVerification).unwrap().status,
        CheckStatus::Passed
    );
    // VAT is not a critical check
    assert_eq!(report.summary.critical_issues, 0);
}

#[tokio::test]
async fn test_read_failure_fails_critical_checks() {
    let books = FakeBooks {
        entries_fail: true,
        ..FakeBooks::healthy()
    };
    let report = engine(books)
        .run_integrity_checks(CompanyId::new(), Some(january()))
        .await;

    let balance = report.result(CheckId::BalanceVerification).unwrap();
    assert_eq!(balance.status, CheckStatus::Failed);
    assert!(balance.message.contains("connection reset"));
    assert_eq!(report.summary.critical_issues, 2);
}

#[tokio::test]
async fn test_unavailable_data_gives_warnings() {
    let books = FakeBooks {
        snapshots_unavailable: true,
        controls_unavailable: true,
        ..FakeBooks::healthy()
    };
    let report = engine(books)
        .run_integrity_checks(CompanyId::new(), Some(january()))
        .await;

    for id in [
        CheckId::AccountBalanceContinuity,
        CheckId::VatBalanceVerification,
        CheckId::DepreciationConsistency,
        CheckId::ProvisionReasonableness,
    ] {
        assert_eq!(report.result(id).unwrap().status, CheckStatus::Warning, "{id}");
    }
    assert_eq!(
        report.result(CheckId::AccountBalanceContinuity).unwrap().message,
        "Cannot verify balance continuity (previous period unavailable)"
    );
    assert_eq!(report.summary.failed, 0);
}

#[tokio::test]
async fn test_vat_imbalance_fails() {
    let books = FakeBooks {
        vat: VatPosition {
            collected: dec!(200),
            deductible: dec!(50),
            due: dec!(100),
        },
        ..FakeBooks::healthy()
    };
    let result = engine(books)
        .run_specific_check("vat_balance_verification", CompanyId::new(), Some(january()))
        .await
        .unwrap();
    assert_eq!(result.status, CheckStatus::Failed);
    assert_eq!(result.message, "VAT imbalance detected: 50.00");
}

#[tokio::test]
async fn test_disabled_checks_are_skipped() {
    let engine = engine(FakeBooks::healthy());
    engine
        .set_check_enabled("provision_reasonableness", false)
        .unwrap();
    engine
        .set_check_enabled("period_closure_integrity", false)
        .unwrap();

    let report = engine
        .run_integrity_checks(CompanyId::new(), Some(january()))
        .await;
    assert_eq!(report.checks.len(), 6);
    assert!(report.result(CheckId::ProvisionReasonableness).is_none());
    assert_eq!(report.summary.passed, 6);

    let disabled: Vec<CheckId> = engine
        .available_checks()
        .into_iter()
        .filter(|c| !c.enabled)
        .map(|c| c.id)
        .collect();
    assert_eq!(disabled.len(), 2);

    // Specific runs ignore the enabled flag
    let result = engine
        .run_specific_check("provision_reasonableness", CompanyId::new(), Some(january()))
        .await
        .unwrap();
    assert_eq!(result.status, CheckStatus::Warning);
}

#[tokio::test]
async fn test_unknown_check() {
    let engine = engine(FakeBooks::healthy());
    let err = engine
        .run_specific_check("ledger_magic", CompanyId::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, IntegrityError::UnknownCheck(ref id) if id == "ledger_magic"));
    assert!(engine.set_check_enabled("ledger_magic", false).is_err());
}

#[tokio::test]
async fn test_default_period_is_current_month() {
    let report = engine(FakeBooks::healthy())
        .run_integrity_checks(CompanyId::new(), None)
        .await;
    assert_eq!(report.period, ReportPeriod::new(date(2025, 2, 1), date(2025, 2, 28)));
    // The January entry is outside February
    assert_eq!(
        report.result(CheckId::BalanceVerification).unwrap().status,
        CheckStatus::Passed
    );
}

#[tokio::test]
async fn test_sequential_run_matches_concurrent() {
    let config = IntegrityConfig {
        run_concurrently: false,
        ..IntegrityConfig::default()
    };
    let sequential = engine_with(FakeBooks::healthy(), config)
        .run_integrity_checks(CompanyId::new(), Some(january()))
        .await;
    let concurrent = engine(FakeBooks::healthy())
        .run_integrity_checks(CompanyId::new(), Some(january()))
        .await;

    assert_eq!(sequential.summary, concurrent.summary);
    let statuses = |r: &IntegrityReport| r.checks.iter().map(|c| c.status).collect::<Vec<_>>();
    assert_eq!(statuses(&sequential), statuses(&concurrent));
}

#[test]
fn test_calculate_summary() {
    let result = |id: CheckId, outcome: CheckOutcome| {
        IntegrityResult::from_outcome(&IntegrityCheck::definition(id), outcome)
    };
    let results = vec![
        result(CheckId::BalanceVerification, CheckOutcome::failed("x")),
        result(CheckId::VatBalanceVerification, CheckOutcome::failed("x")),
        result(CheckId::DoubleEntryVerification, CheckOutcome::passed("ok")),
        result(CheckId::PeriodClosureIntegrity, CheckOutcome::warning("late")),
    ];
    let summary = IntegrityAuditEngine::<FakeBooks>::calculate_summary(&results);
    assert_eq!(
        summary,
        ReportSummary {
            total_checks: 4,
            passed: 1,
            failed: 2,
            warnings: 1,
            critical_issues: 1,
        }
    );
}
