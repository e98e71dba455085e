//! Individual integrity checks.
//!
//! Each check reads through the data-source ports and returns a
//! [`CheckOutcome`]. Read failures that only limit what can be verified become
//! warnings here; those that make the books untrustworthy are returned as
//! errors and reported as failures by the engine.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use ledgerguard_shared::config::IntegritySettings;
use ledgerguard_shared::types::{CompanyId, Tolerance, format_amount};

use super::error::IntegrityError;
use super::types::{CheckId, CheckOutcome};
use crate::repository::{
    AccountBalance, AccountingPeriod, ControlItem, EntryStatus, IntegritySource,
    JournalEntryRecord, ReportPeriod,
};
use crate::standard::{AccountingStandard, StandardMapping, StandardRegistry};

/// Thresholds used by the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityConfig {
    /// Accepted imbalance of an entry or a carried-over balance.
    pub balance_tolerance: Tolerance,
    /// Minimum ratio of audit-log entries to modified entries.
    pub audit_trail_min_ratio: Decimal,
    /// Accepted VAT imbalance.
    pub vat_tolerance: Tolerance,
    /// Whether the checks of a run execute concurrently.
    pub run_concurrently: bool,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self::from(&IntegritySettings::default())
    }
}

impl From<&IntegritySettings> for IntegrityConfig {
    fn from(settings: &IntegritySettings) -> Self {
        Self {
            balance_tolerance: settings.balance_tolerance,
            audit_trail_min_ratio: settings.audit_trail_min_ratio,
            vat_tolerance: settings.vat_tolerance,
            run_concurrently: settings.run_concurrently,
        }
    }
}

/// Everything a check needs to run.
pub struct CheckContext<'a, S> {
    /// Data source.
    pub source: &'a S,
    /// Audited company.
    pub company_id: CompanyId,
    /// Audited period.
    pub period: ReportPeriod,
    /// The company's accounting standard.
    pub standard: AccountingStandard,
    /// Reference date for "past" periods.
    pub today: NaiveDate,
    /// Thresholds.
    pub config: &'a IntegrityConfig,
}

/// Runs one check.
///
/// # Errors
///
/// Returns `IntegrityError::Repository` when a read the check cannot do without fails.
pub async fn run_check<S: IntegritySource>(
    id: CheckId,
    ctx: &CheckContext<'_, S>,
) -> Result<CheckOutcome, IntegrityError> {
    match id {
        CheckId::BalanceVerification => balance_verification(ctx).await,
        CheckId::AccountBalanceContinuity => Ok(account_balance_continuity(ctx).await),
        CheckId::DoubleEntryVerification => double_entry_verification(ctx).await,
        CheckId::PeriodClosureIntegrity => period_closure_integrity(ctx).await,
        CheckId::AuditTrailCompleteness => Ok(audit_trail_completeness(ctx).await),
        CheckId::VatBalanceVerification => Ok(vat_balance_verification(ctx).await),
        CheckId::DepreciationConsistency => Ok(depreciation_consistency(ctx).await),
        CheckId::ProvisionReasonableness => Ok(provision_reasonableness(ctx).await),
    }
}

async fn balance_verification<S: IntegritySource>(
    ctx: &CheckContext<'_, S>,
) -> Result<CheckOutcome, IntegrityError> {
    let entries = ctx
        .source
        .entries(ctx.company_id, ctx.period, EntryStatus::Validated)
        .await?;
    let unbalanced = unbalanced_references(&entries, ctx.config.balance_tolerance);

    if unbalanced.is_empty() {
        return Ok(CheckOutcome::passed("All entries are balanced"));
    }
    Ok(
        CheckOutcome::failed(format!("{} unbalanced entries found", unbalanced.len()))
            .with_details(json!({ "unbalanced_entries": unbalanced }))
            .with_recommendations([
                "Review and correct the unbalanced entries",
                "Recompute the totals of the affected entries",
            ]),
    )
}

async fn account_balance_continuity<S: IntegritySource>(ctx: &CheckContext<'_, S>) -> CheckOutcome {
    let Ok(closing) = ctx
        .source
        .closing_balances(ctx.company_id, ctx.period.previous_close())
        .await
    else {
        return CheckOutcome::warning(
            "Cannot verify balance continuity (previous period unavailable)",
        );
    };
    let Ok(opening) = ctx
        .source
        .opening_balances(ctx.company_id, ctx.period.start)
        .await
    else {
        return CheckOutcome::warning("Cannot read the opening balances of the period");
    };

    let discrepancies = balance_discrepancies(
        &closing,
        &opening,
        StandardRegistry::mapping(ctx.standard),
        ctx.config.balance_tolerance,
    );
    if discrepancies.is_empty() {
        return CheckOutcome::passed("Balance continuity verified");
    }
    CheckOutcome::failed(format!(
        "{} balance discontinuities detected",
        discrepancies.len()
    ))
    .with_details(json!({ "discrepancies": discrepancies }))
    .with_recommendations([
        "Review the period closing entries",
        "Check the balances brought forward",
    ])
}

async fn double_entry_verification<S: IntegritySource>(
    ctx: &CheckContext<'_, S>,
) -> Result<CheckOutcome, IntegrityError> {
    let entries = ctx
        .source
        .entries(ctx.company_id, ctx.period, EntryStatus::Validated)
        .await?;
    let invalid = single_sided_references(&entries);

    if invalid.is_empty() {
        return Ok(CheckOutcome::passed(
            "Double entry respected on every entry",
        ));
    }
    Ok(CheckOutcome::failed(format!(
        "{} entries do not follow double entry",
        invalid.len()
    ))
    .with_details(json!({ "invalid_entries": invalid }))
    .with_recommendations([
        "Every entry needs at least one debit and one credit",
        "Review single-line entries",
    ]))
}

async fn period_closure_integrity<S: IntegritySource>(
    ctx: &CheckContext<'_, S>,
) -> Result<CheckOutcome, IntegrityError> {
    let periods = ctx
        .source
        .accounting_periods(ctx.company_id, ctx.period)
        .await?;
    let past_open = past_open_periods(&periods, ctx.period, ctx.today);

    if past_open.is_empty() {
        return Ok(CheckOutcome::passed("Period integrity verified"));
    }
    Ok(CheckOutcome::warning(format!(
        "{} past periods are still open",
        past_open.len()
    ))
    .with_details(json!({ "past_open_periods": past_open }))
    .with_recommendations([
        "Close past accounting periods",
        "Review entries still in progress on those periods",
    ]))
}

async fn audit_trail_completeness<S: IntegritySource>(ctx: &CheckContext<'_, S>) -> CheckOutcome {
    let Ok(audit_entries) = ctx
        .source
        .count_audit_entries(ctx.company_id, ctx.period)
        .await
    else {
        return CheckOutcome::warning("Audit log unavailable");
    };
    let Ok(modifications) = ctx
        .source
        .count_modified_entries(ctx.company_id, ctx.period)
        .await
    else {
        return CheckOutcome::warning("Cannot count entry modifications");
    };

    if audit_trail_is_complete(audit_entries, modifications, ctx.config.audit_trail_min_ratio) {
        return CheckOutcome::passed("Audit trail complete");
    }
    CheckOutcome::warning("Audit trail incomplete")
        .with_details(json!({
            "audit_entries": audit_entries,
            "modifications": modifications,
        }))
        .with_recommendations([
            "Review the audit log configuration",
            "Make sure every modification is recorded",
        ])
}

async fn vat_balance_verification<S: IntegritySource>(ctx: &CheckContext<'_, S>) -> CheckOutcome {
    let Ok(vat) = ctx.source.vat_position(ctx.company_id, ctx.period).await else {
        return CheckOutcome::warning("Cannot verify VAT accounts");
    };

    let difference = vat.difference();
    if !ctx.config.vat_tolerance.exceeded_by(difference) {
        return CheckOutcome::passed("VAT balance verified");
    }
    CheckOutcome::failed(format!(
        "VAT imbalance detected: {}",
        format_amount(difference)
    ))
    .with_details(json!({
        "collected": vat.collected,
        "deductible": vat.deductible,
        "due": vat.due,
        "difference": difference,
    }))
    .with_recommendations([
        "Check the VAT rates applied",
        "Review the VAT entries",
        "Check the VAT returns",
    ])
}

async fn depreciation_consistency<S: IntegritySource>(ctx: &CheckContext<'_, S>) -> CheckOutcome {
    let Ok(items) = ctx
        .source
        .depreciation_controls(ctx.company_id, ctx.period)
        .await
    else {
        return CheckOutcome::warning("Depreciation verification unavailable");
    };

    let flagged = flagged_items(items);
    if flagged.is_empty() {
        return CheckOutcome::passed("Depreciation consistency verified");
    }
    CheckOutcome::warning(format!(
        "{} depreciation inconsistencies detected",
        flagged.len()
    ))
    .with_details(json!({ "inconsistencies": flagged }))
    .with_recommendations([
        "Check the depreciation periods",
        "Check the depreciation methods used",
        "Review the depreciation calculations",
    ])
}

async fn provision_reasonableness<S: IntegritySource>(ctx: &CheckContext<'_, S>) -> CheckOutcome {
    let Ok(items) = ctx
        .source
        .provision_controls(ctx.company_id, ctx.period)
        .await
    else {
        return CheckOutcome::warning("Provision verification unavailable");
    };

    let flagged = flagged_items(items);
    if flagged.is_empty() {
        return CheckOutcome::passed("Provision reasonableness verified");
    }
    CheckOutcome::warning(format!(
        "{} provisions potentially excessive",
        flagged.len()
    ))
    .with_details(json!({ "unreasonable_provisions": flagged }))
    .with_recommendations([
        "Justify the provision amounts",
        "Review the criteria used to book provisions",
        "Consult a chartered accountant if needed",
    ])
}

/// References of entries whose debits and credits differ beyond the tolerance.
#[must_use]
pub fn unbalanced_references(entries: &[JournalEntryRecord], tolerance: Tolerance) -> Vec<String> {
    entries
        .iter()
        .filter(|e| !tolerance.accepts(e.total_debit(), e.total_credit()))
        .map(|e| e.reference.clone())
        .collect()
}

/// References of entries lacking a positive debit line or a positive credit line.
#[must_use]
pub fn single_sided_references(entries: &[JournalEntryRecord]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| {
            let has_debit = e.lines.iter().any(|l| l.debit > Decimal::ZERO);
            let has_credit = e.lines.iter().any(|l| l.credit > Decimal::ZERO);
            !has_debit || !has_credit
        })
        .map(|e| e.reference.clone())
        .collect()
}

/// A balance that did not carry over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    /// Account number.
    pub account_number: String,
    /// Closing balance of the previous period.
    pub closing: Decimal,
    /// Opening balance of the audited period.
    pub opening: Decimal,
    /// `opening - closing`.
    pub difference: Decimal,
}

/// Compares balance-sheet balances across a period boundary. Accounts missing
/// on one side count as zero.
#[must_use]
pub fn balance_discrepancies(
    closing: &[AccountBalance],
    opening: &[AccountBalance],
    mapping: &StandardMapping,
    tolerance: Tolerance,
) -> Vec<Discrepancy> {
    let mut pairs: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for balance in closing {
        pairs.entry(balance.account_number.as_str()).or_default().0 += balance.balance;
    }
    for balance in opening {
        pairs.entry(balance.account_number.as_str()).or_default().1 += balance.balance;
    }

    pairs
        .into_iter()
        .filter(|(number, _)| mapping.is_balance_sheet(number))
        .filter(|(_, (closing, opening))| !tolerance.accepts(*closing, *opening))
        .map(|(number, (closing, opening))| Discrepancy {
            account_number: number.to_string(),
            closing,
            opening,
            difference: opening - closing,
        })
        .collect()
}

/// Periods inside the window that ended before `today` and are still open,
/// formatted `start - end`.
#[must_use]
pub fn past_open_periods(
    periods: &[AccountingPeriod],
    window: ReportPeriod,
    today: NaiveDate,
) -> Vec<String> {
    periods
        .iter()
        .filter(|p| p.start_date >= window.start && p.end_date <= window.end)
        .filter(|p| p.is_open && p.end_date < today)
        .map(|p| format!("{} - {}", p.start_date, p.end_date))
        .collect()
}

/// True when `audit_entries >= modifications * min_ratio`.
#[must_use]
pub fn audit_trail_is_complete(audit_entries: u64, modifications: u64, min_ratio: Decimal) -> bool {
    Decimal::from(audit_entries) >= Decimal::from(modifications) * min_ratio
}

fn flagged_items(items: Vec<ControlItem>) -> Vec<ControlItem> {
    items.into_iter().filter(|i| i.flagged).collect()
}
