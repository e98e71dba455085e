//! Integrity check definitions, results and reports.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ledgerguard_shared::types::CompanyId;

use super::error::IntegrityError;
use crate::repository::ReportPeriod;

/// Identifier of an integrity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    /// Validated entries balance.
    BalanceVerification,
    /// Closing balances carry over to the next period.
    AccountBalanceContinuity,
    /// Every entry has a debit and a credit.
    DoubleEntryVerification,
    /// Past periods are closed.
    PeriodClosureIntegrity,
    /// Modifications are traced in the audit log.
    AuditTrailCompleteness,
    /// VAT accounts balance.
    VatBalanceVerification,
    /// Depreciation plans are consistent.
    DepreciationConsistency,
    /// Provisions are justified.
    ProvisionReasonableness,
}

impl CheckId {
    /// All checks in execution order.
    pub const ALL: [Self; 8] = [
        Self::BalanceVerification,
        Self::AccountBalanceContinuity,
        Self::DoubleEntryVerification,
        Self::PeriodClosureIntegrity,
        Self::AuditTrailCompleteness,
        Self::VatBalanceVerification,
        Self::DepreciationConsistency,
        Self::ProvisionReasonableness,
    ];

    /// Stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BalanceVerification => "balance_verification",
            Self::AccountBalanceContinuity => "account_balance_continuity",
            Self::DoubleEntryVerification => "double_entry_verification",
            Self::PeriodClosureIntegrity => "period_closure_integrity",
            Self::AuditTrailCompleteness => "audit_trail_completeness",
            Self::VatBalanceVerification => "vat_balance_verification",
            Self::DepreciationConsistency => "depreciation_consistency",
            Self::ProvisionReasonableness => "provision_reasonableness",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckId {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| IntegrityError::UnknownCheck(s.to_string()))
    }
}

/// Area a check covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    /// Debit/credit equilibrium.
    Balance,
    /// Internal consistency.
    Consistency,
    /// Traceability.
    Audit,
    /// Regulatory compliance.
    Compliance,
}

/// How serious a failure of a check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Books cannot be trusted.
    Critical,
    /// Needs attention before closing.
    Major,
    /// Worth reviewing.
    Minor,
    /// Informational.
    Info,
}

/// Outcome status of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// No finding.
    Passed,
    /// Blocking finding, or the check could not run.
    Failed,
    /// Non-blocking finding, or the data was unavailable.
    Warning,
}

/// Definition of an integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityCheck {
    /// Identifier.
    pub id: CheckId,
    /// Display name.
    pub name: String,
    /// What the check verifies.
    pub description: String,
    /// Area covered.
    pub category: CheckCategory,
    /// Severity of a failure.
    pub severity: Severity,
    /// Whether full runs execute it.
    pub enabled: bool,
}

impl IntegrityCheck {
    /// Returns the definition of a check, enabled.
    #[must_use]
    pub fn definition(id: CheckId) -> Self {
        let (name, description, category, severity) = match id {
            CheckId::BalanceVerification => (
                "Balance verification",
                "Checks that every validated entry is balanced",
                CheckCategory::Balance,
                Severity::Critical,
            ),
            CheckId::AccountBalanceContinuity => (
                "Balance continuity",
                "Checks that closing balances carry over to the next period",
                CheckCategory::Consistency,
                Severity::Major,
            ),
            CheckId::DoubleEntryVerification => (
                "Double-entry verification",
                "Checks that every entry has at least one debit and one credit",
                CheckCategory::Balance,
                Severity::Critical,
            ),
            CheckId::PeriodClosureIntegrity => (
                "Period closure integrity",
                "Checks that past accounting periods are closed",
                CheckCategory::Consistency,
                Severity::Major,
            ),
            CheckId::AuditTrailCompleteness => (
                "Audit trail completeness",
                "Checks that modifications are recorded in the audit log",
                CheckCategory::Audit,
                Severity::Major,
            ),
            CheckId::VatBalanceVerification => (
                "VAT balance",
                "Checks that collected VAT equals deductible plus due VAT",
                CheckCategory::Compliance,
                Severity::Major,
            ),
            CheckId::DepreciationConsistency => (
                "Depreciation consistency",
                "Checks the consistency of depreciation plans",
                CheckCategory::Consistency,
                Severity::Minor,
            ),
            CheckId::ProvisionReasonableness => (
                "Provision reasonableness",
                "Checks that provisions are justified",
                CheckCategory::Consistency,
                Severity::Minor,
            ),
        };
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            category,
            severity,
            enabled: true,
        }
    }

    /// Returns every check definition, all enabled.
    #[must_use]
    pub fn catalog() -> Vec<Self> {
        CheckId::ALL.into_iter().map(Self::definition).collect()
    }
}

/// Finding of a check before it is stamped into a result.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// Status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Structured evidence.
    pub details: Option<Value>,
    /// Suggested actions.
    pub recommendations: Vec<String>,
}

impl CheckOutcome {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            recommendations: Vec::new(),
        }
    }

    /// A passed outcome.
    #[must_use]
    pub fn passed(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Passed, message)
    }

    /// A failed outcome.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Failed, message)
    }

    /// A warning outcome.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Warning, message)
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attaches recommendations.
    #[must_use]
    pub fn with_recommendations<I, R>(mut self, recommendations: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.recommendations = recommendations.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of one check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityResult {
    /// Check identifier.
    pub check_id: CheckId,
    /// Check display name.
    pub check_name: String,
    /// Status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Structured evidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Suggested actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    /// When the check finished.
    pub timestamp: DateTime<Utc>,
}

impl IntegrityResult {
    /// Stamps an outcome with its check and the current time.
    #[must_use]
    pub fn from_outcome(check: &IntegrityCheck, outcome: CheckOutcome) -> Self {
        Self {
            check_id: check.id,
            check_name: check.name.clone(),
            status: outcome.status,
            message: outcome.message,
            details: outcome.details,
            recommendations: outcome.recommendations,
            timestamp: Utc::now(),
        }
    }
}

/// Counts over the results of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Checks run.
    pub total_checks: usize,
    /// Passed checks.
    pub passed: usize,
    /// Failed checks.
    pub failed: usize,
    /// Checks with warnings.
    pub warnings: usize,
    /// Failed checks whose severity is critical.
    pub critical_issues: usize,
}

/// Report of an integrity run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Audited company.
    pub company_id: CompanyId,
    /// Audited period.
    pub period: ReportPeriod,
    /// Results, in execution order.
    pub checks: Vec<IntegrityResult>,
    /// Counts.
    pub summary: ReportSummary,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}

impl IntegrityReport {
    /// Returns the result of a check, if it ran.
    #[must_use]
    pub fn result(&self, id: CheckId) -> Option<&IntegrityResult> {
        self.checks.iter().find(|r| r.check_id == id)
    }

    /// Returns true if any critical check failed.
    #[must_use]
    pub fn has_critical_issues(&self) -> bool {
        self.summary.critical_issues > 0
    }
}
