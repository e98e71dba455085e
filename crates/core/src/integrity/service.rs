//! Integrity audit engine.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{NaiveDate, Utc};
use futures::FutureExt;
use futures::future::join_all;
use tracing::{error, info, warn};

use ledgerguard_shared::types::CompanyId;

use super::checks::{CheckContext, IntegrityConfig, run_check};
use super::error::IntegrityError;
use super::types::{
    CheckId, CheckOutcome, CheckStatus, IntegrityCheck, IntegrityReport, IntegrityResult,
    ReportSummary, Severity,
};
use crate::repository::{IntegritySource, ReportPeriod};
use crate::standard::StandardDetector;

/// Runs integrity checks over a company's posted data.
///
/// Each check runs behind its own error boundary: an error or a panic inside
/// one check becomes a failed result and never aborts the run.
pub struct IntegrityAuditEngine<S> {
    source: Arc<S>,
    detector: Arc<StandardDetector<S>>,
    checks: RwLock<Vec<IntegrityCheck>>,
    config: IntegrityConfig,
    fixed_today: Option<NaiveDate>,
}

impl<S: IntegritySource> IntegrityAuditEngine<S> {
    /// Creates an engine with every check enabled.
    #[must_use]
    pub fn new(source: Arc<S>, detector: Arc<StandardDetector<S>>, config: IntegrityConfig) -> Self {
        Self {
            source,
            detector,
            checks: RwLock::new(IntegrityCheck::catalog()),
            config,
            fixed_today: None,
        }
    }

    /// Pins the date used for the default period and for "past" periods.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Returns the check definitions with their enabled flags.
    #[must_use]
    pub fn available_checks(&self) -> Vec<IntegrityCheck> {
        self.checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Enables or disables a check for full runs.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::UnknownCheck` if no check has this id.
    pub fn set_check_enabled(&self, check_id: &str, enabled: bool) -> Result<(), IntegrityError> {
        let id: CheckId = check_id.parse()?;
        let mut checks = self.checks.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(check) = checks.iter_mut().find(|c| c.id == id) {
            check.enabled = enabled;
        }
        Ok(())
    }

    /// Runs every enabled check. The period defaults to the current month.
    pub async fn run_integrity_checks(
        &self,
        company_id: CompanyId,
        period: Option<ReportPeriod>,
    ) -> IntegrityReport {
        let today = self.today();
        let period = period.unwrap_or_else(|| ReportPeriod::month_of(today));
        let enabled: Vec<IntegrityCheck> = self
            .available_checks()
            .into_iter()
            .filter(|c| c.enabled)
            .collect();

        let standard = self.detector.detect(company_id).await;
        let ctx = CheckContext {
            source: self.source.as_ref(),
            company_id,
            period,
            standard,
            today,
            config: &self.config,
        };

        let checks = if self.config.run_concurrently {
            join_all(enabled.iter().map(|check| Self::execute(check, &ctx))).await
        } else {
            let mut results = Vec::with_capacity(enabled.len());
            for check in &enabled {
                results.push(Self::execute(check, &ctx).await);
            }
            results
        };

        let summary = Self::calculate_summary(&checks);
        info!(
            company_id = %company_id,
            total = summary.total_checks,
            passed = summary.passed,
            failed = summary.failed,
            warnings = summary.warnings,
            critical = summary.critical_issues,
            "Integrity checks completed"
        );

        IntegrityReport {
            company_id,
            period,
            checks,
            summary,
            generated_at: Utc::now(),
        }
    }

    /// Runs one check, enabled or not.
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
        let id: CheckId = check_id.parse()?;
        let check = self
            .available_checks()
            .into_iter()
            .find(|c| c.id == id)
            .unwrap_or_else(|| IntegrityCheck::definition(id));

        let today = self.today();
        let ctx = CheckContext {
            source: self.source.as_ref(),
            company_id,
            period: period.unwrap_or_else(|| ReportPeriod::month_of(today)),
            standard: self.detector.detect(company_id).await,
            today,
            config: &self.config,
        };
        Ok(Self::execute(&check, &ctx).await)
    }

    /// Counts results by status. Critical issues are failed results of checks
    /// whose severity is critical.
    #[must_use]
    pub fn calculate_summary(results: &[IntegrityResult]) -> ReportSummary {
        let count = |status: CheckStatus| results.iter().filter(|r| r.status == status).count();
        ReportSummary {
            total_checks: results.len(),
            passed: count(CheckStatus::Passed),
            failed: count(CheckStatus::Failed),
            warnings: count(CheckStatus::Warning),
            critical_issues: results
                .iter()
                .filter(|r| {
                    r.status == CheckStatus::Failed
                        && IntegrityCheck::definition(r.check_id).severity == Severity::Critical
                })
                .count(),
        }
    }

    async fn execute(check: &IntegrityCheck, ctx: &CheckContext<'_, S>) -> IntegrityResult {
        let outcome = match AssertUnwindSafe(run_check(check.id, ctx)).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!(
                    company_id = %ctx.company_id,
                    check = %check.id,
                    error = %err,
                    "Integrity check failed to run"
                );
                CheckOutcome::failed(format!("Execution error: {err}"))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    company_id = %ctx.company_id,
                    check = %check.id,
                    panic = %message,
                    "Integrity check panicked"
                );
                CheckOutcome::failed(format!(
                    "Execution error: {}",
                    IntegrityError::Panicked(message)
                ))
            }
        };

        if outcome.status != CheckStatus::Passed {
            warn!(
                company_id = %ctx.company_id,
                check = %check.id,
                status = ?outcome.status,
                message = %outcome.message,
                "Integrity finding"
            );
        }
        IntegrityResult::from_outcome(check, outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
