//! Ledgerguard auditor
//!
//! Loads a JSON ledger snapshot, runs the integrity checks for one or every
//! company and prints the reports as JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerguard_core::integrity::{
    CheckStatus, IntegrityCheck, IntegrityReport, IntegrityResult, Severity,
};
use ledgerguard_core::repository::ReportPeriod;
use ledgerguard_core::standard::AccountingStandard;
use ledgerguard_core::{AccountingEngine, EngineConfig};
use ledgerguard_shared::AppConfig;
use ledgerguard_shared::config::{LogFormat, LoggingSettings};
use ledgerguard_shared::types::CompanyId;
use ledgerguard_store::InMemoryStore;

/// Exit code when a critical check failed.
const CRITICAL_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "auditor")]
#[command(version, about = "Runs integrity checks over a ledger snapshot", long_about = None)]
struct Args {
    /// Ledger snapshot (JSON)
    #[arg(value_name = "FILE")]
    snapshot: PathBuf,

    /// Audit a single company
    #[arg(short, long)]
    company: Option<CompanyId>,

    /// First day of the audited period
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Last day of the audited period
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,

    /// Run only this check, even if disabled
    #[arg(long, conflicts_with = "skip")]
    check: Option<String>,

    /// Disable a check for this run (repeatable)
    #[arg(long, value_name = "CHECK")]
    skip: Vec<String>,

    /// Date used as today (defaults to the system date)
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Print the check catalogue and exit
    #[arg(long)]
    list_checks: bool,
}

#[derive(Serialize)]
struct CheckRun {
    company_id: CompanyId,
    standard: AccountingStandard,
    result: IntegrityResult,
}

#[derive(Serialize)]
struct CompanyAudit {
    standard: AccountingStandard,
    #[serde(flatten)]
    report: IntegrityReport,
}

fn init_tracing(settings: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter));
    let registry = tracing_subscriber::registry().with(filter);

    // Reports go to stdout, logs to stderr.
    match settings.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn period_from(args: &Args) -> anyhow::Result<Option<ReportPeriod>> {
    match (args.from, args.to) {
        (Some(start), Some(end)) if start > end => {
            bail!("--from {start} is after --to {end}")
        }
        (Some(start), Some(end)) => Ok(Some(ReportPeriod::new(start, end))),
        _ => Ok(None),
    }
}

fn is_critical_failure(result: &IntegrityResult) -> bool {
    result.status == CheckStatus::Failed
        && IntegrityCheck::definition(result.check_id).severity == Severity::Critical
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let period = period_from(&args)?;
    let store = InMemoryStore::from_path(&args.snapshot)?;
    let companies = match args.company {
        Some(id) => vec![id],
        None => store.company_ids().await,
    };
    info!(
        snapshot = %args.snapshot.display(),
        companies = companies.len(),
        "Snapshot loaded"
    );

    let mut engine = AccountingEngine::new(Arc::new(store), EngineConfig::from(&config));
    if let Some(today) = args.as_of {
        engine = engine.with_today(today);
    }

    if args.list_checks {
        println!(
            "{}",
            serde_json::to_string_pretty(&engine.available_checks())?
        );
        return Ok(ExitCode::SUCCESS);
    }

    for check_id in &args.skip {
        engine.set_check_enabled(check_id, false)?;
    }

    let mut critical = false;
    if let Some(check_id) = &args.check {
        let mut runs = Vec::with_capacity(companies.len());
        for company_id in companies {
            let result = engine
                .run_specific_check(check_id, company_id, period)
                .await?;
            critical |= is_critical_failure(&result);
            runs.push(CheckRun {
                company_id,
                standard: engine.detect_standard(company_id).await,
                result,
            });
        }
        println!("{}", serde_json::to_string_pretty(&runs)?);
    } else {
        let mut audits = Vec::with_capacity(companies.len());
        for company_id in companies {
            let report = engine.run_integrity_checks(company_id, period).await;
            critical |= report.has_critical_issues();
            audits.push(CompanyAudit {
                standard: engine.detect_standard(company_id).await,
                report,
            });
        }
        println!("{}", serde_json::to_string_pretty(&audits)?);
    }

    if critical {
        info!("Critical integrity issues found");
        return Ok(ExitCode::from(CRITICAL_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}
