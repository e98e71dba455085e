//! Integrity audit of a company's books.
//!
//! - `types` - Check catalog, results and reports
//! - `checks` - The individual checks and their pure helpers
//! - `service` - Engine running checks behind isolated error boundaries

pub mod checks;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use checks::{
    CheckContext, Discrepancy, IntegrityConfig, audit_trail_is_complete, balance_discrepancies,
    past_open_periods, run_check, single_sided_references, unbalanced_references,
};
pub use error::IntegrityError;
pub use service::IntegrityAuditEngine;
pub use types::{
    CheckCategory, CheckId, CheckOutcome, CheckStatus, IntegrityCheck, IntegrityReport,
    IntegrityResult, ReportSummary, Severity,
};
