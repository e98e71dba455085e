//! Entry number allocation.
//!
//! Numbers follow `<JournalCode>-<Year>-<5-digit sequence>`, e.g. `VE-2025-00001`.
//! Allocation is best effort: two writers can compute the same number, and the
//! store's unique constraint settles the race.

use chrono::{Datelike, NaiveDate, Utc};
use tracing::warn;

use ledgerguard_shared::types::{CompanyId, JournalId};

use crate::repository::{JournalRepository, RepositoryError};

/// Journal code used when the journal cannot be found.
pub const FALLBACK_JOURNAL_CODE: &str = "OD";

/// Allocates the next entry number of a journal for the year of `entry_date`.
///
/// A missing journal or any read failure yields `OD-<year>-<6 timestamp digits>`.
pub async fn generate_entry_number<R>(
    repo: &R,
    company_id: CompanyId,
    journal_id: JournalId,
    entry_date: NaiveDate,
) -> String
where
    R: JournalRepository + ?Sized,
{
    let year = entry_date.year();
    match next_entry_number(repo, company_id, journal_id, year).await {
        Ok(Some(number)) => number,
        Ok(None) => {
            warn!(
                company_id = %company_id,
                journal_id = %journal_id,
                "Journal not found, using fallback entry number"
            );
            fallback_entry_number(year, Utc::now().timestamp_millis())
        }
        Err(err) => {
            warn!(
                company_id = %company_id,
                journal_id = %journal_id,
                error = %err,
                "Entry number lookup failed, using fallback entry number"
            );
            fallback_entry_number(year, Utc::now().timestamp_millis())
        }
    }
}

async fn next_entry_number<R>(
    repo: &R,
    company_id: CompanyId,
    journal_id: JournalId,
    year: i32,
) -> Result<Option<String>, RepositoryError>
where
    R: JournalRepository + ?Sized,
{
    let Some(code) = repo.journal_code(company_id, journal_id).await? else {
        return Ok(None);
    };
    let last = repo.last_entry_number(company_id, journal_id, year).await?;
    let sequence = next_sequence(last.as_deref());
    Ok(Some(format_entry_number(&code, year, sequence)))
}

/// Returns the sequence following `last`, or 1 when it has no numeric suffix.
#[must_use]
pub fn next_sequence(last: Option<&str>) -> u64 {
    last.and_then(trailing_sequence)
        .and_then(|n| n.checked_add(1))
        .unwrap_or(1)
}

/// Returns the sequence of `number` if it was allocated for `code` and `year`.
///
/// `entry_sequence("VE-2025-00042", "VE", 2025) == Some(42)`; numbers of other
/// journals or years, fallback numbers included, yield `None`.
#[must_use]
pub fn entry_sequence(number: &str, code: &str, year: i32) -> Option<u64> {
    let digits = number.trim().strip_prefix(code)?.strip_prefix('-')?;
    let digits = digits.strip_prefix(year.to_string().as_str())?.strip_prefix('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parses the digits after the last `-`.
fn trailing_sequence(number: &str) -> Option<u64> {
    let (_, digits) = number.trim().rsplit_once('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Formats `CODE-YEAR-00042`.
#[must_use]
pub fn format_entry_number(code: &str, year: i32, sequence: u64) -> String {
    format!("{code}-{year}-{sequence:05}")
}

/// Formats `OD-YEAR-XXXXXX` from the last six digits of a millisecond timestamp.
#[must_use]
pub fn fallback_entry_number(year: i32, timestamp_millis: i64) -> String {
    let suffix = timestamp_millis.rem_euclid(1_000_000);
    format!("{FALLBACK_JOURNAL_CODE}-{year}-{suffix:06}")
}
