//! Records exchanged with the host data layer.
//!
//! These are request-scoped values; the engine owns no storage for them.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerguard_shared::types::{AccountId, CompanyId, JournalId, JournalEntryId, PeriodId};

/// Company metadata used for standard detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// The company.
    pub id: CompanyId,
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Explicit accounting standard chosen for the company.
    #[serde(default)]
    pub accounting_standard: Option<String>,
}

/// A chart-of-accounts entry, read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartAccount {
    /// Account ID.
    pub id: AccountId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Account number (`"411000"`) or code used by label-based charts.
    pub account_number: String,
    /// Account label.
    pub account_name: String,
    /// First digit of a numeric account number.
    #[serde(default)]
    pub account_class: Option<u8>,
    /// Whether the account can be used.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ChartAccount {
    /// Creates an active account, deriving its class from the number.
    #[must_use]
    pub fn new(
        company_id: CompanyId,
        account_number: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        let account_number = account_number.into();
        Self {
            id: AccountId::new(),
            company_id,
            account_class: account_class(&account_number),
            account_number,
            account_name: account_name.into(),
            is_active: true,
        }
    }
}

/// Returns the class digit of a numeric account number (`1..=9`).
#[must_use]
pub fn account_class(account_number: &str) -> Option<u8> {
    account_number
        .trim()
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .and_then(|d| u8::try_from(d).ok())
        .filter(|d| *d > 0)
}

/// Inclusive date window for integrity checks and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl ReportPeriod {
    /// Creates a period.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The calendar month containing `today`.
    #[must_use]
    pub fn month_of(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next_month.map_or(today, |d| d - Duration::days(1));
        Self { start, end }
    }

    /// Returns true if the date falls within the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The day before the period starts, i.e. the previous period's closing date.
    #[must_use]
    pub fn previous_close(&self) -> NaiveDate {
        self.start - Duration::days(1)
    }
}

/// Lifecycle status of a persisted journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Being drafted.
    Draft,
    /// Validated by an accountant.
    Validated,
    /// Posted to the general ledger.
    Posted,
    /// Cancelled.
    Cancelled,
}

/// One posted line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedLine {
    /// Account number of the line.
    pub account_number: String,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
}

impl PostedLine {
    /// Creates a posted line.
    #[must_use]
    pub fn new(account_number: impl Into<String>, debit: Decimal, credit: Decimal) -> Self {
        Self {
            account_number: account_number.into(),
            debit,
            credit,
        }
    }
}

/// A persisted journal entry with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryRecord {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Journal the entry belongs to.
    #[serde(default)]
    pub journal_id: Option<JournalId>,
    /// Allocated entry number.
    #[serde(default)]
    pub entry_number: Option<String>,
    /// Human reference shown in findings.
    pub reference: String,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Status.
    pub status: EntryStatus,
    /// Lines.
    #[serde(default)]
    pub lines: Vec<PostedLine>,
}

impl JournalEntryRecord {
    /// Sum of debit amounts.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of credit amounts.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }
}

/// A journal entry ready to be written by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJournalEntry {
    /// Owning company.
    pub company_id: CompanyId,
    /// Journal.
    pub journal_id: JournalId,
    /// Allocated entry number; must be unique in the store.
    pub entry_number: String,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Lines with resolved account numbers.
    pub lines: Vec<PostedLine>,
}

/// An accounting period as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Period ID.
    pub id: PeriodId,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Open for posting.
    pub is_open: bool,
    /// Formally closed.
    #[serde(default)]
    pub is_closed: bool,
}

/// Balance of one account at a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account number.
    pub account_number: String,
    /// Signed balance (debit positive).
    pub balance: Decimal,
}

/// VAT totals computed by the host for a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatPosition {
    /// VAT collected on sales.
    pub collected: Decimal,
    /// VAT deductible on purchases.
    pub deductible: Decimal,
    /// VAT due to the tax authority.
    pub due: Decimal,
}

impl VatPosition {
    /// `collected - (deductible + due)`.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.collected - (self.deductible + self.due)
    }
}

/// An item evaluated by an external control (depreciation, provisions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlItem {
    /// Asset or provision reference.
    pub reference: String,
    /// Whether the control flagged the item.
    pub flagged: bool,
    /// Explanation supplied by the control.
    #[serde(default)]
    pub note: Option<String>,
}
