//! Journal entry domain types.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerguard_shared::types::{AccountId, CompanyId, JournalEntryId, JournalId};

use crate::mapping::UniversalAccountType;

/// How a journal line designates its account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRef {
    /// By account number.
    Number(String),
    /// By chart-of-accounts id, resolved before validation.
    Id(AccountId),
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => f.write_str(number),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// One line of a candidate journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Account of the line.
    pub account: AccountRef,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
}

impl JournalLineInput {
    /// A debit line on an account number.
    #[must_use]
    pub fn debit(account_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account: AccountRef::Number(account_number.into()),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    /// A credit line on an account number.
    #[must_use]
    pub fn credit(account_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account: AccountRef::Number(account_number.into()),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

/// A journal entry submitted for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryCandidate {
    /// Owning company.
    pub company_id: CompanyId,
    /// Target journal.
    pub journal_id: JournalId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Lines.
    pub lines: Vec<JournalLineInput>,
}

impl JournalEntryCandidate {
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

/// Result of validating a candidate entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryValidation {
    /// True when no blocking error was found.
    pub valid: bool,
    /// Blocking errors.
    pub errors: Vec<String>,
    /// Non-blocking warnings.
    pub warnings: Vec<String>,
}

impl EntryValidation {
    pub(crate) fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Result of posting an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedEntry {
    /// Id assigned by the store.
    pub id: JournalEntryId,
    /// Allocated entry number.
    pub entry_number: String,
    /// Warnings raised during validation.
    pub warnings: Vec<String>,
}

/// Side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit.
    Debit,
    /// Credit.
    Credit,
}

/// One line of a journal template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateLine {
    /// Role of the account on this line.
    pub role: UniversalAccountType,
    /// Side of the line.
    pub side: EntrySide,
}

const fn line(role: UniversalAccountType, side: EntrySide) -> TemplateLine {
    TemplateLine { role, side }
}

const SALE_TEMPLATE: &[TemplateLine] = &[
    line(UniversalAccountType::Customers, EntrySide::Debit),
    line(UniversalAccountType::Sales, EntrySide::Credit),
    line(UniversalAccountType::VatCollected, EntrySide::Credit),
];

const PURCHASE_TEMPLATE: &[TemplateLine] = &[
    line(UniversalAccountType::Purchases, EntrySide::Debit),
    line(UniversalAccountType::VatDeductible, EntrySide::Debit),
    line(UniversalAccountType::Suppliers, EntrySide::Credit),
];

const BANK_TEMPLATE: &[TemplateLine] = &[
    line(UniversalAccountType::Bank, EntrySide::Debit),
    line(UniversalAccountType::Customers, EntrySide::Credit),
];

const CASH_TEMPLATE: &[TemplateLine] = &[
    line(UniversalAccountType::Cash, EntrySide::Debit),
    line(UniversalAccountType::Sales, EntrySide::Credit),
];

/// Kind of journal an entry belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalType {
    /// Sales journal.
    Sale,
    /// Purchases journal.
    Purchase,
    /// Bank journal.
    Bank,
    /// Cash journal.
    Cash,
    /// Miscellaneous operations.
    Miscellaneous,
}

impl JournalType {
    /// Conventional journal code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Sale => "VE",
            Self::Purchase => "AC",
            Self::Bank => "BQ",
            Self::Cash => "CA",
            Self::Miscellaneous => "OD",
        }
    }

    /// Canonical line layout, in roles.
    #[must_use]
    pub const fn template(self) -> &'static [TemplateLine] {
        match self {
            Self::Sale => SALE_TEMPLATE,
            Self::Purchase => PURCHASE_TEMPLATE,
            Self::Bank => BANK_TEMPLATE,
            Self::Cash => CASH_TEMPLATE,
            Self::Miscellaneous => &[],
        }
    }
}
