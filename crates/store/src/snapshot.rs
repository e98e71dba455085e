//! JSON ledger snapshot format.
//!
//! A snapshot holds the books of one or more companies: chart of accounts,
//! journals, entries, audit log, periods and the inputs of host-side controls.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerguard_core::repository::{
    AccountBalance, AccountingPeriod, ChartAccount, CompanyProfile, ControlItem, EntryStatus,
    JournalEntryRecord, account_class,
};
use ledgerguard_shared::types::{AccountId, CompanyId, JournalId};

/// Books of every company in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Companies.
    #[serde(default)]
    pub companies: Vec<CompanyBooks>,
}

/// Books of one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyBooks {
    /// Company metadata.
    #[serde(flatten)]
    pub profile: CompanyProfile,
    /// Chart of accounts.
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
    /// Journals.
    #[serde(default)]
    pub journals: Vec<JournalRecord>,
    /// Journal entries.
    #[serde(default)]
    pub entries: Vec<StoredEntry>,
    /// Audit log.
    #[serde(default)]
    pub audit_log: Vec<AuditEvent>,
    /// Accounting periods.
    #[serde(default)]
    pub periods: Vec<AccountingPeriod>,
    /// Recorded balances that take precedence over computed ones.
    #[serde(default)]
    pub balance_snapshots: Vec<BalanceSnapshot>,
    /// VAT account prefixes.
    #[serde(default)]
    pub vat_accounts: VatAccounts,
    /// Depreciation plans evaluated by the host.
    #[serde(default)]
    pub depreciation_controls: Vec<ControlItem>,
    /// Provisions evaluated by the host.
    #[serde(default)]
    pub provision_controls: Vec<ControlItem>,
}

impl CompanyBooks {
    /// Creates empty books for a company.
    #[must_use]
    pub fn new(profile: CompanyProfile) -> Self {
        Self {
            profile,
            accounts: Vec::new(),
            journals: Vec::new(),
            entries: Vec::new(),
            audit_log: Vec::new(),
            periods: Vec::new(),
            balance_snapshots: Vec::new(),
            vat_accounts: VatAccounts::default(),
            depreciation_controls: Vec::new(),
            provision_controls: Vec::new(),
        }
    }

    /// The company id.
    #[must_use]
    pub fn company_id(&self) -> CompanyId {
        self.profile.id
    }

    /// Chart accounts in storage order.
    #[must_use]
    pub fn chart(&self) -> Vec<ChartAccount> {
        self.accounts
            .iter()
            .map(|a| a.to_chart_account(self.profile.id))
            .collect()
    }

    /// Entries that count towards balances and controls.
    pub fn booked_entries(&self) -> impl Iterator<Item = &JournalEntryRecord> {
        self.entries
            .iter()
            .map(|e| &e.record)
            .filter(|e| matches!(e.status, EntryStatus::Validated | EntryStatus::Posted))
    }
}

/// A chart-of-accounts row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account ID; generated when absent.
    #[serde(default)]
    pub id: AccountId,
    /// Account number or code.
    pub account_number: String,
    /// Account label.
    pub account_name: String,
    /// Whether the account can be used.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl AccountRecord {
    /// Creates an active account row.
    #[must_use]
    pub fn new(account_number: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            account_number: account_number.into(),
            account_name: account_name.into(),
            is_active: true,
        }
    }

    fn to_chart_account(&self, company_id: CompanyId) -> ChartAccount {
        ChartAccount {
            id: self.id,
            company_id,
            account_number: self.account_number.clone(),
            account_name: self.account_name.clone(),
            account_class: account_class(&self.account_number),
            is_active: self.is_active,
        }
    }
}

/// A journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Journal ID.
    pub id: JournalId,
    /// Short code used in entry numbers.
    pub code: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// A journal entry as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// The entry.
    #[serde(flatten)]
    pub record: JournalEntryRecord,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Last modification date; the entry date when absent.
    #[serde(default)]
    pub modified_on: Option<NaiveDate>,
}

impl StoredEntry {
    /// Date of the last creation or modification.
    #[must_use]
    pub fn last_modified(&self) -> NaiveDate {
        self.modified_on.unwrap_or(self.record.entry_date)
    }
}

/// An audit-log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the action happened.
    pub date: NaiveDate,
    /// What happened (`entry_created`, `entry_updated`, ...).
    pub action: String,
    /// Entry concerned, if any.
    #[serde(default)]
    pub entry_reference: Option<String>,
}

/// Which side of a period boundary a recorded balance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    /// Brought forward at the start of the date.
    Opening,
    /// At the end of the date.
    Closing,
}

/// Balances recorded by the host for a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Date.
    pub date: NaiveDate,
    /// Opening or closing.
    pub kind: SnapshotKind,
    /// Balances.
    pub balances: Vec<AccountBalance>,
}

/// Account prefixes used to compute the VAT position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatAccounts {
    /// VAT collected on sales (credited).
    pub collected: String,
    /// VAT deductible on purchases (debited).
    pub deductible: String,
    /// VAT due to the tax authority (credited on declaration).
    pub due: String,
}

impl VatAccounts {
    /// SYSCOHADA prefixes.
    #[must_use]
    pub fn syscohada() -> Self {
        Self {
            collected: "443".to_string(),
            deductible: "445".to_string(),
            due: "444".to_string(),
        }
    }
}

impl Default for VatAccounts {
    /// PCG prefixes.
    fn default() -> Self {
        Self {
            collected: "4457".to_string(),
            deductible: "4456".to_string(),
            due: "4455".to_string(),
        }
    }
}

/// Sums `debit - credit` per account, sorted by account number.
pub(crate) fn net_balances<'a, I>(entries: I) -> Vec<AccountBalance>
where
    I: IntoIterator<Item = &'a JournalEntryRecord>,
{
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for entry in entries {
        for line in &entry.lines {
            *totals.entry(line.account_number.as_str()).or_default() += line.debit - line.credit;
        }
    }
    totals
        .into_iter()
        .map(|(number, balance)| AccountBalance {
            account_number: number.to_string(),
            balance,
        })
        .collect()
}
