//! Universal account roles and the patterns that locate them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::repository::ChartAccount;

/// Standard-independent role of an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UniversalAccountType {
    /// Trade receivables.
    Customers,
    /// Trade payables.
    Suppliers,
    /// Bank accounts.
    Bank,
    /// Cash on hand.
    Cash,
    /// Property, plant and equipment.
    FixedAssets,
    /// Stocks.
    Inventory,
    /// Share capital.
    Capital,
    /// Borrowings.
    Loans,
    /// Purchases of goods.
    Purchases,
    /// Staff costs.
    Salaries,
    /// Rent and leases.
    Rent,
    /// Water, energy and similar supplies.
    Utilities,
    /// Sales of goods.
    Sales,
    /// Sales of services.
    Services,
    /// Interest and other financial income.
    FinancialIncome,
    /// Input VAT.
    VatDeductible,
    /// Output VAT.
    VatCollected,
}

impl UniversalAccountType {
    /// All roles in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Customers,
        Self::Suppliers,
        Self::Bank,
        Self::Cash,
        Self::FixedAssets,
        Self::Inventory,
        Self::Capital,
        Self::Loans,
        Self::Purchases,
        Self::Salaries,
        Self::Rent,
        Self::Utilities,
        Self::Sales,
        Self::Services,
        Self::FinancialIncome,
        Self::VatDeductible,
        Self::VatCollected,
    ];

    /// Roles resolved by `get_main_accounts`.
    pub const MAIN: [Self; 7] = [
        Self::Customers,
        Self::Suppliers,
        Self::Bank,
        Self::Sales,
        Self::Purchases,
        Self::VatDeductible,
        Self::VatCollected,
    ];

    /// Stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Suppliers => "suppliers",
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::FixedAssets => "fixed_assets",
            Self::Inventory => "inventory",
            Self::Capital => "capital",
            Self::Loans => "loans",
            Self::Purchases => "purchases",
            Self::Salaries => "salaries",
            Self::Rent => "rent",
            Self::Utilities => "utilities",
            Self::Sales => "sales",
            Self::Services => "services",
            Self::FinancialIncome => "financial_income",
            Self::VatDeductible => "vat_deductible",
            Self::VatCollected => "vat_collected",
        }
    }

    /// Statement section an account playing this role belongs to.
    #[must_use]
    pub const fn section(self) -> RoleSection {
        match self {
            Self::Customers
            | Self::Bank
            | Self::Cash
            | Self::FixedAssets
            | Self::Inventory
            | Self::VatDeductible => RoleSection::Asset,
            Self::Suppliers | Self::Loans | Self::VatCollected => RoleSection::Liability,
            Self::Capital => RoleSection::Equity,
            Self::Purchases | Self::Salaries | Self::Rent | Self::Utilities => {
                RoleSection::Expense
            }
            Self::Sales | Self::Services | Self::FinancialIncome => RoleSection::Revenue,
        }
    }
}

/// Statement section of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSection {
    /// Balance-sheet assets.
    Asset,
    /// Balance-sheet liabilities.
    Liability,
    /// Equity.
    Equity,
    /// Income statement revenue.
    Revenue,
    /// Income statement expenses.
    Expense,
}

impl fmt::Display for UniversalAccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an account playing a role is recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountPattern {
    /// The account number starts with this prefix (`"411*"`).
    Prefix(String),
    /// The account name contains any of `terms` and none of `excluded`
    /// (`"receivable|customer|!tax"`).
    Labels {
        /// Lowercase terms, any of which must appear.
        terms: Vec<String>,
        /// Lowercase terms, none of which may appear.
        excluded: Vec<String>,
    },
}

impl AccountPattern {
    /// Parses a raw table pattern.
    ///
    /// A trailing `*` or an all-digit pattern is a number prefix; anything else is a
    /// `|`-separated list of label terms, where `!term` excludes names containing it.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let stem = trimmed.strip_suffix('*').unwrap_or(trimmed);
        if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()) {
            return Self::Prefix(stem.to_string());
        }
        let mut terms = Vec::new();
        let mut excluded = Vec::new();
        for raw_term in trimmed.split('|') {
            let term = raw_term.trim().to_lowercase();
            match term.strip_prefix('!') {
                Some(negated) if !negated.trim().is_empty() => {
                    excluded.push(negated.trim().to_string());
                }
                Some(_) => {}
                None if !term.is_empty() => terms.push(term),
                None => {}
            }
        }
        Self::Labels { terms, excluded }
    }

    /// Returns true if the account matches.
    #[must_use]
    pub fn matches(&self, account: &ChartAccount) -> bool {
        match self {
            Self::Prefix(prefix) => account.account_number.trim().starts_with(prefix.as_str()),
            Self::Labels { terms, excluded } => {
                let name = account.account_name.to_lowercase();
                terms.iter().any(|term| name.contains(term.as_str()))
                    && !excluded.iter().any(|term| name.contains(term.as_str()))
            }
        }
    }

    /// Returns the number prefix, if this is a numeric pattern.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        match self {
            Self::Prefix(prefix) => Some(prefix),
            Self::Labels { .. } => None,
        }
    }
}

impl fmt::Display for AccountPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => write!(f, "{prefix}*"),
            Self::Labels { terms, excluded } => {
                let negated = excluded.iter().map(|term| format!("!{term}"));
                let all: Vec<String> = terms.iter().cloned().chain(negated).collect();
                f.write_str(&all.join("|"))
            }
        }
    }
}
