//! Accounting standard types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StandardError;

/// Bookkeeping standard followed by a company.
///
/// Declaration order matters: it breaks ties in chart-of-accounts scoring.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccountingStandard {
    /// Plan Comptable Général (France).
    #[default]
    Pcg,
    /// OHADA accounting system (West/Central Africa).
    Syscohada,
    /// IFRS for SMEs.
    Ifrs,
    /// US GAAP.
    UsGaap,
    /// Système Comptable Financier (Algeria, Maghreb).
    Scf,
    /// Company-specific chart, numbered like PCG.
    Custom,
}

impl AccountingStandard {
    /// All standards in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Pcg,
        Self::Syscohada,
        Self::Ifrs,
        Self::UsGaap,
        Self::Scf,
        Self::Custom,
    ];

    /// Stable identifier used in storage and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pcg => "pcg",
            Self::Syscohada => "syscohada",
            Self::Ifrs => "ifrs",
            Self::UsGaap => "us_gaap",
            Self::Scf => "scf",
            Self::Custom => "custom",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pcg => "Plan Comptable Général (France)",
            Self::Syscohada => "SYSCOHADA (OHADA)",
            Self::Ifrs => "IFRS for SMEs",
            Self::UsGaap => "US GAAP",
            Self::Scf => "Système Comptable Financier",
            Self::Custom => "Custom chart of accounts",
        }
    }

    /// Position in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AccountingStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountingStandard {
    type Err = StandardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pcg" => Ok(Self::Pcg),
            "syscohada" | "ohada" => Ok(Self::Syscohada),
            "ifrs" | "ifrs_sme" | "ifrs_for_smes" => Ok(Self::Ifrs),
            "us_gaap" | "usgaap" | "gaap" => Ok(Self::UsGaap),
            "scf" => Ok(Self::Scf),
            "custom" => Ok(Self::Custom),
            _ => Err(StandardError::UnknownStandard(s.to_string())),
        }
    }
}

/// How a standard identifies accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingScheme {
    /// Accounts are identified by numeric class prefixes.
    Numeric,
    /// Accounts are identified by their labels.
    Label,
}

/// Class-prefix mapping of one standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardMapping {
    /// The standard this mapping describes.
    pub standard: AccountingStandard,
    /// Numbering scheme.
    pub scheme: NumberingScheme,
    /// Revenue classes.
    pub revenue_classes: &'static [&'static str],
    /// Expense classes.
    pub expense_classes: &'static [&'static str],
    /// Asset classes.
    pub asset_classes: &'static [&'static str],
    /// Liability classes.
    pub liability_classes: &'static [&'static str],
    /// Equity classes.
    pub equity_classes: &'static [&'static str],
    /// Extraordinary-operations (HAO) class.
    pub extraordinary_class: Option<&'static str>,
    /// Third-party class whose sub-ranges carry their own nature.
    pub third_party_class: Option<&'static str>,
}

fn has_prefix(classes: &[&str], account_number: &str) -> bool {
    classes.iter().any(|c| account_number.starts_with(c))
}

impl StandardMapping {
    /// Returns true if the account belongs to a revenue class.
    #[must_use]
    pub fn is_revenue(&self, account_number: &str) -> bool {
        has_prefix(self.revenue_classes, account_number)
    }

    /// Returns true if the account belongs to an expense class.
    #[must_use]
    pub fn is_expense(&self, account_number: &str) -> bool {
        has_prefix(self.expense_classes, account_number)
    }

    /// Returns true if the account belongs to an asset class.
    #[must_use]
    pub fn is_asset(&self, account_number: &str) -> bool {
        has_prefix(self.asset_classes, account_number)
    }

    /// Returns true if the account belongs to a liability class.
    #[must_use]
    pub fn is_liability(&self, account_number: &str) -> bool {
        has_prefix(self.liability_classes, account_number)
    }

    /// Returns true if the account belongs to an equity class.
    #[must_use]
    pub fn is_equity(&self, account_number: &str) -> bool {
        has_prefix(self.equity_classes, account_number)
    }

    /// Returns true if the account is carried forward from one period to the next.
    #[must_use]
    pub fn is_balance_sheet(&self, account_number: &str) -> bool {
        self.is_asset(account_number)
            || self.is_liability(account_number)
            || self.is_equity(account_number)
    }

    /// Returns true if the account belongs to the extraordinary-operations class.
    #[must_use]
    pub fn is_extraordinary(&self, account_number: &str) -> bool {
        self.extraordinary_class
            .is_some_and(|c| account_number.starts_with(c))
    }

    /// Returns true if the account belongs to the third-party class.
    #[must_use]
    pub fn is_third_party(&self, account_number: &str) -> bool {
        self.third_party_class
            .is_some_and(|c| account_number.starts_with(c))
    }
}
