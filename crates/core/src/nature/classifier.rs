//! Normal balance side of accounts per standard, with the flexible-prefix list
//! of accounts that may carry either side.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::repository::account_class;
use crate::standard::{
    AccountingStandard, HAO_EXPENSE_PREFIXES, HAO_REVENUE_PREFIXES, StandardRegistry,
};

/// Prefixes of accounts that legitimately move on both sides.
pub const DEFAULT_FLEXIBLE_PREFIXES: [&str; 6] = ["512", "53", "411", "401", "467", "44"];

/// Normal balance side of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountNature {
    /// Balance normally on the debit side.
    Debit,
    /// Balance normally on the credit side.
    Credit,
    /// Either side.
    Mixed,
}

impl fmt::Display for AccountNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Mixed => "mixed",
        })
    }
}

/// Outcome of checking the side of one journal line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineSideCheck {
    /// False only when the line cannot be accepted.
    pub valid: bool,
    /// Problem with the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// How to fix or reconsider the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Advisory note that does not block the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl LineSideCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }
}

/// Derives account natures and checks journal line sides.
///
/// The flexible-prefix list belongs to the instance and can be replaced at runtime.
pub struct AccountNatureClassifier {
    flexible_prefixes: RwLock<Vec<String>>,
}

impl AccountNatureClassifier {
    /// Creates a classifier with the default flexible prefixes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_flexible_prefixes(DEFAULT_FLEXIBLE_PREFIXES.iter().map(|p| (*p).to_string()))
    }

    /// Creates a classifier with a custom flexible-prefix list.
    #[must_use]
    pub fn with_flexible_prefixes<I, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            flexible_prefixes: RwLock::new(prefixes.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns the nature of an account under a standard.
    #[must_use]
    pub fn classify(&self, account_number: &str, standard: AccountingStandard) -> AccountNature {
        let number = account_number.trim();
        if account_class(number).is_none() {
            return AccountNature::Mixed;
        }
        let mapping = StandardRegistry::mapping(standard);

        if mapping.is_third_party(number) {
            return third_party_nature(number);
        }
        if mapping.is_extraordinary(number) {
            return if starts_with_any(number, HAO_EXPENSE_PREFIXES) {
                AccountNature::Debit
            } else if starts_with_any(number, HAO_REVENUE_PREFIXES) {
                AccountNature::Credit
            } else {
                AccountNature::Mixed
            };
        }
        if mapping.is_asset(number) || mapping.is_expense(number) {
            AccountNature::Debit
        } else if mapping.is_liability(number)
            || mapping.is_equity(number)
            || mapping.is_revenue(number)
        {
            AccountNature::Credit
        } else {
            AccountNature::Mixed
        }
    }

    /// Returns true if the account may move on either side without comment.
    #[must_use]
    pub fn is_flexible(&self, account_number: &str) -> bool {
        let number = account_number.trim();
        self.flexible_prefixes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|p| number.starts_with(p.as_str()))
    }

    /// Replaces the flexible-prefix list.
    pub fn set_flexible_prefixes<I, P>(&self, prefixes: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let next: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        *self
            .flexible_prefixes
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Returns a copy of the flexible-prefix list.
    #[must_use]
    pub fn flexible_prefixes(&self) -> Vec<String> {
        self.flexible_prefixes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Checks that a journal line sits on a sensible side of its account.
    ///
    /// Only a line carrying both a debit and a credit is invalid. Other findings
    /// are advisory.
    #[must_use]
    pub fn validate_line_side(
        &self,
        account_number: &str,
        standard: AccountingStandard,
        debit: Decimal,
        credit: Decimal,
    ) -> LineSideCheck {
        let has_debit = debit > Decimal::ZERO;
        let has_credit = credit > Decimal::ZERO;

        if has_debit && has_credit {
            return LineSideCheck {
                valid: false,
                warning: Some("A line cannot carry both a debit and a credit".to_string()),
                suggestion: Some(
                    "Split the amounts into two separate lines".to_string(),
                ),
                info: None,
            };
        }
        if !has_debit && !has_credit {
            return LineSideCheck {
                warning: Some("No amount entered".to_string()),
                ..LineSideCheck::ok()
            };
        }
        if self.is_flexible(account_number) {
            return LineSideCheck::ok();
        }

        let class = account_class(account_number).unwrap_or_default();
        match (self.classify(account_number, standard), has_debit) {
            (AccountNature::Debit, false) => LineSideCheck {
                info: Some(format!(
                    "Account {account_number} normally carries a debit balance"
                )),
                suggestion: Some(format!(
                    "Class {class} accounts usually increase on the debit side; check that this credit is a reversal or a decrease"
                )),
                ..LineSideCheck::ok()
            },
            (AccountNature::Credit, true) => LineSideCheck {
                info: Some(format!(
                    "Account {account_number} normally carries a credit balance"
                )),
                suggestion: Some(format!(
                    "Class {class} accounts usually increase on the credit side; check that this debit is a reversal or a decrease"
                )),
                ..LineSideCheck::ok()
            },
            _ => LineSideCheck::ok(),
        }
    }
}

impl Default for AccountNatureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn third_party_nature(number: &str) -> AccountNature {
    if number.starts_with("411") {
        AccountNature::Debit
    } else if number.starts_with("401") || number.starts_with("43") {
        AccountNature::Credit
    } else {
        AccountNature::Mixed
    }
}

fn starts_with_any(number: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| number.starts_with(p))
}
