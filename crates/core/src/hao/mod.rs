//! Extraordinary operations (HAO, "hors activités ordinaires").
//!
//! SYSCOHADA reports operations outside the ordinary course of business in
//! class 8, separately from operating revenue and expenses. Other standards
//! have no such class and everything stays in operations.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::repository::{AccountBalance, ChartAccount, PostedLine};
use crate::standard::{
    AccountingStandard, HAO_EXPENSE_PREFIXES, HAO_REVENUE_PREFIXES, StandardRegistry,
};

#[cfg(test)]
mod split_props;

/// Anything carrying an account number.
pub trait AccountNumbered {
    /// The account number.
    fn account_number(&self) -> &str;
}

impl AccountNumbered for PostedLine {
    fn account_number(&self) -> &str {
        &self.account_number
    }
}

impl AccountNumbered for ChartAccount {
    fn account_number(&self) -> &str {
        &self.account_number
    }
}

impl AccountNumbered for AccountBalance {
    fn account_number(&self) -> &str {
        &self.account_number
    }
}

impl AccountNumbered for String {
    fn account_number(&self) -> &str {
        self
    }
}

impl AccountNumbered for str {
    fn account_number(&self) -> &str {
        self
    }
}

impl<T: AccountNumbered + ?Sized> AccountNumbered for &T {
    fn account_number(&self) -> &str {
        (**self).account_number()
    }
}

/// Items split between ordinary operations and HAO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split<T> {
    /// Ordinary operations.
    pub exploitation: Vec<T>,
    /// Extraordinary operations.
    pub hao: Vec<T>,
}

impl<T> Default for Split<T> {
    fn default() -> Self {
        Self {
            exploitation: Vec::new(),
            hao: Vec::new(),
        }
    }
}

/// Returns true if the account belongs to the standard's HAO class.
#[must_use]
pub fn is_hao(account_number: &str, standard: AccountingStandard) -> bool {
    StandardRegistry::mapping(standard).is_extraordinary(account_number.trim())
}

/// Splits revenue items. Items that are neither operating nor HAO revenue are dropped.
pub fn split_revenues<T, I>(items: I, standard: AccountingStandard) -> Split<T>
where
    T: AccountNumbered,
    I: IntoIterator<Item = T>,
{
    let mapping = StandardRegistry::mapping(standard);
    split(items, standard, |n| mapping.is_revenue(n), HAO_REVENUE_PREFIXES)
}

/// Splits expense items. Items that are neither operating nor HAO expenses are dropped.
pub fn split_expenses<T, I>(items: I, standard: AccountingStandard) -> Split<T>
where
    T: AccountNumbered,
    I: IntoIterator<Item = T>,
{
    let mapping = StandardRegistry::mapping(standard);
    split(items, standard, |n| mapping.is_expense(n), HAO_EXPENSE_PREFIXES)
}

fn split<T, I, F>(
    items: I,
    standard: AccountingStandard,
    in_class: F,
    hao_prefixes: &[&str],
) -> Split<T>
where
    T: AccountNumbered,
    I: IntoIterator<Item = T>,
    F: Fn(&str) -> bool,
{
    let mut result = Split::default();
    for item in items {
        let number = item.account_number().trim();
        if is_hao(number, standard) {
            if hao_prefixes.iter().any(|p| number.starts_with(p)) {
                result.hao.push(item);
            }
        } else if in_class(number) {
            result.exploitation.push(item);
        }
    }
    result
}

/// Net HAO result over a set of posted lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HaoResult {
    /// HAO revenue (credit minus debit).
    pub revenue: Decimal,
    /// HAO expenses (debit minus credit).
    pub expenses: Decimal,
}

impl HaoResult {
    /// Revenue minus expenses.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.revenue - self.expenses
    }
}

/// Computes the HAO result of posted lines. Zero for standards without HAO.
#[must_use]
pub fn hao_result(lines: &[PostedLine], standard: AccountingStandard) -> HaoResult {
    let revenue: Decimal = split_revenues(lines, standard)
        .hao
        .iter()
        .map(|l| l.credit - l.debit)
        .sum();
    let expenses: Decimal = split_expenses(lines, standard)
        .hao
        .iter()
        .map(|l| l.debit - l.credit)
        .sum();
    HaoResult { revenue, expenses }
}
