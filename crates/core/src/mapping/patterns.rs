//! Role pattern tables, one per standard.
//!
//! Numeric charts use `prefix*`, label charts use `term|term|!excluded`. CUSTOM
//! charts are numbered like PCG and share its table.

use super::types::{AccountPattern, UniversalAccountType};
use crate::standard::AccountingStandard;

use UniversalAccountType::{
    Bank, Capital, Cash, Customers, FinancialIncome, FixedAssets, Inventory, Loans, Purchases,
    Rent, Salaries, Sales, Services, Suppliers, Utilities, VatCollected, VatDeductible,
};

type PatternTable = [(UniversalAccountType, &'static str); 17];

const PCG: PatternTable = [
    (Customers, "411*"),
    (Suppliers, "401*"),
    (Bank, "512*"),
    (Cash, "53*"),
    (FixedAssets, "2*"),
    (Inventory, "3*"),
    (Capital, "101*"),
    (Loans, "164*"),
    (Purchases, "607*"),
    (Salaries, "641*"),
    (Rent, "613*"),
    (Utilities, "606*"),
    (Sales, "707*"),
    (Services, "706*"),
    (FinancialIncome, "76*"),
    (VatDeductible, "4456*"),
    (VatCollected, "4457*"),
];

const SYSCOHADA: PatternTable = [
    (Customers, "411*"),
    (Suppliers, "401*"),
    (Bank, "521*"),
    (Cash, "571*"),
    (FixedAssets, "2*"),
    (Inventory, "3*"),
    (Capital, "101*"),
    (Loans, "162*"),
    (Purchases, "601*"),
    (Salaries, "661*"),
    (Rent, "622*"),
    (Utilities, "605*"),
    (Sales, "701*"),
    (Services, "706*"),
    (FinancialIncome, "77*"),
    (VatDeductible, "445*"),
    (VatCollected, "443*"),
];

const SCF: PatternTable = [
    (Customers, "411*"),
    (Suppliers, "401*"),
    (Bank, "512*"),
    (Cash, "53*"),
    (FixedAssets, "2*"),
    (Inventory, "3*"),
    (Capital, "101*"),
    (Loans, "164*"),
    (Purchases, "60*"),
    (Salaries, "631*"),
    (Rent, "613*"),
    (Utilities, "606*"),
    (Sales, "70*"),
    (Services, "706*"),
    (FinancialIncome, "76*"),
    (VatDeductible, "4456*"),
    (VatCollected, "4457*"),
];

const IFRS: PatternTable = [
    (Customers, "receivable|customer|trade debtors|!vat|!tax"),
    (Suppliers, "payable|supplier|trade creditors|!vat|!tax|!loan|!note"),
    (Bank, "bank|cash at bank"),
    (Cash, "cash|petty cash|!bank"),
    (FixedAssets, "property|plant|equipment|fixed asset"),
    (Inventory, "inventory|stock"),
    (Capital, "share capital|capital|equity"),
    (Loans, "loan|borrowing"),
    (Purchases, "purchase|cost of sales"),
    (Salaries, "salar|wage|payroll"),
    (Rent, "rent|lease|!current"),
    (Utilities, "utilit|electricity|water"),
    (Sales, "revenue|sales|!cost|!tax"),
    (Services, "service"),
    (FinancialIncome, "interest income|finance income"),
    (VatDeductible, "vat receivable|input vat|input tax"),
    (VatCollected, "vat payable|output vat|output tax"),
];

const US_GAAP: PatternTable = [
    (Customers, "accounts receivable|receivable|customer|!tax"),
    (Suppliers, "accounts payable|payable|vendor|supplier|!tax|!notes"),
    (Bank, "checking|bank"),
    (Cash, "cash|petty cash|!bank|!checking"),
    (FixedAssets, "property|plant|equipment|fixed asset"),
    (Inventory, "inventory|merchandise"),
    (Capital, "common stock|capital|paid-in"),
    (Loans, "notes payable|loan|debt"),
    (Purchases, "purchases|cost of goods sold|cogs"),
    (Salaries, "salar|wage|payroll"),
    (Rent, "rent|lease|!current"),
    (Utilities, "utilit|electricity|water"),
    (Sales, "sales|revenue|!cost|!tax"),
    (Services, "service"),
    (FinancialIncome, "interest income|investment income"),
    (VatDeductible, "sales tax receivable|input tax"),
    (VatCollected, "sales tax payable|output tax"),
];

/// Returns the raw pattern table of a standard.
#[must_use]
pub fn pattern_table(
    standard: AccountingStandard,
) -> &'static [(UniversalAccountType, &'static str)] {
    match standard {
        AccountingStandard::Pcg | AccountingStandard::Custom => &PCG,
        AccountingStandard::Syscohada => &SYSCOHADA,
        AccountingStandard::Ifrs => &IFRS,
        AccountingStandard::UsGaap => &US_GAAP,
        AccountingStandard::Scf => &SCF,
    }
}

/// Returns the parsed pattern locating `role` in a chart of `standard`.
#[must_use]
pub fn role_pattern(standard: AccountingStandard, role: UniversalAccountType) -> AccountPattern {
    let raw = pattern_table(standard)
        .iter()
        .find(|(r, _)| *r == role)
        .map_or("", |(_, raw)| *raw);
    AccountPattern::parse(raw)
}

/// Returns the number prefix of `role` for a numeric standard.
#[must_use]
pub fn role_prefix(standard: AccountingStandard, role: UniversalAccountType) -> Option<String> {
    role_pattern(standard, role).prefix().map(str::to_string)
}
