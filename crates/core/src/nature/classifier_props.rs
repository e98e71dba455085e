//! Property-based tests for line-side checks.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::classifier::{AccountNature, AccountNatureClassifier};
use crate::standard::AccountingStandard;

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn standard_strategy() -> impl Strategy<Value = AccountingStandard> {
    prop::sample::select(AccountingStandard::ALL.to_vec())
}

fn account_number() -> impl Strategy<Value = String> {
    "[1-9][0-9]{2,7}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A line with both sides filled is always rejected.
    #[test]
    fn prop_both_sides_rejected(
        number in account_number(),
        standard in standard_strategy(),
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        let check = AccountNatureClassifier::new()
            .validate_line_side(&number, standard, debit, credit);
        prop_assert!(!check.valid);
    }

    /// A single-sided line is always accepted, whatever the account.
    #[test]
    fn prop_single_side_accepted(
        number in account_number(),
        standard in standard_strategy(),
        amount in positive_amount(),
        on_debit in any::<bool>(),
    ) {
        let (debit, credit) = if on_debit {
            (amount, Decimal::ZERO)
        } else {
            (Decimal::ZERO, amount)
        };
        let check = AccountNatureClassifier::new()
            .validate_line_side(&number, standard, debit, credit);
        prop_assert!(check.valid);
        prop_assert!(check.warning.is_none());
    }

    /// Numbers that do not start with a class digit are mixed.
    #[test]
    fn prop_non_numeric_is_mixed(
        label in "[A-Za-z][A-Za-z0-9 ]{0,20}",
        standard in standard_strategy(),
    ) {
        prop_assert_eq!(
            AccountNatureClassifier::new().classify(&label, standard),
            AccountNature::Mixed
        );
    }

    /// Flexible accounts never receive side commentary.
    #[test]
    fn prop_flexible_is_silent(
        suffix in "[0-9]{0,4}",
        amount in positive_amount(),
        standard in standard_strategy(),
    ) {
        let number = format!("512{suffix}");
        let check = AccountNatureClassifier::new()
            .validate_line_side(&number, standard, Decimal::ZERO, amount);
        prop_assert!(check.info.is_none());
        prop_assert!(check.suggestion.is_none());
    }
}
