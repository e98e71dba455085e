//! Property-based tests for the HAO split.

use proptest::prelude::*;

use super::{is_hao, split_expenses, split_revenues};
use crate::standard::{AccountingStandard, StandardRegistry};

fn account_number() -> impl Strategy<Value = String> {
    "[1-9][0-9]{2,6}"
}

fn standard_strategy() -> impl Strategy<Value = AccountingStandard> {
    prop::sample::select(AccountingStandard::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The two halves of a split never share an item and never invent one.
    #[test]
    fn prop_split_is_disjoint_subset(
        accounts in prop::collection::vec(account_number(), 0..40),
        standard in standard_strategy(),
    ) {
        for split in [
            split_revenues(accounts.clone(), standard),
            split_expenses(accounts.clone(), standard),
        ] {
            for item in &split.exploitation {
                prop_assert!(accounts.contains(item));
                prop_assert!(!is_hao(item, standard));
            }
            for item in &split.hao {
                prop_assert!(accounts.contains(item));
                prop_assert!(is_hao(item, standard));
            }
            prop_assert!(split.exploitation.len() + split.hao.len() <= accounts.len());
        }
    }

    /// Only SYSCOHADA produces HAO items.
    #[test]
    fn prop_hao_only_in_syscohada(
        accounts in prop::collection::vec(account_number(), 0..40),
        standard in standard_strategy(),
    ) {
        let revenues = split_revenues(accounts.clone(), standard);
        let expenses = split_expenses(accounts, standard);
        if standard != AccountingStandard::Syscohada {
            prop_assert!(revenues.hao.is_empty());
            prop_assert!(expenses.hao.is_empty());
        }
    }

    /// Outside SYSCOHADA, the operating half is exactly the class filter.
    #[test]
    fn prop_non_hao_standard_is_class_filter(
        accounts in prop::collection::vec(account_number(), 0..40),
        standard in standard_strategy().prop_filter("no HAO", |s| *s != AccountingStandard::Syscohada),
    ) {
        let mapping = StandardRegistry::mapping(standard);
        let expected: Vec<String> = accounts
            .iter()
            .filter(|a| mapping.is_revenue(a))
            .cloned()
            .collect();
        prop_assert_eq!(split_revenues(accounts, standard).exploitation, expected);
    }

    /// HAO revenue and HAO expense sub-ranges never overlap.
    #[test]
    fn prop_hao_halves_disjoint(
        accounts in prop::collection::vec("8[0-9]{2,5}", 0..30),
    ) {
        let revenues = split_revenues(accounts.clone(), AccountingStandard::Syscohada);
        let expenses = split_expenses(accounts, AccountingStandard::Syscohada);
        for item in &revenues.hao {
            prop_assert!(!expenses.hao.contains(item));
        }
    }
}
