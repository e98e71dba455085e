//! Property-based tests for journal entry validation.

use std::sync::Arc;

use chrono::NaiveDate;
use ledgerguard_shared::types::{AccountId, CompanyId, JournalId, Tolerance};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{JournalEntryCandidate, JournalLineInput};
use super::validation::JournalEntryValidator;
use crate::nature::AccountNatureClassifier;
use crate::standard::AccountingStandard;

/// Strategy to generate a positive amount from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account_number() -> impl Strategy<Value = String> {
    "[1-7][0-9]{5}"
}

fn validator() -> JournalEntryValidator {
    JournalEntryValidator::new(Arc::new(AccountNatureClassifier::new()), Tolerance::cent())
}

fn candidate(lines: Vec<JournalLineInput>) -> JournalEntryCandidate {
    JournalEntryCandidate {
        company_id: CompanyId::new(),
        journal_id: JournalId::new(),
        entry_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        description: String::new(),
        lines,
    }
}

fn no_ids(_: AccountId) -> Option<String> {
    None
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A two-line entry with one debit and one credit of the same amount is valid.
    #[test]
    fn prop_balanced_pair_is_valid(
        amount in positive_amount(),
        debit_account in account_number(),
        credit_account in account_number(),
    ) {
        let entry = candidate(vec![
            JournalLineInput::debit(debit_account, amount),
            JournalLineInput::credit(credit_account, amount),
        ]);
        let result = validator().validate(&entry, AccountingStandard::Pcg, no_ids);
        prop_assert!(result.valid, "errors: {:?}", result.errors);
    }

    /// Any imbalance above one cent is rejected.
    #[test]
    fn prop_imbalance_rejected(
        amount in positive_amount(),
        gap in 2i64..1_000_000i64,
        debit_account in account_number(),
        credit_account in account_number(),
    ) {
        let entry = candidate(vec![
            JournalLineInput::debit(debit_account, amount + Decimal::new(gap, 2)),
            JournalLineInput::credit(credit_account, amount),
        ]);
        let result = validator().validate(&entry, AccountingStandard::Pcg, no_ids);
        prop_assert!(!result.valid);
        prop_assert!(result.errors[0].starts_with("Entry is not balanced"));
    }

    /// Single-line entries are always rejected.
    #[test]
    fn prop_single_line_rejected(
        amount in positive_amount(),
        account in account_number(),
        on_debit in any::<bool>(),
    ) {
        let line = if on_debit {
            JournalLineInput::debit(account, amount)
        } else {
            JournalLineInput::credit(account, amount)
        };
        let result = validator().validate(&candidate(vec![line]), AccountingStandard::Pcg, no_ids);
        prop_assert!(!result.valid);
    }

    /// `valid` is exactly "no errors".
    #[test]
    fn prop_valid_iff_no_errors(
        lines in prop::collection::vec(
            (account_number(), positive_amount(), any::<bool>()),
            0..6,
        ),
    ) {
        let lines = lines
            .into_iter()
            .map(|(account, amount, on_debit)| {
                if on_debit {
                    JournalLineInput::debit(account, amount)
                } else {
                    JournalLineInput::credit(account, amount)
                }
            })
            .collect();
        let result = validator().validate(&candidate(lines), AccountingStandard::Pcg, no_ids);
        prop_assert_eq!(result.valid, result.errors.is_empty());
    }
}
