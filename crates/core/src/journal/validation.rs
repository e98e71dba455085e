//! Journal entry validation and journal suggestion.

use std::sync::Arc;

use ledgerguard_shared::types::{AccountId, Tolerance, format_amount};

use super::types::{AccountRef, EntryValidation, JournalEntryCandidate, JournalType};
use crate::mapping::{UniversalAccountType, role_prefix};
use crate::nature::AccountNatureClassifier;
use crate::standard::{AccountingStandard, NumberingScheme, StandardRegistry};

/// Pre-commit validator for double-entry invariants.
pub struct JournalEntryValidator {
    classifier: Arc<AccountNatureClassifier>,
    tolerance: Tolerance,
}

impl JournalEntryValidator {
    /// Creates a validator accepting imbalances up to `tolerance`.
    #[must_use]
    pub fn new(classifier: Arc<AccountNatureClassifier>, tolerance: Tolerance) -> Self {
        Self {
            classifier,
            tolerance,
        }
    }

    /// Validates a candidate entry.
    ///
    /// Checks run in order:
    /// 1. Debits and credits balance within the tolerance
    /// 2. At least two lines
    /// 3. Each line sits on a sensible side of its account
    ///
    /// `resolve` maps account ids to account numbers; an id it cannot map is a
    /// blocking error.
    pub fn validate<R>(
        &self,
        candidate: &JournalEntryCandidate,
        standard: AccountingStandard,
        resolve: R,
    ) -> EntryValidation
    where
        R: Fn(AccountId) -> Option<String>,
    {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Balance
        let total_debit = candidate.total_debit();
        let total_credit = candidate.total_credit();
        let difference = (total_debit - total_credit).abs();
        if self.tolerance.exceeded_by(difference) {
            errors.push(format!(
                "Entry is not balanced: debit {} != credit {} (difference: {})",
                format_amount(total_debit),
                format_amount(total_credit),
                format_amount(difference),
            ));
        }

        // 2. Line count
        if candidate.lines.len() < 2 {
            errors.push("A journal entry must have at least 2 lines".to_string());
        }

        // 3. Per-line side check
        for (index, line) in candidate.lines.iter().enumerate() {
            let position = index + 1;
            let number = match &line.account {
                AccountRef::Number(number) => number.clone(),
                AccountRef::Id(id) => match resolve(*id) {
                    Some(number) => number,
                    None => {
                        errors.push(format!("Line {position}: account {id} not found"));
                        continue;
                    }
                },
            };

            let check =
                self.classifier
                    .validate_line_side(&number, standard, line.debit, line.credit);
            if let Some(warning) = check.warning {
                let finding = format!("Line {position} ({number}): {warning}");
                if check.valid {
                    warnings.push(finding);
                } else {
                    errors.push(finding);
                }
            }
        }

        EntryValidation::from_findings(errors, warnings)
    }
}

/// Suggests a journal from the accounts used by an entry, using the PCG table.
#[must_use]
pub fn suggest_journal<S: AsRef<str>>(account_numbers: &[S]) -> JournalType {
    suggest_journal_for(AccountingStandard::Pcg, account_numbers)
}

/// Suggests a journal using the role prefixes of a numeric standard.
///
/// Label-based standards have no prefixes and fall back to the PCG table.
#[must_use]
pub fn suggest_journal_for<S: AsRef<str>>(
    standard: AccountingStandard,
    account_numbers: &[S],
) -> JournalType {
    let standard = match StandardRegistry::mapping(standard).scheme {
        NumberingScheme::Numeric => standard,
        NumberingScheme::Label => AccountingStandard::Pcg,
    };
    let has = |role: UniversalAccountType| {
        role_prefix(standard, role).is_some_and(|prefix| {
            account_numbers
                .iter()
                .any(|n| n.as_ref().trim().starts_with(prefix.as_str()))
        })
    };

    if has(UniversalAccountType::Sales) && has(UniversalAccountType::Customers) {
        JournalType::Sale
    } else if has(UniversalAccountType::Purchases) && has(UniversalAccountType::Suppliers) {
        JournalType::Purchase
    } else if has(UniversalAccountType::Bank) {
        JournalType::Bank
    } else if has(UniversalAccountType::Cash) {
        JournalType::Cash
    } else {
        JournalType::Miscellaneous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::types::JournalLineInput;
    use chrono::NaiveDate;
    use ledgerguard_shared::types::{CompanyId, JournalId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn validator() -> JournalEntryValidator {
        JournalEntryValidator::new(Arc::new(AccountNatureClassifier::new()), Tolerance::cent())
    }

    fn candidate(lines: Vec<JournalLineInput>) -> JournalEntryCandidate {
        JournalEntryCandidate {
            company_id: CompanyId::new(),
            journal_id: JournalId::new(),
            entry_date: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
            description: "Test".to_string(),
            lines,
        }
    }

    fn no_ids(_: AccountId) -> Option<String> {
        None
    }

    #[test]
    fn test_balanced_bank_receipt() {
        let entry = candidate(vec![
            JournalLineInput::debit("512000", dec!(100)),
            JournalLineInput::credit("411000", dec!(100)),
        ]);
        let result = validator().validate(&entry, AccountingStandard::Pcg, no_ids);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_single_line_rejected() {
        let entry = candidate(vec![JournalLineInput::debit("512000", dec!(100))]);
        let result = validator().validate(&entry, AccountingStandard::Pcg, no_ids);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("at least 2 lines")));
    }

    #[test]
    fn test_unbalanced_message_carries_amounts() {
        let entry = candidate(vec![
            JournalLineInput::debit("607000", dec!(100)),
            JournalLineInput::credit("401000", dec!(90)),
        ]);
        let result = validator().validate(&entry, AccountingStandard::Pcg, no_ids);
        assert!(!result.valid);
        assert_eq!(
            result.errors[0],
            "Entry is not balanced: debit 100.00 != credit 90.00 (difference: 10.00)"
        );
    }

    #[test]
    fn test_tolerance_accepts_one_cent() {
        let entry = candidate(vec![
            JournalLineInput::debit("607000", dec!(100.01)),
            JournalLineInput::credit("401000", dec!(100)),
        ]);
        assert!(
            validator()
                .validate(&entry, AccountingStandard::Pcg, no_ids)
                .valid
        );
    }

    #[test]
    fn test_both_sided_line_is_error() {
        let mut both = JournalLineInput::debit("607000", dec!(50));
        both.credit = dec!(50);
        let entry = candidate(vec![both, JournalLineInput::credit("401000", dec!(0))]);
        let result = validator().validate(&entry, AccountingStandard::Pcg, no_ids);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.starts_with("Line 1 (607000):")));
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w == "Line 2 (401000): No amount entered")
        );
    }

    #[test]
    fn test_resolves_account_ids() {
        let bank = AccountId::new();
        let customers = AccountId::new();
        let mut lines = vec![
            JournalLineInput::debit("", dec!(100)),
            JournalLineInput::credit("", dec!(100)),
        ];
        lines[0].account = AccountRef::Id(bank);
        lines[1].account = AccountRef::Id(customers);
        let entry = candidate(lines);

        let result = validator().validate(&entry, AccountingStandard::Pcg, |id| {
            if id == bank {
                Some("512000".to_string())
            } else if id == customers {
                Some("411000".to_string())
            } else {
                None
            }
        });
        assert!(result.valid);
    }

    #[test]
    fn test_unknown_account_id_is_error() {
        let mut lines = vec![
            JournalLineInput::debit("512000", dec!(100)),
            JournalLineInput::credit("", dec!(100)),
        ];
        let missing = AccountId::new();
        lines[1].account = AccountRef::Id(missing);
        let result = validator().validate(&candidate(lines), AccountingStandard::Pcg, no_ids);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![format!("Line 2: account {missing} not found")]
        );
    }

    #[rstest]
    #[case(&["411000", "707000", "445710"], JournalType::Sale)]
    #[case(&["607000", "445660", "401000"], JournalType::Purchase)]
    #[case(&["512000", "411000"], JournalType::Bank)]
    #[case(&["530000", "707000"], JournalType::Cash)]
    #[case(&["641000", "421000"], JournalType::Miscellaneous)]
    #[case(&["707000", "512000"], JournalType::Bank)]
    fn test_suggest_journal(#[case] accounts: &[&str], #[case] expected: JournalType) {
        assert_eq!(suggest_journal(accounts), expected);
    }

    #[test]
    fn test_suggest_journal_syscohada() {
        assert_eq!(
            suggest_journal_for(AccountingStandard::Syscohada, &["521000", "411000"]),
            JournalType::Bank
        );
        assert_eq!(
            suggest_journal_for(AccountingStandard::Syscohada, &["411000", "701000"]),
            JournalType::Sale
        );
        assert_eq!(
            suggest_journal_for(AccountingStandard::Ifrs, &["512000"]),
            JournalType::Bank
        );
    }
}
