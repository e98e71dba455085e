//! Property-based tests for chart-of-accounts scoring.

use ledgerguard_shared::types::CompanyId;
use proptest::prelude::*;

use super::detector::{best_standard, score_chart};
use super::types::AccountingStandard;
use crate::repository::ChartAccount;

/// Strategy for a numeric account number of 3 to 8 digits.
fn numeric_number() -> impl Strategy<Value = String> {
    "[1-8][0-9]{2,7}"
}

/// Strategy for a label-only account name without scoring keywords.
fn plain_label() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10}( [a-z]{2,8})?"
        .prop_filter("no scoring keywords", |s| {
            let lower = s.to_lowercase();
            !["receivable", "payable", "revenue", "expense", "vat", "sales tax", "cogs"]
                .iter()
                .any(|k| lower.contains(k))
        })
}

fn to_chart(rows: &[(String, String)]) -> Vec<ChartAccount> {
    let company = CompanyId::new();
    rows.iter()
        .map(|(number, name)| ChartAccount::new(company, number.clone(), name.clone()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A purely numeric chart with neutral labels is always PCG or SYSCOHADA.
    #[test]
    fn prop_numeric_chart_is_french_family(
        rows in prop::collection::vec((numeric_number(), plain_label()), 1..40),
    ) {
        let standard = best_standard(&score_chart(&to_chart(&rows)));
        prop_assert!(
            matches!(standard, AccountingStandard::Pcg | AccountingStandard::Syscohada),
            "got {standard}"
        );
    }

    /// Scoring is independent of account order.
    #[test]
    fn prop_scoring_is_order_independent(
        rows in prop::collection::vec((numeric_number(), plain_label()), 0..30),
    ) {
        let chart = to_chart(&rows);
        let mut reversed = chart.clone();
        reversed.reverse();
        prop_assert_eq!(score_chart(&chart), score_chart(&reversed));
    }

    /// Scores never decrease when accounts are added.
    #[test]
    fn prop_scores_are_monotonic(
        rows in prop::collection::vec((numeric_number(), plain_label()), 1..30),
        extra in (numeric_number(), plain_label()),
    ) {
        let chart = to_chart(&rows);
        let mut larger = chart.clone();
        larger.extend(to_chart(&[extra]));
        let before = score_chart(&chart);
        let after = score_chart(&larger);
        for i in 0..before.len() {
            prop_assert!(after[i] >= before[i]);
        }
    }
}
