//! Static class mappings and the country table.

use super::types::{AccountingStandard, NumberingScheme, StandardMapping};

/// Numeric class layout shared by the French-derived charts.
const NUMERIC_REVENUE: &[&str] = &["7"];
const NUMERIC_EXPENSE: &[&str] = &["6"];
const NUMERIC_ASSET: &[&str] = &["2", "3", "5"];
const NUMERIC_LIABILITY: &[&str] = &["4"];
const NUMERIC_EQUITY: &[&str] = &["1"];

const PCG: StandardMapping = StandardMapping {
    standard: AccountingStandard::Pcg,
    scheme: NumberingScheme::Numeric,
    revenue_classes: NUMERIC_REVENUE,
    expense_classes: NUMERIC_EXPENSE,
    asset_classes: NUMERIC_ASSET,
    liability_classes: NUMERIC_LIABILITY,
    equity_classes: NUMERIC_EQUITY,
    extraordinary_class: None,
    third_party_class: Some("4"),
};

const SYSCOHADA: StandardMapping = StandardMapping {
    standard: AccountingStandard::Syscohada,
    extraordinary_class: Some("8"),
    ..PCG
};

const SCF: StandardMapping = StandardMapping {
    standard: AccountingStandard::Scf,
    ..PCG
};

const CUSTOM: StandardMapping = StandardMapping {
    standard: AccountingStandard::Custom,
    ..PCG
};

const IFRS: StandardMapping = StandardMapping {
    standard: AccountingStandard::Ifrs,
    scheme: NumberingScheme::Label,
    revenue_classes: &["6"],
    expense_classes: &["5"],
    asset_classes: &["1", "2"],
    liability_classes: &["4"],
    equity_classes: &["3"],
    extraordinary_class: None,
    third_party_class: None,
};

const US_GAAP: StandardMapping = StandardMapping {
    standard: AccountingStandard::UsGaap,
    scheme: NumberingScheme::Label,
    revenue_classes: &["4", "7"],
    expense_classes: &["5", "6", "8"],
    asset_classes: &["1"],
    liability_classes: &["2"],
    equity_classes: &["3"],
    extraordinary_class: None,
    third_party_class: None,
};

/// OHADA member states (SYSCOHADA).
pub const OHADA_COUNTRIES: &[&str] = &[
    "BJ", "BF", "CM", "CF", "KM", "CG", "CD", "CI", "GA", "GN", "GW", "GQ", "ML", "NE", "SN",
    "TD", "TG",
];

/// Maghreb countries using SCF.
pub const SCF_COUNTRIES: &[&str] = &["DZ", "MA", "TN"];

/// Countries whose SMEs report under IFRS.
pub const IFRS_COUNTRIES: &[&str] = &[
    "GB", "NG", "GH", "KE", "ZA", "UG", "TZ", "RW", "ZM", "ZW", "BW", "MW", "MU", "NA", "SL",
    "LR", "GM",
];

/// HAO revenue sub-ranges within SYSCOHADA class 8.
pub const HAO_REVENUE_PREFIXES: &[&str] = &["82", "84", "86", "88"];

/// HAO expense sub-ranges within SYSCOHADA class 8.
pub const HAO_EXPENSE_PREFIXES: &[&str] = &["81", "83", "85"];

/// Read-only registry of standard mappings.
pub struct StandardRegistry;

impl StandardRegistry {
    /// Returns the class mapping of a standard.
    #[must_use]
    pub const fn mapping(standard: AccountingStandard) -> &'static StandardMapping {
        match standard {
            AccountingStandard::Pcg => &PCG,
            AccountingStandard::Syscohada => &SYSCOHADA,
            AccountingStandard::Ifrs => &IFRS,
            AccountingStandard::UsGaap => &US_GAAP,
            AccountingStandard::Scf => &SCF,
            AccountingStandard::Custom => &CUSTOM,
        }
    }

    /// Returns the standard used in a country. Unknown countries use PCG.
    #[must_use]
    pub fn for_country(country_code: &str) -> AccountingStandard {
        let code = country_code.trim().to_ascii_uppercase();
        let code = code.as_str();
        if OHADA_COUNTRIES.contains(&code) {
            AccountingStandard::Syscohada
        } else if SCF_COUNTRIES.contains(&code) {
            AccountingStandard::Scf
        } else if IFRS_COUNTRIES.contains(&code) {
            AccountingStandard::Ifrs
        } else {
            AccountingStandard::Pcg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SN", AccountingStandard::Syscohada)]
    #[case("ci", AccountingStandard::Syscohada)]
    #[case("CM", AccountingStandard::Syscohada)]
    #[case("DZ", AccountingStandard::Scf)]
    #[case("MA", AccountingStandard::Scf)]
    #[case("GB", AccountingStandard::Ifrs)]
    #[case("NG", AccountingStandard::Ifrs)]
    #[case("FR", AccountingStandard::Pcg)]
    #[case("US", AccountingStandard::Pcg)]
    fn test_for_country(#[case] country: &str, #[case] expected: AccountingStandard) {
        assert_eq!(StandardRegistry::for_country(country), expected);
    }

    #[test]
    fn test_country_table_sizes() {
        assert_eq!(OHADA_COUNTRIES.len(), 17);
        assert_eq!(SCF_COUNTRIES.len(), 3);
        assert_eq!(IFRS_COUNTRIES.len(), 17);
    }

    #[test]
    fn test_mapping_matches_standard() {
        for standard in AccountingStandard::ALL {
            assert_eq!(StandardRegistry::mapping(standard).standard, standard);
        }
    }

    #[test]
    fn test_only_syscohada_has_hao_class() {
        for standard in AccountingStandard::ALL {
            let mapping = StandardRegistry::mapping(standard);
            assert_eq!(
                mapping.extraordinary_class.is_some(),
                standard == AccountingStandard::Syscohada
            );
        }
    }

    #[test]
    fn test_pcg_classes() {
        let pcg = StandardRegistry::mapping(AccountingStandard::Pcg);
        assert!(pcg.is_revenue("707000"));
        assert!(pcg.is_expense("607000"));
        assert!(pcg.is_asset("512000"));
        assert!(pcg.is_liability("401000"));
        assert!(pcg.is_equity("101000"));
        assert!(pcg.is_balance_sheet("218000"));
        assert!(!pcg.is_balance_sheet("707000"));
        assert!(pcg.is_third_party("411000"));
        assert!(!pcg.is_extraordinary("838000"));
    }

    #[test]
    fn test_syscohada_extraordinary() {
        let ohada = StandardRegistry::mapping(AccountingStandard::Syscohada);
        assert!(ohada.is_extraordinary("838000"));
        assert!(!ohada.is_revenue("838000"));
    }

    #[test]
    fn test_label_schemes() {
        assert_eq!(
            StandardRegistry::mapping(AccountingStandard::Ifrs).scheme,
            NumberingScheme::Label
        );
        assert_eq!(
            StandardRegistry::mapping(AccountingStandard::UsGaap).scheme,
            NumberingScheme::Label
        );
        assert_eq!(
            StandardRegistry::mapping(AccountingStandard::Custom).scheme,
            NumberingScheme::Numeric
        );
    }
}
