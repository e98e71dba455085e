//! Accounting standard detection.
//!
//! A company's standard is resolved in three steps: the explicit choice on its
//! profile, then its country, then a score over a sample of its chart of
//! accounts. Detection never fails: any read error resolves to PCG.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use ledgerguard_shared::types::CompanyId;

use super::registry::StandardRegistry;
use super::types::AccountingStandard;
use crate::repository::{ChartAccount, ChartOfAccountsReader, CompanyDirectory, RepositoryError};

/// Default number of accounts sampled by the scoring fallback.
pub const DEFAULT_SAMPLE_SIZE: usize = 50;

/// What decided a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionBasis {
    /// The company profile names its standard.
    Override,
    /// The company's country maps to a standard.
    Country,
    /// The chart of accounts was scored.
    ChartScoring,
    /// A data source failed; PCG was assumed.
    Fallback,
}

/// Outcome of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// Detected standard.
    pub standard: AccountingStandard,
    /// What decided it.
    pub basis: DetectionBasis,
}

/// Resolves the accounting standard followed by a company.
pub struct StandardDetector<S> {
    source: Arc<S>,
    sample_size: usize,
}

impl<S> StandardDetector<S>
where
    S: CompanyDirectory + ChartOfAccountsReader,
{
    /// Creates a detector sampling at most `sample_size` accounts.
    #[must_use]
    pub fn new(source: Arc<S>, sample_size: usize) -> Self {
        Self {
            source,
            sample_size,
        }
    }

    /// Returns the company's accounting standard.
    pub async fn detect(&self, company_id: CompanyId) -> AccountingStandard {
        self.detect_with_basis(company_id).await.standard
    }

    /// Returns the company's accounting standard with what decided it.
    pub async fn detect_with_basis(&self, company_id: CompanyId) -> Detection {
        match self.resolve(company_id).await {
            Ok(detection) => {
                debug!(
                    company_id = %company_id,
                    standard = %detection.standard,
                    basis = ?detection.basis,
                    "Accounting standard detected"
                );
                detection
            }
            Err(err) => {
                warn!(
                    company_id = %company_id,
                    error = %err,
                    "Standard detection failed, assuming PCG"
                );
                Detection {
                    standard: AccountingStandard::Pcg,
                    basis: DetectionBasis::Fallback,
                }
            }
        }
    }

    async fn resolve(&self, company_id: CompanyId) -> Result<Detection, RepositoryError> {
        if let Some(profile) = self.source.company_profile(company_id).await? {
            if let Some(raw) = profile.accounting_standard.as_deref() {
                match raw.parse::<AccountingStandard>() {
                    Ok(standard) => {
                        return Ok(Detection {
                            standard,
                            basis: DetectionBasis::Override,
                        });
                    }
                    Err(err) => {
                        warn!(company_id = %company_id, error = %err, "Ignoring standard override");
                    }
                }
            }

            if let Some(country) = profile
                .country_code
                .as_deref()
                .filter(|c| !c.trim().is_empty())
            {
                return Ok(Detection {
                    standard: StandardRegistry::for_country(country),
                    basis: DetectionBasis::Country,
                });
            }
        }

        let accounts = self.source.active_accounts(company_id).await?;
        let sample = &accounts[..accounts.len().min(self.sample_size)];
        Ok(Detection {
            standard: best_standard(&score_chart(sample)),
            basis: DetectionBasis::ChartScoring,
        })
    }
}

/// Scores a chart of accounts against every standard, indexed by
/// [`AccountingStandard::index`].
#[must_use]
pub fn score_chart(accounts: &[ChartAccount]) -> [u32; 6] {
    let mut scores = [0u32; 6];
    let mut add = |standard: AccountingStandard, points: u32| {
        scores[standard.index()] += points;
    };

    for account in accounts {
        let number = account.account_number.trim();
        if is_class_number(number) {
            add(AccountingStandard::Pcg, 2);
            add(AccountingStandard::Syscohada, 2);
        }
        if number.starts_with("4456") {
            add(AccountingStandard::Pcg, 3);
        }
        if number.starts_with("443") {
            add(AccountingStandard::Syscohada, 3);
        }

        let name = account.account_name.to_lowercase();
        if ["receivable", "payable", "revenue", "expense"]
            .iter()
            .any(|term| name.contains(term))
        {
            add(AccountingStandard::Ifrs, 2);
            add(AccountingStandard::UsGaap, 2);
        }
        if name.contains("vat") {
            add(AccountingStandard::Ifrs, 1);
        }
        if name.contains("sales tax") || name.contains("cogs") {
            add(AccountingStandard::UsGaap, 1);
        }
    }

    scores
}

/// Returns the highest-scoring standard; ties go to the earlier-declared one.
#[must_use]
pub fn best_standard(scores: &[u32; 6]) -> AccountingStandard {
    let mut best = AccountingStandard::Pcg;
    for standard in AccountingStandard::ALL {
        if scores[standard.index()] > scores[best.index()] {
            best = standard;
        }
    }
    best
}

/// A class digit `1..=8` followed by at least two more digits.
fn is_class_number(number: &str) -> bool {
    let mut chars = number.chars();
    matches!(chars.next(), Some('1'..='8'))
        && chars.take(2).filter(char::is_ascii_digit).count() == 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::CompanyProfile;
    use rstest::rstest;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeSource {
        profiles: HashMap<CompanyId, CompanyProfile>,
        accounts: Vec<ChartAccount>,
        failing: bool,
    }

    impl CompanyDirectory for FakeSource {
        async fn company_profile(
            &self,
            company_id: CompanyId,
        ) -> Result<Option<CompanyProfile>, RepositoryError> {
            if self.failing {
                return Err(RepositoryError::Backend("connection reset".into()));
            }
            Ok(self.profiles.get(&company_id).cloned())
        }
    }

    impl ChartOfAccountsReader for FakeSource {
        async fn active_accounts(
            &self,
            _company_id: CompanyId,
        ) -> Result<Vec<ChartAccount>, RepositoryError> {
            Ok(self.accounts.clone())
        }
    }

    fn chart(company_id: CompanyId, rows: &[(&str, &str)]) -> Vec<ChartAccount> {
        rows.iter()
            .map(|(number, name)| ChartAccount::new(company_id, *number, *name))
            .collect()
    }

    fn profile(
        company_id: CompanyId,
        country: Option<&str>,
        standard: Option<&str>,
    ) -> CompanyProfile {
        CompanyProfile {
            id: company_id,
            country_code: country.map(str::to_string),
            accounting_standard: standard.map(str::to_string),
        }
    }

    fn detector(source: FakeSource) -> StandardDetector<FakeSource> {
        StandardDetector::new(Arc::new(source), DEFAULT_SAMPLE_SIZE)
    }

    #[rstest]
    #[case("411000", true)]
    #[case("101", true)]
    #[case("9100", false)]
    #[case("41", false)]
    #[case("4a10", false)]
    #[case("Receivables", false)]
    fn test_is_class_number(#[case] number: &str, #[case] expected: bool) {
        assert_eq!(is_class_number(number), expected);
    }

    #[tokio::test]
    async fn test_override_wins_over_country() {
        let company = CompanyId::new();
        let mut source = FakeSource::default();
        source
            .profiles
            .insert(company, profile(company, Some("SN"), Some("IFRS")));

        let detection = detector(source).detect_with_basis(company).await;
        assert_eq!(detection.standard, AccountingStandard::Ifrs);
        assert_eq!(detection.basis, DetectionBasis::Override);
    }

    #[tokio::test]
    async fn test_unparsable_override_falls_through_to_country() {
        let company = CompanyId::new();
        let mut source = FakeSource::default();
        source
            .profiles
            .insert(company, profile(company, Some("DZ"), Some("hgb")));

        let detection = detector(source).detect_with_basis(company).await;
        assert_eq!(detection.standard, AccountingStandard::Scf);
        assert_eq!(detection.basis, DetectionBasis::Country);
    }

    #[tokio::test]
    async fn test_country_ohada() {
        let company = CompanyId::new();
        let mut source = FakeSource::default();
        source
            .profiles
            .insert(company, profile(company, Some("CI"), None));

        assert_eq!(
            detector(source).detect(company).await,
            AccountingStandard::Syscohada
        );
    }

    #[tokio::test]
    async fn test_scoring_syscohada_chart() {
        let company = CompanyId::new();
        let source = FakeSource {
            accounts: chart(
                company,
                &[
                    ("411000", "Clients"),
                    ("443100", "Etat, TVA facturée"),
                    ("521000", "Banques"),
                ],
            ),
            ..FakeSource::default()
        };

        let detection = detector(source).detect_with_basis(company).await;
        assert_eq!(detection.standard, AccountingStandard::Syscohada);
        assert_eq!(detection.basis, DetectionBasis::ChartScoring);
    }

    #[tokio::test]
    async fn test_scoring_label_chart() {
        let company = CompanyId::new();
        let source = FakeSource {
            accounts: chart(
                company,
                &[
                    ("AR", "Trade receivables"),
                    ("AP", "Trade payables"),
                    ("STP", "Sales tax payable"),
                    ("COGS", "COGS"),
                ],
            ),
            ..FakeSource::default()
        };

        assert_eq!(
            detector(source).detect(company).await,
            AccountingStandard::UsGaap
        );
    }

    #[tokio::test]
    async fn test_empty_chart_is_pcg() {
        let company = CompanyId::new();
        assert_eq!(
            detector(FakeSource::default()).detect(company).await,
            AccountingStandard::Pcg
        );
    }

    #[tokio::test]
    async fn test_read_error_falls_back_to_pcg() {
        let company = CompanyId::new();
        let source = FakeSource {
            failing: true,
            ..FakeSource::default()
        };

        let detection = detector(source).detect_with_basis(company).await;
        assert_eq!(detection.standard, AccountingStandard::Pcg);
        assert_eq!(detection.basis, DetectionBasis::Fallback);
    }

    #[test]
    fn test_tie_goes_to_earlier_standard() {
        assert_eq!(best_standard(&[4, 4, 0, 0, 0, 0]), AccountingStandard::Pcg);
        assert_eq!(best_standard(&[0, 0, 3, 3, 0, 0]), AccountingStandard::Ifrs);
        assert_eq!(best_standard(&[0; 6]), AccountingStandard::Pcg);
    }

    #[test]
    fn test_sample_size_limits_scoring() {
        let company = CompanyId::new();
        let mut accounts = chart(company, &[("AR", "Receivable")]);
        accounts.extend(chart(company, &[("445660", "TVA déductible")]));

        let sampled = &accounts[..1];
        assert_eq!(best_standard(&score_chart(sampled)), AccountingStandard::Ifrs);
        assert_eq!(best_standard(&score_chart(&accounts)), AccountingStandard::Pcg);
    }
}
