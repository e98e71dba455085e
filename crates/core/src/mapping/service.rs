//! Universal account mapper.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use ledgerguard_shared::types::{AccountId, CompanyId};

use super::cache::ChartCache;
use super::error::MappingError;
use super::patterns::role_pattern;
use super::types::{RoleSection, UniversalAccountType};
use crate::repository::{ChartAccount, ChartOfAccountsReader, CompanyDirectory};
use crate::standard::{
    AccountingStandard, NumberingScheme, StandardDetector, StandardMapping, StandardRegistry,
};

/// Maps universal roles onto a company's chart of accounts.
pub struct UniversalAccountMapper<S> {
    source: Arc<S>,
    detector: Arc<StandardDetector<S>>,
    cache: ChartCache,
}

impl<S> UniversalAccountMapper<S>
where
    S: CompanyDirectory + ChartOfAccountsReader,
{
    /// Creates a mapper with an empty cache.
    #[must_use]
    pub fn new(source: Arc<S>, detector: Arc<StandardDetector<S>>) -> Self {
        Self::with_cache(source, detector, ChartCache::new())
    }

    /// Creates a mapper over an existing cache.
    #[must_use]
    pub fn with_cache(
        source: Arc<S>,
        detector: Arc<StandardDetector<S>>,
        cache: ChartCache,
    ) -> Self {
        Self {
            source,
            detector,
            cache,
        }
    }

    /// Returns the company's active accounts, reading through the cache.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read. Failures
    /// are not cached.
    pub async fn accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<Arc<Vec<ChartAccount>>, MappingError> {
        if let Some(cached) = self.cache.get(&company_id) {
            debug!(company_id = %company_id, "Chart cache hit");
            return Ok(cached);
        }

        debug!(company_id = %company_id, "Chart cache miss");
        let generation = self.cache.generation();
        let accounts: Vec<ChartAccount> = self
            .source
            .active_accounts(company_id)
            .await?
            .into_iter()
            .filter(|a| a.is_active)
            .collect();
        let accounts = Arc::new(accounts);
        if !self
            .cache
            .insert_if_current(company_id, generation, Arc::clone(&accounts))
        {
            debug!(company_id = %company_id, "Chart invalidated while loading, not cached");
        }
        Ok(accounts)
    }

    /// Finds the account playing `role` in the company's chart.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read.
    pub async fn find_account_by_type(
        &self,
        company_id: CompanyId,
        role: UniversalAccountType,
    ) -> Result<Option<ChartAccount>, MappingError> {
        let standard = self.detector.detect(company_id).await;
        let accounts = self.accounts(company_id).await?;
        Ok(find_in(&accounts, standard, role).cloned())
    }

    /// Resolves the main roles of the company. Roles without a match are absent.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read.
    pub async fn get_main_accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<BTreeMap<UniversalAccountType, ChartAccount>, MappingError> {
        self.resolve_roles(company_id, &UniversalAccountType::MAIN)
            .await
    }

    /// Resolves the given roles of the company. Roles without a match are absent.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read.
    pub async fn resolve_roles(
        &self,
        company_id: CompanyId,
        roles: &[UniversalAccountType],
    ) -> Result<BTreeMap<UniversalAccountType, ChartAccount>, MappingError> {
        let standard = self.detector.detect(company_id).await;
        let accounts = self.accounts(company_id).await?;
        Ok(roles
            .iter()
            .filter_map(|role| find_in(&accounts, standard, *role).map(|a| (*role, a.clone())))
            .collect())
    }

    /// Looks an account up by id among the company's active accounts.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Repository` if the chart cannot be read.
    pub async fn find_account_by_id(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<Option<ChartAccount>, MappingError> {
        let accounts = self.accounts(company_id).await?;
        Ok(accounts.iter().find(|a| a.id == account_id).cloned())
    }

    /// Drops the cached chart of one company, or of every company with `None`.
    pub fn clear_cache(&self, company_id: Option<CompanyId>) {
        match company_id {
            Some(id) => self.cache.invalidate(&id),
            None => self.cache.invalidate_all(),
        }
    }
}

/// Picks the account playing `role`: lowest account number, then lowest id.
///
/// On label charts, a name match whose number sits in another statement
/// section is skipped ("Sales Tax Payable" is not a sales account).
#[must_use]
pub fn find_in(
    accounts: &[ChartAccount],
    standard: AccountingStandard,
    role: UniversalAccountType,
) -> Option<&ChartAccount> {
    let pattern = role_pattern(standard, role);
    let mapping = StandardRegistry::mapping(standard);
    let check_section = mapping.scheme == NumberingScheme::Label;
    accounts
        .iter()
        .filter(|a| pattern.matches(a))
        .filter(|a| !check_section || fits_section(mapping, role, &a.account_number))
        .min_by(|a, b| {
            a.account_number
                .cmp(&b.account_number)
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Returns false if the number places the account outside the role's section.
/// Numbers outside every class carry no section and always fit.
fn fits_section(mapping: &StandardMapping, role: UniversalAccountType, number: &str) -> bool {
    let number = number.trim();
    let classified = mapping.is_revenue(number)
        || mapping.is_expense(number)
        || mapping.is_balance_sheet(number);
    if !classified {
        return true;
    }
    match role.section() {
        RoleSection::Asset => mapping.is_asset(number),
        RoleSection::Liability => mapping.is_liability(number),
        RoleSection::Equity => mapping.is_equity(number),
        RoleSection::Revenue => mapping.is_revenue(number),
        RoleSection::Expense => mapping.is_expense(number),
    }
}
