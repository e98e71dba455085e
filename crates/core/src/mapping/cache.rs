//! Per-company chart-of-accounts cache using Moka.
//!
//! Whole account lists are stored behind an `Arc`, so a reader sees either the
//! previous list or the new one, never a partial write.
//!
//! Every invalidation bumps a generation counter. Loaders take the generation
//! before reading the chart and only store the result if no invalidation
//! happened in between, so a slow load cannot resurrect a cleared chart.

use moka::sync::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ledgerguard_shared::types::CompanyId;

use crate::repository::ChartAccount;

/// Cache of active accounts keyed by company.
///
/// Entries live until invalidated. Thread-safe and cheap to clone.
#[derive(Clone)]
pub struct ChartCache {
    cache: Cache<CompanyId, Arc<Vec<ChartAccount>>>,
    generation: Arc<AtomicU64>,
}

impl ChartCache {
    /// Creates an unbounded cache with no expiry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a cache holding at most `max_capacity` companies.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the cached accounts of a company.
    #[must_use]
    pub fn get(&self, company_id: &CompanyId) -> Option<Arc<Vec<ChartAccount>>> {
        self.cache.get(company_id)
    }

    /// Stores the accounts of a company, replacing any previous list.
    pub fn insert(&self, company_id: CompanyId, accounts: Arc<Vec<ChartAccount>>) {
        self.cache.insert(company_id, accounts);
    }

    /// Current invalidation generation. Take it before loading a chart.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Stores a chart loaded at `generation`, unless an invalidation happened since.
    ///
    /// Returns true if the chart was kept in the cache.
    pub fn insert_if_current(
        &self,
        company_id: CompanyId,
        generation: u64,
        accounts: Arc<Vec<ChartAccount>>,
    ) -> bool {
        if self.generation() != generation {
            return false;
        }
        self.cache.insert(company_id, accounts);
        // An invalidation may have slipped in between the check and the insert.
        if self.generation() != generation {
            self.cache.invalidate(&company_id);
            return false;
        }
        true
    }

    /// Invalidates one company's entry.
    pub fn invalidate(&self, company_id: &CompanyId) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(company_id);
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka updates its counters lazily; call this before reading
    /// [`Self::entry_count`] when an exact figure matters.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for ChartCache {
    fn default() -> Self {
        Self::new()
    }
}
