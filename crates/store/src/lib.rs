//! In-memory ledger store for Ledgerguard.
//!
//! This crate provides:
//! - A JSON ledger snapshot format (`snapshot`)
//! - An in-memory store implementing every repository trait of the engine (`memory`)

pub mod error;
pub mod memory;
pub mod snapshot;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use snapshot::{
    AccountRecord, AuditEvent, BalanceSnapshot, CompanyBooks, JournalRecord, LedgerSnapshot,
    SnapshotKind, StoredEntry, VatAccounts,
};
