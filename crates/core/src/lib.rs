//! Core business logic for Ledgerguard.
//!
//! This crate contains pure accounting logic with ZERO web or database dependencies.
//! Data is read through the repository traits; hosts bring their own storage.
//!
//! # Modules
//!
//! - `standard` - Accounting standards, class mappings and detection
//! - `mapping` - Universal account roles resolved onto a company's chart
//! - `nature` - Normal balance side of accounts
//! - `journal` - Entry validation, numbering and posting
//! - `hao` - SYSCOHADA extraordinary operations
//! - `integrity` - Post-commit integrity audit
//! - `engine` - Facade wiring everything over one data source

pub mod engine;
pub mod hao;
pub mod integrity;
pub mod journal;
pub mod mapping;
pub mod nature;
pub mod repository;
pub mod standard;

pub use engine::{AccountInfo, AccountingEngine, EngineConfig, ResolvedTemplateLine};
