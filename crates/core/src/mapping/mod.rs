//! Universal account mapping.
//!
//! Resolves standard-independent roles (customers, bank, VAT collected, ...)
//! to the concrete accounts of a company's chart.

pub mod cache;
pub mod error;
pub mod patterns;
pub mod service;
pub mod types;

pub use cache::ChartCache;
pub use error::MappingError;
pub use patterns::{pattern_table, role_pattern, role_prefix};
pub use service::{UniversalAccountMapper, find_in};
pub use types::{AccountPattern, RoleSection, UniversalAccountType};
