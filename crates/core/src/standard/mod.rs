//! Accounting standards: registry, class mappings and detection.
//!
//! - `types` - Standard enum and class mapping
//! - `registry` - Static mappings and the country table
//! - `detector` - Per-company standard detection

pub mod detector;
pub mod error;
pub mod registry;
pub mod types;

#[cfg(test)]
mod detector_props;

pub use detector::{
    DEFAULT_SAMPLE_SIZE, Detection, DetectionBasis, StandardDetector, best_standard, score_chart,
};
pub use error::StandardError;
pub use registry::{
    HAO_EXPENSE_PREFIXES, HAO_REVENUE_PREFIXES, IFRS_COUNTRIES, OHADA_COUNTRIES, SCF_COUNTRIES,
    StandardRegistry,
};
pub use types::{AccountingStandard, NumberingScheme, StandardMapping};
