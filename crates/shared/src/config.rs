//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Tolerance;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Classification and mapping settings.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Integrity audit settings.
    #[serde(default)]
    pub integrity: IntegritySettings,
    /// Journal entry settings.
    #[serde(default)]
    pub journal: JournalSettings,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Classification and mapping settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Number of accounts sampled by the chart-of-accounts scoring fallback.
    #[serde(default = "default_detection_sample_size")]
    pub detection_sample_size: usize,
    /// Replaces the default flexible account prefixes when set.
    #[serde(default)]
    pub flexible_prefixes: Option<Vec<String>>,
}

fn default_detection_sample_size() -> usize {
    50
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            detection_sample_size: default_detection_sample_size(),
            flexible_prefixes: None,
        }
    }
}

/// Integrity audit settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegritySettings {
    /// Tolerance for debit/credit and balance comparisons.
    #[serde(default = "Tolerance::cent")]
    pub balance_tolerance: Tolerance,
    /// Minimum ratio of audit-log entries to journal-entry modifications.
    #[serde(default = "default_audit_trail_min_ratio")]
    pub audit_trail_min_ratio: Decimal,
    /// Accepted VAT imbalance.
    #[serde(default = "Tolerance::unit")]
    pub vat_tolerance: Tolerance,
    /// Whether checks of one run execute concurrently.
    #[serde(default = "default_true")]
    pub run_concurrently: bool,
}

fn default_audit_trail_min_ratio() -> Decimal {
    Decimal::new(8, 1)
}

fn default_true() -> bool {
    true
}

impl Default for IntegritySettings {
    fn default() -> Self {
        Self {
            balance_tolerance: Tolerance::cent(),
            audit_trail_min_ratio: default_audit_trail_min_ratio(),
            vat_tolerance: Tolerance::unit(),
            run_concurrently: true,
        }
    }
}

/// Journal entry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalSettings {
    /// Tolerance for the debit/credit balance of a candidate entry.
    #[serde(default = "Tolerance::cent")]
    pub balance_tolerance: Tolerance,
    /// Attempts made to post an entry when its number collides with another writer.
    #[serde(default = "default_max_number_attempts")]
    pub max_number_attempts: u32,
}

fn default_max_number_attempts() -> u32 {
    3
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            balance_tolerance: Tolerance::cent(),
            max_number_attempts: default_max_number_attempts(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_filter() -> String {
    "ledgerguard=info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LEDGERGUARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
