//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPFRONT_DATA_DIR` - Directory for the durable cart record (default: `.shopfront`)
//! - `SHOPFRONT_SHIPPING_FLAT` - Flat shipping charge per order (default: 9.99)
//! - `SHOPFRONT_TAX_RATE` - Sales tax as a fraction of the subtotal (default: 0.08)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use shopfront_core::Price;
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".shopfront";
const DEFAULT_SHIPPING_FLAT_CENTS: u32 = 999;
/// 8%
const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Directory backing the file store
    pub data_dir: PathBuf,
    /// Shipping and tax settings
    pub pricing: PricingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Shipping and tax applied on top of the cart subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Flat shipping charge per order
    pub shipping_flat: Price,
    /// Tax rate as a fraction (0.08 = 8%)
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            shipping_flat: Price::from_cents(DEFAULT_SHIPPING_FLAT_CENTS),
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(get_or_default(&lookup, "SHOPFRONT_DATA_DIR", DEFAULT_DATA_DIR));
        let pricing = PricingConfig::from_lookup(&lookup)?;
        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());

        Ok(Self {
            data_dir,
            pricing,
            sentry_dsn,
        })
    }
}

impl PricingConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let shipping_flat = match get_non_empty(lookup, "SHOPFRONT_SHIPPING_FLAT") {
            Some(raw) => raw.parse::<Price>().map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPFRONT_SHIPPING_FLAT".to_string(), e.to_string())
            })?,
            None => defaults.shipping_flat,
        };

        let tax_rate = match get_non_empty(lookup, "SHOPFRONT_TAX_RATE") {
            Some(raw) => Decimal::from_str(raw.trim()).map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPFRONT_TAX_RATE".to_string(), e.to_string())
            })?,
            None => defaults.tax_rate,
        };
        if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_TAX_RATE".to_string(),
                format!("must be between 0 and 1 (got {tax_rate})"),
            ));
        }

        Ok(Self {
            shipping_flat,
            tax_rate,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable, treating empty values as unset.
fn get_non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_non_empty(lookup, key).unwrap_or_else(|| default.to_string())
}
