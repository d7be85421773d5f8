//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PLATEFUL_API_BASE_URL` - Base URL of the ordering backend
//! - `PLATEFUL_API_TOKEN` - Bearer token for the backend (high entropy)
//!
//! ## Optional
//! - `PLATEFUL_CURRENCY` - ISO currency code (default: USD)
//! - `PLATEFUL_TAX_RATE` - Tax rate as a fraction (default: 0.05)
//! - `PLATEFUL_DELIVERY_FEE` - Flat delivery fee in major units (default: 4.99)
//! - `PLATEFUL_SCHEDULE_HORIZON_DAYS` - Days offered for scheduling (default: 7)
//! - `PLATEFUL_SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::str::FromStr;

use plateful_core::{CurrencyCode, Money};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::pricing::PricingConfig;
use crate::schedule::DEFAULT_HORIZON_DAYS;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Checkout configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Ordering backend connection settings
    pub api: ApiConfig,
    /// Currency all prices are denominated in
    pub currency: CurrencyCode,
    /// Tax rate as a fraction, e.g. 0.05 for 5%
    pub tax_rate: Decimal,
    /// Flat delivery fee
    pub delivery_fee: Money,
    /// Days offered for scheduling, starting today
    pub schedule_horizon_days: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Ordering backend connection settings.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the ordering backend
    pub base_url: Url,
    /// Bearer token attached to every request
    pub auth_token: SecretString,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let currency = parse_currency(
            "PLATEFUL_CURRENCY",
            &get_env_or_default("PLATEFUL_CURRENCY", "USD"),
        )?;
        let tax_rate = parse_tax_rate(
            "PLATEFUL_TAX_RATE",
            &get_env_or_default("PLATEFUL_TAX_RATE", "0.05"),
        )?;
        let delivery_fee = parse_fee(
            "PLATEFUL_DELIVERY_FEE",
            &get_env_or_default("PLATEFUL_DELIVERY_FEE", "4.99"),
        )?;
        let schedule_horizon_days = parse_horizon(
            "PLATEFUL_SCHEDULE_HORIZON_DAYS",
            &get_env_or_default(
                "PLATEFUL_SCHEDULE_HORIZON_DAYS",
                &DEFAULT_HORIZON_DAYS.to_string(),
            ),
        )?;
        let sentry_dsn = get_optional_env("PLATEFUL_SENTRY_DSN");

        Ok(Self {
            api,
            currency,
            tax_rate,
            delivery_fee,
            schedule_horizon_days,
            sentry_dsn,
        })
    }

    /// The pricing constants this deployment runs with.
    #[must_use]
    pub const fn pricing(&self) -> PricingConfig {
        PricingConfig::new(self.delivery_fee, self.tax_rate)
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("PLATEFUL_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PLATEFUL_API_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            auth_token: get_validated_secret("PLATEFUL_API_TOKEN")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_currency(var_name: &str, value: &str) -> Result<CurrencyCode, ConfigError> {
    CurrencyCode::from_str(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

fn parse_tax_rate(var_name: &str, value: &str) -> Result<Decimal, ConfigError> {
    let rate = Decimal::from_str(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("rate {rate} must be in [0, 1)"),
        ));
    }
    Ok(rate)
}

fn parse_fee(var_name: &str, value: &str) -> Result<Money, ConfigError> {
    let fee = Money::parse_decimal_str(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if fee < Money::ZERO {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "fee must not be negative".to_string(),
        ));
    }
    Ok(fee)
}

fn parse_horizon(var_name: &str, value: &str) -> Result<u16, ConfigError> {
    let days = value
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if days == 0 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must offer at least one day".to_string(),
        ));
    }
    Ok(days)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real tokens have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
