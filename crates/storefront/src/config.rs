//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ESSENCE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ESSENCE_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `ESSENCE_HOST` - Bind address (default: 127.0.0.1)
//! - `ESSENCE_PORT` - Listen port (default: 3000)
//! - `ESSENCE_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `ESSENCE_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 100.00)
//! - `ESSENCE_FLAT_SHIPPING_RATE` - Shipping charged otherwise (default: 9.99)
//! - `ESSENCE_TAX_RATE` - Tax as a fraction of the subtotal (default: 0.08)
//! - `ESSENCE_LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use essence_core::Price;
use essence_core::pricing::PricingRules;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// How long the product catalog stays cached
    pub catalog_cache_ttl: Duration,
    /// Shipping and tax rules applied at checkout
    pub pricing: PricingRules,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ESSENCE_DATABASE_URL")?;
        let host: IpAddr = parse_env_or_default("ESSENCE_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default("ESSENCE_PORT", "3000")?;
        let base_url = get_required_env("ESSENCE_BASE_URL")?;
        validate_base_url(&base_url, "ESSENCE_BASE_URL")?;

        let cache_secs: u64 = parse_env_or_default("ESSENCE_CATALOG_CACHE_TTL_SECS", "300")?;
        let pricing = pricing_from_env()?;

        let json_logs = get_optional_env("ESSENCE_LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            catalog_cache_ttl: Duration::from_secs(cache_secs),
            pricing,
            json_logs,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

fn pricing_from_env() -> Result<PricingRules, ConfigError> {
    let defaults = PricingRules::default();

    let free_shipping_threshold = parse_price_env(
        "ESSENCE_FREE_SHIPPING_THRESHOLD",
        defaults.free_shipping_threshold,
    )?;
    let flat_shipping_rate =
        parse_price_env("ESSENCE_FLAT_SHIPPING_RATE", defaults.flat_shipping_rate)?;

    let tax_rate = match get_optional_env("ESSENCE_TAX_RATE") {
        Some(raw) => parse_tax_rate(&raw, "ESSENCE_TAX_RATE")?,
        None => defaults.tax_rate,
    };

    Ok(PricingRules {
        free_shipping_threshold,
        flat_shipping_rate,
        tax_rate,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_price_env(key: &str, default: Price) -> Result<Price, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    parse_price(&raw, key)
}

fn parse_price(raw: &str, key: &str) -> Result<Price, ConfigError> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Price::new(amount).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_tax_rate(raw: &str, key: &str) -> Result<Decimal, ConfigError> {
    let rate = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be between 0 and 1".to_string(),
        ));
    }
    Ok(rate)
}

/// Validate that the base URL is an absolute http(s) URL.
fn validate_base_url(value: &str, key: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/essence_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            catalog_cache_ttl: Duration::from_secs(300),
            pricing: PricingRules::default(),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!test_config("http://localhost:3000").is_secure());
        assert!(test_config("https://essence.shop").is_secure());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://essence.shop", "K").is_ok());
        assert!(validate_base_url("ftp://essence.shop", "K").is_err());
        assert!(validate_base_url("not a url", "K").is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(" 9.99 ", "K").unwrap(), Price::from_cents(999));
        assert!(matches!(
            parse_price("-1", "K"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_price("ten", "K").is_err());
    }

    #[test]
    fn test_parse_tax_rate_bounds() {
        assert_eq!(parse_tax_rate("0.08", "K").unwrap(), Decimal::new(8, 2));
        assert!(parse_tax_rate("8", "K").is_err());
        assert!(parse_tax_rate("-0.1", "K").is_err());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let debug_output = format!("{:?}", test_config("http://localhost:3000"));
        assert!(!debug_output.contains("essence_test"));
    }
}
