//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_BASE_URL` - Base URL of the storefront REST API (e.g. `https://shop.example/api/`)
//!
//! ## Optional
//! - `STOREFRONT_STATE_DIR` - Directory for the persisted key-value store (default: `.mirrorcraft`)
//! - `STOREFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `STOREFRONT_ORDERS_DEBOUNCE_SECS` - Window in which repeat order fetches are skipped (default: 30)
//! - `STOREFRONT_CATALOG_CACHE_TTL_SECS` - Catalog response cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Where the file-backed store keeps its snapshots
    pub state_dir: PathBuf,
    /// Repeat order fetches inside this window are skipped
    pub orders_debounce: Duration,
    /// Lifetime of cached catalog responses
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto. Always ends with `/`.
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Build from a base URL string with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("STOREFRONT_API_BASE_URL", base_url)?,
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }
}

impl StorefrontConfig {
    /// Default order fetch debounce window.
    pub const DEFAULT_ORDERS_DEBOUNCE: Duration = Duration::from_secs(30);

    /// Default catalog cache lifetime.
    pub const DEFAULT_CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("STOREFRONT_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_API_BASE_URL".to_string()))?;
        let base_url = parse_base_url("STOREFRONT_API_BASE_URL", &base_url)?;

        let state_dir = lookup("STOREFRONT_STATE_DIR")
            .map_or_else(|| PathBuf::from(".mirrorcraft"), PathBuf::from);

        let timeout = parse_secs(&lookup, "STOREFRONT_HTTP_TIMEOUT_SECS", 15)?;
        let orders_debounce = parse_secs(&lookup, "STOREFRONT_ORDERS_DEBOUNCE_SECS", 30)?;
        let catalog_cache_ttl = parse_secs(&lookup, "STOREFRONT_CATALOG_CACHE_TTL_SECS", 300)?;

        Ok(Self {
            api: ApiConfig { base_url, timeout },
            state_dir,
            orders_debounce,
            catalog_cache_ttl,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Configuration pointing at `base_url` with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is invalid.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiConfig::new(base_url)?,
            state_dir: PathBuf::from(".mirrorcraft"),
            orders_debounce: Self::DEFAULT_ORDERS_DEBOUNCE,
            catalog_cache_ttl: Self::DEFAULT_CATALOG_CACHE_TTL,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and normalise a base URL so relative joins append instead of replace.
fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let normalised = format!("{}/", raw.trim().trim_end_matches('/'));
    let url = Url::parse(&normalised)
        .map_err(|e| ConfigError::InvalidEnvVar(var.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a whole number of seconds with a default.
fn parse_secs<F>(lookup: &F, var: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).map_or(Ok(Duration::from_secs(default)), |raw| {
        raw.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(var.to_string(), e.to_string()))
    })
}
