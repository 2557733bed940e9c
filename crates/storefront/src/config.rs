//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `QKART_API_URL` - Base URL of the QKart REST API (default: `http://localhost:8082/v1`)
//! - `QKART_SESSION_FILE` - Where the login session is persisted (default: `.qkart/session.json`)
//! - `QKART_SEARCH_DEBOUNCE_MS` - Quiet period before a search is sent (default: 500)
//! - `QKART_CATALOG_CACHE_TTL_SECS` - How long the product catalog is cached (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8082/v1";
const DEFAULT_SESSION_FILE: &str = ".qkart/session.json";
const DEFAULT_SEARCH_DEBOUNCE_MS: &str = "500";
const DEFAULT_CATALOG_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote API configuration
    pub api: ApiConfig,
    /// Path of the persisted session file
    pub session_file: PathBuf,
    /// Quiet period after the last keystroke before a search is sent
    pub search_debounce: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

/// QKart REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: Url,
    /// Time-to-live of the cached product catalog
    pub catalog_cache_ttl: Duration,
}

impl ApiConfig {
    /// API configuration for `base_url` with the default cache TTL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("QKART_API_URL", base_url)?,
            catalog_cache_ttl: Duration::from_secs(300),
        })
    }
}

impl StorefrontConfig {
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

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_base_url("QKART_API_URL", &get_or("QKART_API_URL", DEFAULT_API_URL))?;
        let catalog_cache_ttl = Duration::from_secs(parse_u64(
            "QKART_CATALOG_CACHE_TTL_SECS",
            &get_or("QKART_CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_CACHE_TTL_SECS),
        )?);
        let search_debounce = Duration::from_millis(parse_u64(
            "QKART_SEARCH_DEBOUNCE_MS",
            &get_or("QKART_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS),
        )?);
        let session_file = PathBuf::from(get_or("QKART_SESSION_FILE", DEFAULT_SESSION_FILE));

        Ok(Self {
            api: ApiConfig {
                base_url,
                catalog_cache_ttl,
            },
            session_file,
            search_debounce,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an absolute http(s) base URL.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

/// Parse an unsigned integer variable.
fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
