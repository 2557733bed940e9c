//! QKart API client implementation.
//!
//! Uses `reqwest` for HTTP. Caches the product catalog using `moka`.

use std::sync::Arc;

use moka::future::Cache;
use qkart_core::{CartEntry, LoginForm, Product, RegisterRequest};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument};
use url::Url;

use super::ApiError;
use super::types::{ErrorBody, LoginResponse};
use crate::config::ApiConfig;

/// Cache key of the full product catalog.
const CATALOG_KEY: &str = "catalog";

/// Maximum characters of a response body copied into logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// QkartClient
// =============================================================================

/// Client for the QKart REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the catalog cache.
#[derive(Clone)]
pub struct QkartClient {
    inner: Arc<QkartClientInner>,
}

struct QkartClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl QkartClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .user_agent(concat!("qkart-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(QkartClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL all endpoints hang off.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build the URL of an endpoint below the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Send a request and decode a JSON success body.
    ///
    /// Non-success statuses become [`ApiError::Api`] carrying the server's
    /// `message` when the body has one.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let snippet = body.chars().take(LOG_BODY_LIMIT).collect::<String>();
            if status.is_server_error() {
                tracing::error!(status = %status, body = %snippet, "QKart API returned server error");
            } else {
                debug!(status = %status, body = %snippet, "QKart API returned client error");
            }
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: ErrorBody::message_from(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse QKart API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(products) = self.inner.cache.get(&CATALOG_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(products.as_ref().clone());
        }

        let url = self.endpoint("products")?;
        let products: Vec<Product> = self.send(self.inner.client.get(url)).await?;
        debug!(count = products.len(), "Fetched catalog");

        self.inner
            .cache
            .insert(CATALOG_KEY, Arc::new(products.clone()))
            .await;

        Ok(products)
    }

    /// Drop the cached catalog so the next `get_products` hits the API.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate(&CATALOG_KEY).await;
    }

    /// Search products by name or category.
    ///
    /// A 404 means nothing matched and is returned as an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error for any other failure.
    #[instrument(skip(self), fields(query = %text))]
    pub async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint("products/search")?;
        url.query_pairs_mut().append_pair("value", text);

        match self.send(self.inner.client.get(url)).await {
            Ok(products) => Ok(products),
            Err(e) if e.is_not_found() => {
                debug!("No products matched search");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("auth/login")?;
        self.send(self.inner.client.post(url).json(form)).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration or the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<(), ApiError> {
        let url = self.endpoint("auth/register")?;
        let _: IgnoredAny = self
            .send(self.inner.client.post(url).json(request))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the cart of the user owning `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        let url = self.endpoint("cart")?;
        self.send(self.inner.client.get(url).bearer_auth(token.expose_secret()))
            .await
    }

    /// Set the quantity of one product in the cart.
    ///
    /// Returns the full, authoritative cart after the update.
    ///
    /// # Errors
    ///
    /// Returns an error if the product doesn't exist, the token is rejected,
    /// or the request fails.
    #[instrument(skip(self, token), fields(product_id = %entry.product_id, qty = entry.qty))]
    pub async fn upsert_cart_entry(
        &self,
        token: &SecretString,
        entry: &CartEntry,
    ) -> Result<Vec<CartEntry>, ApiError> {
        let url = self.endpoint("cart")?;
        self.send(
            self.inner
                .client
                .post(url)
                .bearer_auth(token.expose_secret())
                .json(entry),
        )
        .await
    }
}

impl std::fmt::Debug for QkartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QkartClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> QkartClient {
        QkartClient::new(&ApiConfig {
            base_url: Url::parse(base).unwrap(),
            catalog_cache_ttl: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_below_base_path() {
        let client = client("http://localhost:8082/v1");
        assert_eq!(
            client.endpoint("products").unwrap().as_str(),
            "http://localhost:8082/v1/products"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = client("http://localhost:8082/v1/");
        assert_eq!(
            client.endpoint("cart").unwrap().as_str(),
            "http://localhost:8082/v1/cart"
        );
    }

    #[test]
    fn test_debug_shows_base_url() {
        let client = client("http://localhost:8082/v1");
        assert!(format!("{client:?}").contains("localhost:8082"));
    }
}
