//! QKart REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`
//! - The remote API is the source of truth for carts and accounts; nothing is
//!   synced locally beyond the session credentials
//! - The product catalog is cached in memory via `moka`
//!
//! # Endpoints
//!
//! - `GET /products`, `GET /products/search?value=<text>`
//! - `POST /auth/login`, `POST /auth/register`
//! - `GET /cart`, `POST /cart` (bearer token)
//!
//! # Example
//!
//! ```rust,ignore
//! use qkart_storefront::api::QkartClient;
//!
//! let client = QkartClient::new(&config.api)?;
//! let products = client.get_products().await?;
//! let cart = client.get_cart(&token).await?;
//! ```

mod client;
pub mod types;

pub use client::QkartClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the QKart API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, timeout, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("API error: {status} - {}", message.as_deref().unwrap_or("(no message)"))]
    Api {
        status: u16,
        /// `message` from the `{success: false, message}` error body, if any.
        message: Option<String>,
    },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of an API error response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the server put in its error body.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// Whether the server answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 400,
            message: Some("Password is incorrect".to_string()),
        };
        assert_eq!(err.to_string(), "API error: 400 - Password is incorrect");

        let err = ApiError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "API error: 500 - (no message)");
    }

    #[test]
    fn test_server_message_ignores_blank() {
        let err = ApiError::Api {
            status: 400,
            message: Some("  ".to_string()),
        };
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_is_not_found() {
        let err = ApiError::Api {
            status: 404,
            message: None,
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }
}
