//! Request and response bodies of the QKart API that are not core types.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Successful `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// `{ "success": false, "message": "..." }` error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extract the message from a raw response body, if it is an error body.
    #[must_use]
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .and_then(|b| b.message)
    }
}
