//! Catalog product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Highest rating a product can carry.
pub const MAX_RATING: u8 = 5;

/// A purchasable product as returned by `GET /products`.
///
/// Immutable once fetched; the catalog cache owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier (`_id` on the wire).
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category the product belongs to (e.g. "Phones").
    pub category: String,
    /// Price of a single unit.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    /// Aggregate rating, 0 through 5.
    pub rating: u8,
    /// URL of the product image.
    pub image: String,
}

impl Product {
    /// Rating clamped to the 0-5 scale, for star rendering.
    #[must_use]
    pub fn stars(&self) -> u8 {
        self.rating.min(MAX_RATING)
    }
}
