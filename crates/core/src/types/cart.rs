//! Cart entry and cart item types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Product, ProductId};

/// A line of the remote cart: which product and how many.
///
/// This is what `GET /cart` and `POST /cart` exchange with the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product_id: ProductId,
    pub qty: u32,
}

impl CartEntry {
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

/// A cart entry joined with its catalog product, ready for display.
///
/// Serializes flat, the same shape as a product with an extra `qty` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub qty: u32,
}

impl CartItem {
    /// The product ID of this line.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// `cost × qty` for this line, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.cost.saturating_mul(Decimal::from(self.qty))
    }
}
