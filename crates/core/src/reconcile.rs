//! Cart reconciliation.
//!
//! Joins the remote cart (a list of `{productId, qty}` pairs) against the
//! product catalog, totals the result, and decides what an add-to-cart or
//! quantity change should submit. Everything here is pure; the storefront
//! crate performs the actual request.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::types::{CartEntry, CartItem, Product, ProductId};

/// What the caller wants to do to a product's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Intent {
    /// Increase the quantity by one (cart "+" control).
    Add,
    /// Decrease the quantity by one, stopping at zero (cart "-" control).
    Remove,
    /// Submit the quantity unchanged (product card "Add to cart").
    #[default]
    None,
}

/// Reasons an add-or-update is refused before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartRefusal {
    /// No session token.
    #[error("Login to add an item to the Cart")]
    NotLoggedIn,

    /// The product is already in the cart and no quantity intent was given.
    #[error("Item already in cart. Use the cart sidebar to update quantity or remove item.")]
    DuplicateItem,
}

/// Build display items from cart entries, in entry order.
///
/// Entries whose product is not in `catalog` are skipped, so the result is
/// never longer than `entries` and every item maps to a catalog product.
#[must_use]
pub fn generate_cart_items_from(entries: &[CartEntry], catalog: &[Product]) -> Vec<CartItem> {
    let index: HashMap<&ProductId, &Product> = catalog.iter().map(|p| (&p.id, p)).collect();

    entries
        .iter()
        .filter_map(|entry| {
            let Some(product) = index.get(&entry.product_id) else {
                warn!(
                    product_id = %entry.product_id,
                    "Cart entry references a product missing from the catalog, skipping"
                );
                return None;
            };

            Some(CartItem {
                product: (*product).clone(),
                qty: entry.qty,
            })
        })
        .collect()
}

/// Sum of `cost × qty` across `items`; zero when empty.
///
/// Saturates at [`Decimal::MAX`] instead of overflowing, so any cart the
/// API can describe has a total.
#[must_use]
pub fn total_cart_value(items: &[CartItem]) -> Decimal {
    items
        .iter()
        .map(CartItem::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Total number of units across `items`.
#[must_use]
pub fn total_quantity(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.qty)).sum()
}

/// Whether `product_id` already has a line in `items`.
#[must_use]
pub fn is_item_in_cart(items: &[CartItem], product_id: &ProductId) -> bool {
    items.iter().any(|item| item.id() == product_id)
}

/// Apply `intent` to `qty`. Never goes below zero.
#[must_use]
pub const fn apply_intent(qty: u32, intent: Intent) -> u32 {
    match intent {
        Intent::Add => qty.saturating_add(1),
        Intent::Remove => qty.saturating_sub(1),
        Intent::None => qty,
    }
}

/// Decide what an add-or-update should submit to the remote cart.
///
/// # Errors
///
/// - [`CartRefusal::NotLoggedIn`] when `token` is empty
/// - [`CartRefusal::DuplicateItem`] when the product is already in
///   `current_items` and `intent` is [`Intent::None`]
pub fn resolve_cart_update(
    token: &str,
    current_items: &[CartItem],
    product_id: &ProductId,
    qty: u32,
    intent: Intent,
) -> Result<CartEntry, CartRefusal> {
    if token.is_empty() {
        return Err(CartRefusal::NotLoggedIn);
    }

    if intent == Intent::None && is_item_in_cart(current_items, product_id) {
        return Err(CartRefusal::DuplicateItem);
    }

    Ok(CartEntry {
        product_id: product_id.clone(),
        qty: apply_intent(qty, intent),
    })
}
