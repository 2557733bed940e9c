//! Cart state held by the storefront.
//!
//! The remote cart is authoritative. This keeps the last entries the API
//! returned and the display items reconciled against the catalog; it is only
//! replaced after a successful response, never updated optimistically.

use qkart_core::{
    CartEntry, CartItem, Product, ProductId, generate_cart_items_from, total_cart_value,
    total_quantity,
};
use rust_decimal::Decimal;

/// The user's cart as last confirmed by the API.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    entries: Vec<CartEntry>,
    items: Vec<CartItem>,
    total: Decimal,
}

impl CartState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cart with an authoritative server response.
    pub fn replace_entries(&mut self, entries: Vec<CartEntry>, catalog: &[Product]) {
        self.entries = entries;
        self.reconcile(catalog);
    }

    /// Rebuild the display items against `catalog`.
    ///
    /// Needed whenever the catalog arrives after the cart.
    pub fn reconcile(&mut self, catalog: &[Product]) {
        self.items = generate_cart_items_from(&self.entries, catalog);
        self.total = total_cart_value(&self.items);
    }

    /// Forget everything, e.g. on logout.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Raw entries from the last server response.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Display items, in server order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of `cost × qty` over the display items.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Total units across the display items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        total_quantity(&self.items)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of `product_id` in the cart, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.id() == product_id)
            .map(|item| item.qty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Fashion".to_string(),
            cost: Decimal::new(cost, 0),
            rating: 4,
            image: String::new(),
        }
    }

    #[test]
    fn test_replace_entries_reconciles() {
        let mut cart = CartState::new();
        cart.replace_entries(
            vec![CartEntry::new("A", 2), CartEntry::new("B", 1)],
            &[product("A", 100), product("B", 50)],
        );

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total(), Decimal::new(250, 0));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.quantity_of(&ProductId::new("A")), Some(2));
        assert_eq!(cart.quantity_of(&ProductId::new("Z")), None);
    }

    #[test]
    fn test_cart_before_catalog_fills_in_on_reconcile() {
        let mut cart = CartState::new();
        cart.replace_entries(vec![CartEntry::new("A", 2)], &[]);
        assert!(cart.is_empty());
        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.total(), Decimal::ZERO);

        cart.reconcile(&[product("A", 100)]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), Decimal::new(200, 0));
    }

    #[test]
    fn test_replace_entries_with_huge_amounts_saturates() {
        let mut yacht = product("A", 0);
        yacht.cost = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);

        let mut cart = CartState::new();
        cart.replace_entries(vec![CartEntry::new("A", u32::MAX)], &[yacht]);

        assert_eq!(cart.total(), Decimal::MAX);
        assert_eq!(cart.item_count(), u64::from(u32::MAX));
    }

    #[test]
    fn test_clear() {
        let mut cart = CartState::new();
        cart.replace_entries(vec![CartEntry::new("A", 1)], &[product("A", 10)]);
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.entries().is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
