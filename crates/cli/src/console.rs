//! Terminal output: notifications and tables.
//!
//! Tables go to stdout, notifications and logs to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt::Write as _;

use qkart_core::{Product, format_price};
use qkart_storefront::cart::CartState;
use qkart_storefront::catalog::{Listing, ListingStatus};
use qkart_storefront::notify::{Notification, Notifier};

/// Prints notifications to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{notification}");
    }
}

/// Write a block of output to stdout.
pub fn show(text: &str) {
    print!("{text}");
}

/// Render the listing: products on display, or why there are none.
#[must_use]
pub fn listing(listing: &Listing, cart: &CartState) -> String {
    match listing.status() {
        ListingStatus::Loading => "Loading Products...\n".to_string(),
        ListingStatus::Empty => "No products found\n".to_string(),
        ListingStatus::Ready => products(listing.shown(), cart),
    }
}

/// Render products as a table, marking those already in the cart.
#[must_use]
pub fn products(products: &[Product], cart: &CartState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<18} {:<32} {:<14} {:>10}  {:<5}  CART",
        "ID", "NAME", "CATEGORY", "COST", "RATING"
    );

    for product in products {
        let in_cart = cart
            .quantity_of(&product.id)
            .map_or_else(String::new, |qty| format!("x{qty}"));
        let _ = writeln!(
            out,
            "{:<18} {:<32} {:<14} {:>10}  {:<5}  {}",
            product.id.as_str(),
            truncate(&product.name, 32),
            truncate(&product.category, 14),
            format_price(product.cost),
            stars(product),
            in_cart,
        );
    }
    out
}

/// Render the cart with line totals and the order total.
#[must_use]
pub fn cart(cart: &CartState) -> String {
    if cart.is_empty() {
        return "Cart is empty. Add an item to the Cart\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<18} {:<32} {:>10} {:>5} {:>12}",
        "ID", "NAME", "COST", "QTY", "SUBTOTAL"
    );
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:<18} {:<32} {:>10} {:>5} {:>12}",
            item.id().as_str(),
            truncate(&item.product.name, 32),
            format_price(item.product.cost),
            item.qty,
            format_price(item.line_total()),
        );
    }
    let _ = writeln!(
        out,
        "Order total: {} ({} items)",
        format_price(cart.total()),
        cart.item_count()
    );
    out
}

fn stars(product: &Product) -> String {
    let filled = usize::from(product.stars());
    let empty = usize::from(qkart_core::MAX_RATING).saturating_sub(filled);
    format!("{}{}", "*".repeat(filled), ".".repeat(empty))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use qkart_core::{CartEntry, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, name: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: "Fashion".to_string(),
            cost: Decimal::new(cost, 0),
            rating: 4,
            image: String::new(),
        }
    }

    #[test]
    fn test_products_marks_cart_quantity() {
        let catalog = vec![product("A", "Shoes", 100), product("B", "Hat", 20)];
        let mut cart = CartState::new();
        cart.replace_entries(vec![CartEntry::new("A", 2)], &catalog);

        let table = products(&catalog, &cart);
        let line_a = table.lines().find(|l| l.starts_with('A')).unwrap_or_default();
        let line_b = table.lines().find(|l| l.starts_with('B')).unwrap_or_default();

        assert!(line_a.contains("$100.00"));
        assert!(line_a.contains("****."));
        assert!(line_a.ends_with("x2"));
        assert!(!line_b.contains('x'));
    }

    #[test]
    fn test_cart_shows_total() {
        let catalog = vec![product("A", "Shoes", 100), product("B", "Hat", 20)];
        let mut cart = CartState::new();
        cart.replace_entries(
            vec![CartEntry::new("A", 2), CartEntry::new("B", 1)],
            &catalog,
        );

        let rendered = super::cart(&cart);
        assert!(rendered.contains("$200.00"));
        assert!(rendered.ends_with("Order total: $220.00 (3 items)\n"));
    }

    #[test]
    fn test_empty_cart() {
        assert!(super::cart(&CartState::new()).starts_with("Cart is empty"));
    }

    #[test]
    fn test_listing_status_messages() {
        let cart = CartState::new();
        let mut listing = Listing::new();
        assert_eq!(super::listing(&listing, &cart), "Loading Products...\n");

        listing.set_catalog(vec![product("A", "Shoes", 100)]);
        listing.apply_search(Vec::new());
        assert_eq!(super::listing(&listing, &cart), "No products found\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long product name", 10), "a very ...");
    }
}
