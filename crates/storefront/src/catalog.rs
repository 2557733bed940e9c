//! Product listing state.
//!
//! Holds the full catalog, the products currently displayed (the catalog or
//! the last non-empty search result), and whether the last search found
//! nothing.

use qkart_core::Product;

/// What the product listing should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    /// Nothing to show yet.
    Loading,
    /// The last search found nothing.
    Empty,
    /// Products are available.
    Ready,
}

/// Catalog plus the products on display.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    all: Vec<Product>,
    shown: Vec<Product>,
    no_data_found: bool,
}

impl Listing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly fetched catalog and display all of it.
    pub fn set_catalog(&mut self, products: Vec<Product>) {
        self.shown.clone_from(&products);
        self.all = products;
        self.no_data_found = false;
    }

    /// Apply a successful search result.
    ///
    /// An empty result only raises `no_data_found`; the previously displayed
    /// products are left alone.
    pub fn apply_search(&mut self, results: Vec<Product>) {
        if results.is_empty() {
            self.no_data_found = true;
        } else {
            self.shown = results;
            self.no_data_found = false;
        }
    }

    /// Record a failed search.
    pub const fn search_failed(&mut self) {
        self.no_data_found = true;
    }

    /// The full catalog.
    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.all
    }

    /// Products on display.
    #[must_use]
    pub fn shown(&self) -> &[Product] {
        &self.shown
    }

    #[must_use]
    pub const fn no_data_found(&self) -> bool {
        self.no_data_found
    }

    #[must_use]
    pub fn status(&self) -> ListingStatus {
        if self.no_data_found {
            ListingStatus::Empty
        } else if self.shown.is_empty() {
            ListingStatus::Loading
        } else {
            ListingStatus::Ready
        }
    }
}
