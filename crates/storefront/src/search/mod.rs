//! Debounced product search.
//!
//! Every input change goes through [`SearchDispatcher::on_input`]. Only the
//! lookup for the latest input runs, once the debounce delay has passed
//! without further input. Outcomes are sent back over a channel for the
//! owner of the listing state to apply with
//! [`Storefront::apply_search_result`](crate::state::Storefront::apply_search_result).

mod debounce;

pub use debounce::Debouncer;

use std::time::Duration;

use qkart_core::Product;
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{ApiError, QkartClient};

/// Result of one debounced lookup.
#[derive(Debug)]
pub struct SearchResult {
    /// The input that was searched for.
    pub query: String,
    pub outcome: Result<Vec<Product>, ApiError>,
}

/// Turns keystrokes into debounced search requests.
#[derive(Debug)]
pub struct SearchDispatcher {
    client: QkartClient,
    debouncer: Debouncer,
    results: mpsc::UnboundedSender<SearchResult>,
    latest: Option<String>,
}

impl SearchDispatcher {
    #[must_use]
    pub const fn new(
        client: QkartClient,
        delay: Duration,
        results: mpsc::UnboundedSender<SearchResult>,
    ) -> Self {
        Self {
            client,
            debouncer: Debouncer::new(delay),
            results,
            latest: None,
        }
    }

    /// Handle a change of the search input.
    ///
    /// Supersedes the lookup scheduled by the previous input unless it is
    /// already in flight.
    pub fn on_input(&mut self, text: impl Into<String>) {
        let query = text.into();
        self.latest = Some(query.clone());
        let client = self.client.clone();
        let results = self.results.clone();

        self.debouncer.schedule(async move {
            let outcome = client.search_products(&query).await;
            if results.send(SearchResult { query, outcome }).is_err() {
                debug!("Search result receiver dropped");
            }
        });
    }

    /// Drop the pending lookup, if any.
    ///
    /// Results of lookups already in flight are no longer current.
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
        self.latest = None;
    }

    /// Whether `result` answers the most recent input.
    ///
    /// A lookup that was in flight when newer input arrived can finish after
    /// the newer one; its result should be dropped.
    #[must_use]
    pub fn is_current(&self, result: &SearchResult) -> bool {
        self.latest.as_deref() == Some(result.query.as_str())
    }

    /// Whether a lookup is waiting for the debounce delay.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
