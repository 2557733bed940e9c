//! Cart flows against the fake backend.
//!
//! Run with: cargo test -p qkart-integration-tests

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use qkart_core::{CartEntry, CartRefusal, Intent, NotificationLevel, ProductId};
use qkart_integration_tests::{MockBackend, TEST_EMAIL, TEST_PASSWORD, drain};
use qkart_storefront::Storefront;
use qkart_storefront::error::AppError;
use qkart_storefront::notify::Notification;
use rust_decimal::Decimal;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;

const HEADPHONES: &str = "BW0jAAeDJmlZCF8i";
const RACQUET: &str = "KCRwjF7lN97HnEaY";

/// A logged-in storefront with the catalog loaded and no notifications pending.
async fn shopper(backend: &MockBackend) -> (Storefront, UnboundedReceiver<Notification>) {
    let (mut storefront, mut rx) = backend.storefront();
    storefront.load_catalog().await.unwrap();
    storefront.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    drain(&mut rx);
    backend.clear_requests();
    (storefront, rx)
}

// ============================================================================
// Refusals
// ============================================================================

#[tokio::test]
async fn test_add_without_login_makes_no_request() {
    let backend = MockBackend::start().await;
    let (mut storefront, mut rx) = backend.storefront();
    storefront.load_catalog().await.unwrap();

    let err = storefront
        .add_or_update_cart_item(&ProductId::new(HEADPHONES), 1, Intent::None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Refused(CartRefusal::NotLoggedIn)));
    assert_eq!(
        drain(&mut rx),
        vec![Notification::warning("Login to add an item to the Cart")]
    );
    assert_eq!(backend.request_count("POST", "/v1/cart"), 0);
}

#[tokio::test]
async fn test_duplicate_add_makes_no_request() {
    let backend = MockBackend::start().await;
    let (mut storefront, mut rx) = shopper(&backend).await;
    let headphones = ProductId::new(HEADPHONES);

    storefront
        .add_or_update_cart_item(&headphones, 1, Intent::None)
        .await
        .unwrap();
    drain(&mut rx);

    let err = storefront
        .add_or_update_cart_item(&headphones, 1, Intent::None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Refused(CartRefusal::DuplicateItem)));
    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Warning);
    assert!(notifications[0].message.starts_with("Item already in cart"));
    assert_eq!(backend.request_count("POST", "/v1/cart"), 1);
}

// ============================================================================
// Updates
// ============================================================================

#[tokio::test]
async fn test_add_replaces_cart_with_server_response() {
    let backend = MockBackend::start().await;
    let (mut storefront, mut rx) = shopper(&backend).await;

    storefront
        .add_or_update_cart_item(&ProductId::new(HEADPHONES), 2, Intent::None)
        .await
        .unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![Notification::success("Item Successfully Added To Cart")]
    );
    assert_eq!(storefront.cart().items().len(), 1);
    assert_eq!(storefront.cart().total(), Decimal::new(100, 0));
    assert_eq!(backend.cart_of(TEST_EMAIL), vec![CartEntry::new(HEADPHONES, 2)]);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0]
            .authorization
            .as_deref()
            .is_some_and(|auth| auth.starts_with("Bearer "))
    );
}

#[tokio::test]
async fn test_increment_and_decrement() {
    let backend = MockBackend::start().await;
    backend.set_cart(TEST_EMAIL, vec![CartEntry::new(RACQUET, 1)]);
    let (mut storefront, _rx) = shopper(&backend).await;
    let racquet = ProductId::new(RACQUET);
    assert_eq!(storefront.cart().quantity_of(&racquet), Some(1));

    storefront
        .add_or_update_cart_item(&racquet, 1, Intent::Add)
        .await
        .unwrap();
    assert_eq!(storefront.cart().quantity_of(&racquet), Some(2));
    assert_eq!(storefront.cart().total(), Decimal::new(200, 0));

    storefront
        .add_or_update_cart_item(&racquet, 2, Intent::Remove)
        .await
        .unwrap();
    storefront
        .add_or_update_cart_item(&racquet, 1, Intent::Remove)
        .await
        .unwrap();

    assert!(storefront.cart().is_empty());
    assert_eq!(storefront.cart().total(), Decimal::ZERO);
    assert_eq!(
        backend.request_bodies("POST", "/v1/cart"),
        vec![
            json!({ "productId": RACQUET, "qty": 2 }),
            json!({ "productId": RACQUET, "qty": 1 }),
            json!({ "productId": RACQUET, "qty": 0 }),
        ]
    );
}

#[tokio::test]
async fn test_decrement_at_zero_submits_zero() {
    let backend = MockBackend::start().await;
    let (mut storefront, _rx) = shopper(&backend).await;

    storefront
        .add_or_update_cart_item(&ProductId::new(RACQUET), 0, Intent::Remove)
        .await
        .unwrap();

    assert_eq!(
        backend.request_bodies("POST", "/v1/cart"),
        vec![json!({ "productId": RACQUET, "qty": 0 })]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_unknown_product_shows_server_message() {
    let backend = MockBackend::start().await;
    let (mut storefront, mut rx) = shopper(&backend).await;

    let err = storefront
        .add_or_update_cart_item(&ProductId::new("doesNotExist0000"), 1, Intent::None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Remote { .. }));
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("Product doesn't exist")]
    );
    assert!(storefront.cart().is_empty());
}

#[tokio::test]
async fn test_server_error_keeps_cart() {
    let backend = MockBackend::start().await;
    backend.set_cart(TEST_EMAIL, vec![CartEntry::new(RACQUET, 1)]);
    let (mut storefront, mut rx) = shopper(&backend).await;
    backend.fail("POST", "/v1/cart", 500, Some("Internal failure"));

    storefront
        .add_or_update_cart_item(&ProductId::new(RACQUET), 1, Intent::Add)
        .await
        .unwrap_err();

    assert_eq!(drain(&mut rx), vec![Notification::error("Something Went Wrong")]);
    assert_eq!(storefront.cart().quantity_of(&ProductId::new(RACQUET)), Some(1));
}

#[tokio::test]
async fn test_cart_load_failures() {
    let backend = MockBackend::start().await;
    let (mut storefront, mut rx) = shopper(&backend).await;

    backend.fail("GET", "/v1/cart", 500, None);
    storefront.load_cart().await.unwrap_err();
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error(
            "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON."
        )]
    );

    backend.fail("GET", "/v1/cart", 400, Some("Cart is locked"));
    storefront.load_cart().await.unwrap_err();
    assert_eq!(drain(&mut rx), vec![Notification::error("Cart is locked")]);

    backend.clear_failures();
    storefront.load_cart().await.unwrap();
    assert!(drain(&mut rx).is_empty());
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_login_loads_cart_and_skips_unknown_products() {
    let backend = MockBackend::start().await;
    backend.set_cart(
        TEST_EMAIL,
        vec![
            CartEntry::new(HEADPHONES, 2),
            CartEntry::new("retiredProduct00", 4),
            CartEntry::new(RACQUET, 1),
        ],
    );
    let (storefront, _rx) = shopper(&backend).await;

    let ids: Vec<&str> = storefront
        .cart()
        .items()
        .iter()
        .map(|item| item.id().as_str())
        .collect();
    assert_eq!(ids, [HEADPHONES, RACQUET]);
    assert_eq!(storefront.cart().entries().len(), 3);
    assert_eq!(storefront.cart().total(), Decimal::new(200, 0));
}

#[tokio::test]
async fn test_catalog_after_cart_reconciles() {
    let backend = MockBackend::start().await;
    backend.set_cart(TEST_EMAIL, vec![CartEntry::new(HEADPHONES, 3)]);

    let (mut storefront, _rx) = backend.storefront();
    storefront.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert!(storefront.cart().is_empty());

    storefront.load_catalog().await.unwrap();
    assert_eq!(storefront.cart().total(), Decimal::new(150, 0));
}

#[tokio::test]
async fn test_refresh_drops_products_removed_from_catalog() {
    let backend = MockBackend::start().await;
    backend.set_cart(
        TEST_EMAIL,
        vec![CartEntry::new(HEADPHONES, 2), CartEntry::new(RACQUET, 1)],
    );
    let (mut storefront, _rx) = shopper(&backend).await;
    assert_eq!(storefront.cart().total(), Decimal::new(200, 0));

    backend.remove_product(RACQUET);

    // Served from the cache, so the racquet is still known
    storefront.load_catalog().await.unwrap();
    assert_eq!(storefront.cart().items().len(), 2);
    assert_eq!(backend.request_count("GET", "/v1/products"), 0);

    storefront.refresh_catalog().await.unwrap();
    assert_eq!(backend.request_count("GET", "/v1/products"), 1);
    assert_eq!(storefront.listing().catalog().len(), 4);
    assert_eq!(storefront.cart().items().len(), 1);
    assert_eq!(storefront.cart().entries().len(), 2);
    assert_eq!(storefront.cart().total(), Decimal::new(100, 0));
}
