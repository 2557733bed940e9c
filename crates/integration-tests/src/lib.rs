//! Integration tests for the QKart storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```
//!
//! No external services are needed. [`MockBackend`] serves the QKart REST
//! API in-process with `axum` on an ephemeral port, seeded with a small
//! catalog and one registered user. Every request it receives is recorded,
//! so tests can assert that refused operations never reached the network.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await;
//! let (mut storefront, mut notifications) = backend.storefront();
//! storefront.login(TEST_EMAIL, TEST_PASSWORD).await?;
//! assert_eq!(backend.request_count("POST", "/v1/auth/login"), 1);
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use qkart_core::{CartEntry, Product, ProductId};
use qkart_storefront::Storefront;
use qkart_storefront::config::{ApiConfig, StorefrontConfig};
use qkart_storefront::notify::{ChannelNotifier, Notification};
use qkart_storefront::session::{MemorySessionStore, SessionStore};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Email of the user every backend starts with.
pub const TEST_EMAIL: &str = "crio.do@example.com";
/// Password of the seeded user.
pub const TEST_PASSWORD: &str = "learnbydoing";
/// Username of the seeded user.
pub const TEST_USERNAME: &str = "crio.do";
/// Wallet balance of every user.
pub const TEST_BALANCE: i64 = 5000;

/// Debounce delay used by [`MockBackend::config`].
pub const TEST_DEBOUNCE: Duration = Duration::from_millis(50);

/// A request as the fake backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// Raw request body; empty for `GET`.
    pub body: String,
}

#[derive(Debug, Clone)]
struct User {
    username: String,
    email: String,
    password: String,
}

/// A status and message the backend answers with instead of handling a route.
#[derive(Debug, Clone)]
struct Failure {
    status: StatusCode,
    message: Option<String>,
}

#[derive(Debug, Default)]
struct BackendData {
    products: Vec<Product>,
    users: Vec<User>,
    /// token -> email
    tokens: HashMap<String, String>,
    /// email -> cart
    carts: HashMap<String, Vec<CartEntry>>,
    requests: Vec<RecordedRequest>,
    /// (method, path) -> forced failure
    failures: HashMap<(String, String), Failure>,
}

#[derive(Debug, Clone, Default)]
struct Backend {
    data: Arc<Mutex<BackendData>>,
}

impl Backend {
    fn lock(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// MockBackend
// =============================================================================

/// In-process fake of the QKart REST API.
///
/// The server stops when this is dropped.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    backend: Backend,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend seeded with [`sample_products`] and the test user.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let backend = Backend::default();
        {
            let mut data = backend.lock();
            data.products = sample_products();
            data.users.push(User {
                username: TEST_USERNAME.to_string(),
                email: TEST_EMAIL.to_string(),
                password: TEST_PASSWORD.to_string(),
            });
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");

        let app = router(backend.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            backend,
            server,
        }
    }

    /// Base URL of the API, including the `/v1` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Storefront configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which would be a bug here.
    #[must_use]
    pub fn config(&self, session_file: impl Into<PathBuf>) -> StorefrontConfig {
        StorefrontConfig {
            api: ApiConfig::new(&self.base_url()).expect("Fake backend URL is valid"),
            session_file: session_file.into(),
            search_debounce: TEST_DEBOUNCE,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// A storefront with an in-memory session store.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client can't be built.
    #[must_use]
    pub fn storefront(&self) -> (Storefront, mpsc::UnboundedReceiver<Notification>) {
        self.storefront_with(Arc::new(MemorySessionStore::new()))
    }

    /// A storefront persisting its session to `sessions`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client can't be built.
    #[must_use]
    pub fn storefront_with(
        &self,
        sessions: Arc<dyn SessionStore>,
    ) -> (Storefront, mpsc::UnboundedReceiver<Notification>) {
        let (notifier, rx) = ChannelNotifier::channel();
        let storefront = Storefront::new(self.config("unused.json"), sessions, Arc::new(notifier))
            .expect("Failed to create storefront");
        (storefront, rx)
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.backend.lock().requests.clone()
    }

    /// Number of requests received for `method` and `path`.
    #[must_use]
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        self.backend
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Bodies of the requests received for `method` and `path`, parsed as JSON.
    #[must_use]
    pub fn request_bodies(&self, method: &str, path: &str) -> Vec<serde_json::Value> {
        self.backend
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .filter_map(|r| serde_json::from_str(&r.body).ok())
            .collect()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.backend.lock().requests.clear();
    }

    /// Answer `method path` with `status` and an error body until cleared.
    pub fn fail(&self, method: &str, path: &str, status: u16, message: Option<&str>) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.backend.lock().failures.insert(
            (method.to_string(), path.to_string()),
            Failure {
                status,
                message: message.map(String::from),
            },
        );
    }

    /// Stop forcing failures.
    pub fn clear_failures(&self) {
        self.backend.lock().failures.clear();
    }

    /// Replace the stored cart of the user with `email`.
    pub fn set_cart(&self, email: &str, entries: Vec<CartEntry>) {
        self.backend.lock().carts.insert(email.to_string(), entries);
    }

    /// The stored cart of the user with `email`.
    #[must_use]
    pub fn cart_of(&self, email: &str) -> Vec<CartEntry> {
        self.backend
            .lock()
            .carts
            .get(email)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove a product from the catalog, leaving carts untouched.
    pub fn remove_product(&self, id: &str) {
        self.backend
            .lock()
            .products
            .retain(|product| product.id.as_str() != id);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Drain every notification delivered so far.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        notifications.push(notification);
    }
    notifications
}

/// The catalog every backend starts with.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    let product = |id: &str, name: &str, category: &str, cost: i64, rating: u8| Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        cost: Decimal::new(cost, 0),
        rating,
        image: format!("https://i.imgur.com/{id}.jpg"),
    };

    vec![
        product("v4sLtEcMpzabRyfx", "iPhone XR", "Phones", 100, 4),
        product("upLK9JbQ4rMhTwt4", "Basketball", "Sports", 100, 5),
        product(
            "PmInA797xJhMIPti",
            "Tan Leatherette Weekender Duffle",
            "Fashion",
            150,
            4,
        ),
        product("KCRwjF7lN97HnEaY", "YONEX Smash Badminton Racquet", "Sports", 100, 5),
        product("BW0jAAeDJmlZCF8i", "Bluetooth Headphones", "Electronics", 50, 4),
    ]
}

// =============================================================================
// Routes
// =============================================================================

fn router(backend: Backend) -> Router {
    let api = Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/cart", get(get_cart).post(upsert_cart));

    Router::new()
        .nest("/v1", api)
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

/// Record the request, then answer with a forced failure if one is set.
async fn record(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let method = parts.method.to_string();
    let path = parts.uri.path().to_string();

    let failure = {
        let mut data = backend.lock();
        data.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: parts.uri.query().map(String::from),
            authorization: parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
        data.failures.get(&(method, path)).cloned()
    };

    match failure {
        Some(Failure {
            status,
            message: Some(message),
        }) => error(status, &message),
        Some(Failure {
            status,
            message: None,
        }) => status.into_response(),
        None => next.run(Request::from_parts(parts, Body::from(bytes))).await,
    }
}

async fn list_products(State(backend): State<Backend>) -> Json<Vec<Product>> {
    Json(backend.lock().products.clone())
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    value: String,
}

async fn search_products(
    State(backend): State<Backend>,
    Query(params): Query<SearchParams>,
) -> Response {
    let needle = params.value.to_lowercase();
    let matches: Vec<Product> = backend
        .lock()
        .products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    if matches.is_empty() {
        return error(StatusCode::NOT_FOUND, "No products found");
    }
    Json(matches).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(backend): State<Backend>, Json(body): Json<LoginBody>) -> Response {
    let mut data = backend.lock();

    let Some(user) = data.users.iter().find(|u| u.email == body.email).cloned() else {
        return error(StatusCode::BAD_REQUEST, "Username does not exist");
    };
    if user.password != body.password {
        return error(StatusCode::BAD_REQUEST, "Password is incorrect");
    }

    let token = format!("token-{}-{}", user.username, data.tokens.len() + 1);
    data.tokens.insert(token.clone(), user.email);

    Json(json!({
        "success": true,
        "token": token,
        "username": user.username,
        "balance": TEST_BALANCE,
    }))
    .into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

async fn register(State(backend): State<Backend>, Json(body): Json<RegisterBody>) -> Response {
    let mut data = backend.lock();

    if data.users.iter().any(|u| u.email == body.email) {
        return error(StatusCode::BAD_REQUEST, "Email is already taken");
    }
    data.users.push(User {
        username: body.name,
        email: body.email,
        password: body.password,
    });

    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

/// Email of the user owning the bearer token in `headers`.
fn authenticate(backend: &Backend, headers: &HeaderMap) -> Result<String, Response> {
    let unauthorized = || {
        error(
            StatusCode::UNAUTHORIZED,
            "Protected route, Oauth2 Bearer token not found",
        )
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;

    backend
        .lock()
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(unauthorized)
}

async fn get_cart(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let email = match authenticate(&backend, &headers) {
        Ok(email) => email,
        Err(response) => return response,
    };

    let cart = backend.lock().carts.get(&email).cloned().unwrap_or_default();
    Json(cart).into_response()
}

async fn upsert_cart(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(entry): Json<CartEntry>,
) -> Response {
    let email = match authenticate(&backend, &headers) {
        Ok(email) => email,
        Err(response) => return response,
    };

    let mut data = backend.lock();
    if !data.products.iter().any(|p| p.id == entry.product_id) {
        return error(StatusCode::NOT_FOUND, "Product doesn't exist");
    }

    let cart = data.carts.entry(email).or_default();
    match cart.iter().position(|e| e.product_id == entry.product_id) {
        Some(index) if entry.qty == 0 => {
            cart.remove(index);
        }
        Some(index) => {
            if let Some(existing) = cart.get_mut(index) {
                existing.qty = entry.qty;
            }
        }
        None if entry.qty > 0 => cart.push(entry),
        None => {}
    }

    Json(cart.clone()).into_response()
}
