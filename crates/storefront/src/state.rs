//! Storefront state and the operations that change it.
//!
//! [`Storefront`] owns everything a front end displays: the session, the
//! product listing and the cart. It is mutated through `&mut self` only, so
//! there is a single writer and no locking. Every failure is reported,
//! turned into a notification and returned; prior state is left untouched.

use std::sync::Arc;

use qkart_core::{Intent, LoginForm, ProductId, RegisterForm, resolve_cart_update};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::api::{ApiError, QkartClient};
use crate::cart::CartState;
use crate::catalog::Listing;
use crate::config::StorefrontConfig;
use crate::error::{
    AppError, Result, add_breadcrumb, clear_sentry_user, fallback, set_sentry_user,
};
use crate::notify::{Notification, Notifier};
use crate::search::{SearchDispatcher, SearchResult};
use crate::session::{FileSessionStore, SessionContext, SessionStore};

/// Shown after a successful cart update.
pub const ITEM_ADDED: &str = "Item Successfully Added To Cart";
/// Shown after a successful login.
pub const LOGGED_IN: &str = "Logged in successfully";
/// Shown after a successful registration.
pub const REGISTERED: &str = "Registered successfully";

/// Storefront client state.
pub struct Storefront {
    config: StorefrontConfig,
    client: QkartClient,
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    session: SessionContext,
    listing: Listing,
    cart: CartState,
}

impl Storefront {
    /// Create a storefront with an anonymous session.
    ///
    /// Call [`load_session`](Self::load_session) to pick up a persisted login.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be built.
    pub fn new(
        config: StorefrontConfig,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> std::result::Result<Self, ApiError> {
        let client = QkartClient::new(&config.api)?;

        Ok(Self {
            config,
            client,
            sessions,
            notifier,
            session: SessionContext::anonymous(),
            listing: Listing::new(),
            cart: CartState::new(),
        })
    }

    /// Create a storefront persisting its session to the configured file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be built.
    pub fn from_config(
        config: StorefrontConfig,
        notifier: Arc<dyn Notifier>,
    ) -> std::result::Result<Self, ApiError> {
        let sessions = Arc::new(FileSessionStore::new(config.session_file.clone()));
        Self::new(config, sessions, notifier)
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn client(&self) -> &QkartClient {
        &self.client
    }

    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    #[must_use]
    pub const fn listing(&self) -> &Listing {
        &self.listing
    }

    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Report `err`, tell the user about it, and hand it back.
    fn surface(&self, err: AppError) -> AppError {
        err.report();
        self.notifier.notify(err.notification());
        err
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Restore the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but can't be read; the session
    /// stays anonymous.
    pub fn load_session(&mut self) -> Result<()> {
        let session = self
            .sessions
            .load()
            .map_err(|e| self.surface(e.into()))?;

        if let Some(username) = session.username()
            && session.is_logged_in()
        {
            set_sentry_user(username);
            debug!(username, "Restored session");
        }
        self.session = session;
        Ok(())
    }

    /// Log in with email and password.
    ///
    /// Blank checks ignore surrounding whitespace, but the email is sent as
    /// typed. On success the session is persisted and the cart is loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the API rejects the login.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let form = LoginForm::new(email, password);
        form.validate().map_err(|e| self.surface(e.into()))?;

        let response = self
            .client
            .login(&form)
            .await
            .map_err(|e| self.surface(AppError::remote(fallback::GENERIC, e)))?;

        let session = SessionContext::logged_in(
            SecretString::from(response.token),
            response.username,
            response.balance,
        );

        // A failed save keeps the user logged in for this run
        if let Err(e) = self.sessions.save(&session) {
            self.surface(e.into());
        }

        if let Some(username) = session.username() {
            set_sentry_user(username);
            info!(username, "Logged in");
        }
        self.session = session;
        self.notifier.notify(Notification::success(LOGGED_IN));

        if self.load_cart().await.is_err() {
            debug!("Cart not loaded after login");
        }
        Ok(())
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the API rejects the registration.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&mut self, form: &RegisterForm) -> Result<()> {
        let request = form.validate().map_err(|e| self.surface(e.into()))?;

        self.client
            .register(&request)
            .await
            .map_err(|e| self.surface(AppError::remote(fallback::GENERIC, e)))?;

        info!("Registered");
        self.notifier.notify(Notification::success(REGISTERED));
        Ok(())
    }

    /// Forget the session and the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session can't be removed; the
    /// in-memory session is cleared regardless.
    pub fn logout(&mut self) -> Result<()> {
        self.session = SessionContext::anonymous();
        self.cart.clear();
        clear_sentry_user();
        info!("Logged out");

        self.sessions.clear().map_err(|e| self.surface(e.into()))
    }

    // =========================================================================
    // Catalog and search
    // =========================================================================

    /// Fetch the catalog and display all of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog can't be fetched.
    #[instrument(skip(self))]
    pub async fn load_catalog(&mut self) -> Result<()> {
        let products = self
            .client
            .get_products()
            .await
            .map_err(|e| self.surface(AppError::remote(fallback::GENERIC, e)))?;

        self.listing.set_catalog(products);
        self.cart.reconcile(self.listing.catalog());
        Ok(())
    }

    /// Load the catalog unless one is already present.
    ///
    /// The displayed products and search state are kept when the catalog is
    /// already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog has to be fetched and can't be.
    pub async fn ensure_catalog(&mut self) -> Result<()> {
        if self.listing.catalog().is_empty() {
            self.load_catalog().await
        } else {
            Ok(())
        }
    }

    /// Drop the cached catalog and fetch it again.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog can't be fetched.
    #[instrument(skip(self))]
    pub async fn refresh_catalog(&mut self) -> Result<()> {
        self.client.invalidate_catalog().await;
        self.load_catalog().await
    }

    /// Search right away, without debouncing.
    ///
    /// # Errors
    ///
    /// Returns an error if the search request fails.
    pub async fn search(&mut self, text: &str) -> Result<()> {
        let outcome = self.client.search_products(text).await;
        self.apply_search_result(SearchResult {
            query: text.to_string(),
            outcome,
        })
    }

    /// Apply the outcome of a search to the listing.
    ///
    /// # Errors
    ///
    /// Returns the search failure after marking the listing empty.
    pub fn apply_search_result(&mut self, result: SearchResult) -> Result<()> {
        match result.outcome {
            Ok(products) => {
                debug!(query = %result.query, count = products.len(), "Search finished");
                self.listing.apply_search(products);
                Ok(())
            }
            Err(e) => {
                self.listing.search_failed();
                Err(self.surface(AppError::remote(fallback::SEARCH, e)))
            }
        }
    }

    /// Build a debounced search dispatcher sending its results to `results`.
    #[must_use]
    pub fn search_dispatcher(
        &self,
        results: mpsc::UnboundedSender<SearchResult>,
    ) -> SearchDispatcher {
        SearchDispatcher::new(self.client.clone(), self.config.search_debounce, results)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the cart of the logged-in user. No-op when logged out.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart can't be fetched; the previous cart is kept.
    #[instrument(skip(self))]
    pub async fn load_cart(&mut self) -> Result<()> {
        let Some(token) = self.session.token() else {
            debug!("Not logged in, skipping cart load");
            return Ok(());
        };

        let entries = self
            .client
            .get_cart(token)
            .await
            .map_err(|e| self.surface(AppError::remote(fallback::CART_FETCH, e)))?;

        self.cart.replace_entries(entries, self.listing.catalog());
        Ok(())
    }

    /// Add a product to the cart or change its quantity.
    ///
    /// With [`Intent::None`] `qty` is submitted as is and a product already in
    /// the cart is refused; [`Intent::Add`] and [`Intent::Remove`] adjust `qty`
    /// by one first. Refusals make no request. On success the cart is replaced
    /// with the server's response.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is refused or the request fails; the
    /// cart is left unchanged.
    #[instrument(skip(self))]
    pub async fn add_or_update_cart_item(
        &mut self,
        product_id: &ProductId,
        qty: u32,
        intent: Intent,
    ) -> Result<()> {
        add_breadcrumb(
            "cart",
            "Add or update cart item",
            Some(&[("product_id", product_id.as_str())]),
        );

        let entry = resolve_cart_update(
            self.session.token_str(),
            self.cart.items(),
            product_id,
            qty,
            intent,
        )
        .map_err(|refusal| self.surface(refusal.into()))?;

        let Some(token) = self.session.token() else {
            return Err(self.surface(qkart_core::CartRefusal::NotLoggedIn.into()));
        };

        let entries = self
            .client
            .upsert_cart_entry(token, &entry)
            .await
            .map_err(|e| self.surface(AppError::remote(fallback::CART_UPDATE, e)))?;

        self.cart.replace_entries(entries, self.listing.catalog());
        self.notifier.notify(Notification::success(ITEM_ADDED));
        Ok(())
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("client", &self.client)
            .field("session", &self.session)
            .field("listing", &self.listing)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}
