//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for storefront operations. Every error
//! maps onto a user-facing [`Notification`]; remote and local failures are
//! captured to Sentry before being surfaced.

use qkart_core::{CartRefusal, NotificationLevel, ValidationError};
use thiserror::Error;

use crate::api::ApiError;
use crate::notify::Notification;
use crate::session::SessionError;

/// Generic messages shown when the server doesn't provide one.
pub mod fallback {
    /// Login, registration and catalog loading.
    pub const GENERIC: &str = "Something went wrong";
    /// Cart loading.
    pub const CART_FETCH: &str = "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON.";
    /// Cart updates.
    pub const CART_UPDATE: &str = "Something Went Wrong";
    /// Product search.
    pub const SEARCH: &str = "Something Went Wrong. Please Reload The Page";
    /// Session persistence.
    pub const SESSION: &str = "Could not save your login on this device";
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A form failed local validation; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A cart action was refused locally; nothing was sent.
    #[error("Refused: {0}")]
    Refused(#[from] CartRefusal),

    /// The remote API call failed.
    #[error("{fallback}: {source}")]
    Remote {
        /// Message to show when the server gave none.
        fallback: &'static str,
        #[source]
        source: ApiError,
    },

    /// The session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl AppError {
    /// Wrap an API failure with the message to fall back to.
    #[must_use]
    pub const fn remote(fallback: &'static str, source: ApiError) -> Self {
        Self::Remote { fallback, source }
    }

    /// The text the user should see.
    ///
    /// Client errors (4xx) show the server's message when it sent one.
    /// Server errors and transport failures show the generic fallback so
    /// internal details don't leak.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Refused(refusal) => refusal.to_string(),
            Self::Remote { fallback, source } => source
                .status()
                .filter(|status| (400..500).contains(status))
                .and(source.server_message())
                .unwrap_or(fallback)
                .to_string(),
            Self::Session(_) => fallback::SESSION.to_string(),
        }
    }

    /// How prominently the user should be told.
    #[must_use]
    pub const fn severity(&self) -> NotificationLevel {
        match self {
            Self::Refused(_) => NotificationLevel::Warning,
            Self::Validation(_) | Self::Remote { .. } | Self::Session(_) => NotificationLevel::Error,
        }
    }

    /// The notification describing this error.
    #[must_use]
    pub fn notification(&self) -> Notification {
        Notification::new(self.severity(), self.user_message())
    }

    /// Whether this error points at a fault worth tracking in Sentry.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Refused(_) => false,
            Self::Remote { source, .. } => source.status().is_none_or(|status| status >= 500),
            Self::Session(_) => true,
        }
    }

    /// Log the error, capturing reportable ones to Sentry.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Storefront operation refused");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after login to associate errors with the user.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Updated quantity", Some(&[("product_id", "KCRwjF7lN97HnEaY")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
