//! QKart storefront client library.
//!
//! Talks to the QKart REST API and keeps the state a front end displays:
//! the login session, the product listing with debounced search, and the
//! cart reconciled against the catalog.
//!
//! # Modules
//!
//! - [`api`] - HTTP client for the remote API
//! - [`state`] - [`Storefront`](state::Storefront), the owner of all client state
//! - [`cart`], [`catalog`] - Cart and listing state
//! - [`search`] - Debounced search dispatch
//! - [`session`] - Session context and persistence
//! - [`notify`] - User-facing notifications
//! - [`config`], [`error`] - Configuration and error handling

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod search;
pub mod session;
pub mod state;

pub use state::Storefront;
