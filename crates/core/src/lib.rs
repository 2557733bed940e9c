//! QKart Core - Shared types library.
//!
//! This crate provides the types and pure logic used across all QKart components:
//! - `storefront` - API client, session handling and storefront state
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Wire types for products and carts, plus IDs, emails and statuses
//! - [`reconcile`] - Cart reconciliation, totals and quantity decisions
//! - [`forms`] - Login and registration validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod forms;
pub mod reconcile;
pub mod types;

pub use forms::{LoginForm, RegisterForm, RegisterRequest, ValidationError};
pub use reconcile::{
    CartRefusal, Intent, generate_cart_items_from, is_item_in_cart, resolve_cart_update,
    total_cart_value, total_quantity,
};
pub use types::*;
