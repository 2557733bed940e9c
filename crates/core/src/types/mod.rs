//! Core types for QKart.
//!
//! This module provides the wire types of the QKart API and type-safe
//! wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{CartEntry, CartItem};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::format_price;
pub use product::{MAX_RATING, Product};
pub use status::*;
