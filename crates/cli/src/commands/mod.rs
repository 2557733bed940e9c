//! Subcommand implementations.
//!
//! Failures are already shown to the user as notifications by the
//! storefront; commands only propagate them for the exit status.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod shell;
