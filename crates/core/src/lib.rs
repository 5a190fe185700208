//! Mirrorcraft Core - Shared types library.
//!
//! This crate provides common types used across all Mirrorcraft components:
//! - `storefront` - Client-side state layer (cart, wishlist, orders, auth)
//! - `cli` - Command-line harness over a file-backed session
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
