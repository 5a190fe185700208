//! Mirrorcraft storefront client library.
//!
//! Local-first state for a storefront session: cart, wishlist, orders,
//! theme and the authenticated user, persisted to a key-value store and
//! reconciled with the remote REST API on a best-effort basis.
//!
//! Start with [`state::Storefront::open`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use state::Storefront;
