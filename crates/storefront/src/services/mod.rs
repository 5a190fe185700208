//! Stateless services over the storefront API.
//!
//! # Services
//!
//! - `auth` - Login, registration, session and profile
//! - `catalog` - Products and categories, cached
//! - `content` - Blog posts, likes and the contact form

pub mod auth;
pub mod catalog;
pub mod content;

pub use auth::{AuthError, AuthService};
pub use catalog::CatalogService;
pub use content::{ContentError, ContentService};
