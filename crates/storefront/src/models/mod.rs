//! Domain models for the storefront client.
//!
//! These are the shapes state managers own and persist. Remote payloads live
//! in [`crate::api::types`] and are converted at the boundary.

mod cart;
mod catalog;
mod content;
mod order;
mod user;
mod wishlist;

pub use cart::{CartItem, CartProduct};
pub use catalog::{Category, Product, ProductQuery};
pub use content::{BlogPost, Enquiry};
pub use order::{Order, OrderItem, ShippingAddress, TrackingEvent, TrackingInfo};
pub use user::{Preferences, ProfileUpdate, RegisterRequest, UserProfile};
pub use wishlist::WishlistItem;
