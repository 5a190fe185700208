//! Wire types for the storefront REST API.
//!
//! These mirror what the server sends, including its inconsistencies:
//! identifiers under `id`, `productId` or `_id`, prices as numbers or
//! strings, references that are sometimes populated documents and sometimes
//! bare IDs. [`super::conversions`] maps them onto the local models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use mirrorcraft_core::{
    BlogId, CategoryId, IdFields, Money, OrderId, OrderStatus, ProductId, UserId, UserRole,
};

use crate::models::ShippingAddress;

// =============================================================================
// Envelopes
// =============================================================================

/// A response body that is either the payload itself or the payload under a
/// named field (`data`, `user`, `orders`, ...).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped(Wrapped<T>),
    Bare(T),
}

/// The wrapped form of an [`Envelope`].
#[derive(Debug, Deserialize)]
pub struct Wrapped<T> {
    #[serde(
        alias = "user",
        alias = "order",
        alias = "orders",
        alias = "wishlist",
        alias = "product",
        alias = "products",
        alias = "categories",
        alias = "blog",
        alias = "blogs",
        alias = "tracking"
    )]
    pub data: T,
}

/// Accept an RFC 3339 timestamp; anything else becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

impl<T> Envelope<T> {
    /// The payload, whichever form it arrived in.
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped(w) => w.data,
            Self::Bare(t) => t,
        }
    }
}

/// Error body shape: `{"message": ...}` or `{"error": ...}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    /// The first non-empty message.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.message
            .into_iter()
            .chain(self.error)
            .find(|m| !m.trim().is_empty())
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProduct {
    #[serde(flatten)]
    pub ids: IdFields<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub mrp: Option<Money>,
    #[serde(default)]
    pub images: Vec<RemoteImage>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub count_in_stock: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An image given either as a URL or as `{ "url": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RemoteImage {
    Url(String),
    Object { url: String },
}

impl RemoteImage {
    /// The image URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Object { url } => url,
        }
    }
}

/// A category document.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCategory {
    #[serde(flatten)]
    pub ids: IdFields<CategoryId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A product's category: a bare name/ID or a populated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Named(String),
    Populated(Box<RemoteCategory>),
}

/// A product reference: a bare ID or a populated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(ProductId),
    Populated(Box<RemoteProduct>),
}

// =============================================================================
// Wishlist
// =============================================================================

/// One wishlist row as returned by `GET /wishlist`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteWishlistEntry {
    #[serde(default, rename = "_id")]
    pub object_id: Option<ProductId>,
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default, rename = "productId")]
    pub product_id: Option<ProductRef>,
    #[serde(default)]
    pub product: Option<RemoteProduct>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// The wishlist payload: a list of rows, or a document holding them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RemoteWishlist {
    Entries(Vec<RemoteWishlistEntry>),
    Document {
        #[serde(alias = "items")]
        products: Vec<RemoteWishlistEntry>,
    },
}

impl RemoteWishlist {
    /// The rows, whichever form they arrived in.
    #[must_use]
    pub fn into_entries(self) -> Vec<RemoteWishlistEntry> {
        match self {
            Self::Entries(entries) | Self::Document { products: entries } => entries,
        }
    }
}

/// Body of `POST /wishlist/add`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest<'a> {
    pub product_id: &'a ProductId,
}

/// Body of `POST /cart/add`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest<'a> {
    pub product_id: &'a ProductId,
    pub quantity: u32,
}

// =============================================================================
// Orders
// =============================================================================

/// An order document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrder {
    #[serde(flatten)]
    pub ids: IdFields<OrderId>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub order_status: Option<OrderStatus>,
    #[serde(default)]
    pub total: Option<Money>,
    #[serde(default)]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub total_price: Option<Money>,
    #[serde(default)]
    pub items: Vec<RemoteOrderItem>,
    #[serde(default)]
    pub order_items: Vec<RemoteOrderItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A line of an order document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrderItem {
    #[serde(default)]
    pub product: Option<ProductRef>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

/// A user profile document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    #[serde(flatten)]
    pub ids: IdFields<UserId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub preferences: Option<crate::models::Preferences>,
}

/// Body of `POST /users/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    #[serde(default)]
    pub user: Option<RemoteUser>,
}

// =============================================================================
// Content
// =============================================================================

/// A blog post document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBlog {
    #[serde(flatten)]
    pub ids: IdFields<BlogId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub likes: Option<Likes>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A blog author: a display name or a populated user.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Name(String),
    User { name: String },
}

/// A like counter, or the list of users who liked.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Likes {
    Count(u64),
    Users(Vec<serde_json::Value>),
}

impl Likes {
    /// Number of likes.
    #[must_use]
    pub fn count(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Users(users) => u64::try_from(users.len()).unwrap_or(u64::MAX),
        }
    }
}

/// Response of `POST /blogs/:id/like`.
#[derive(Debug, Deserialize)]
pub struct LikeResponse {
    #[serde(default)]
    pub likes: Option<Likes>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_accepts_bare_and_wrapped() {
        let bare: Envelope<Vec<u32>> = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(bare.into_inner(), vec![1, 2]);

        let wrapped: Envelope<Vec<u32>> =
            serde_json::from_value(json!({"success": true, "data": [3]})).unwrap();
        assert_eq!(wrapped.into_inner(), vec![3]);

        let named: Envelope<Vec<u32>> = serde_json::from_value(json!({"orders": [4]})).unwrap();
        assert_eq!(named.into_inner(), vec![4]);
    }

    #[test]
    fn test_login_response_falls_back_to_bare() {
        let body = json!({"token": "t", "user": {"_id": "u1", "email": "a@b.in"}});
        let login: LoginResponse = serde_json::from_value::<Envelope<LoginResponse>>(body)
            .unwrap()
            .into_inner();
        assert_eq!(login.token, "t");
        assert_eq!(
            login.user.unwrap().ids.resolve().map(UserId::as_str),
            Some("u1")
        );
    }

    #[test]
    fn test_wishlist_document_and_list_forms() {
        let doc: RemoteWishlist =
            serde_json::from_value(json!({"products": [{"_id": "p1"}]})).unwrap();
        assert_eq!(doc.into_entries().len(), 1);

        let list: RemoteWishlist = serde_json::from_value(json!([{"productId": "p1"}])).unwrap();
        assert_eq!(list.into_entries().len(), 1);
    }

    #[test]
    fn test_product_ref_id_or_document() {
        let id: ProductRef = serde_json::from_value(json!("p9")).unwrap();
        assert!(matches!(id, ProductRef::Id(ref p) if p.as_str() == "p9"));

        let doc: ProductRef =
            serde_json::from_value(json!({"_id": "p9", "name": "Arch Mirror"})).unwrap();
        assert!(matches!(doc, ProductRef::Populated(_)));
    }

    #[test]
    fn test_likes_count() {
        let n: Likes = serde_json::from_value(json!(7)).unwrap();
        let users: Likes = serde_json::from_value(json!(["u1", "u2"])).unwrap();
        assert_eq!(n.count(), 7);
        assert_eq!(users.count(), 2);
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_value(json!({"message": "", "error": "bad"})).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bad"));
    }
}
