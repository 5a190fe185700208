//! Mapping from wire types to local models.
//!
//! Every fallback between alternative field names happens here, so the rest
//! of the crate sees one shape per concept. Identifier fallbacks go through
//! [`IdFields::resolve`]; nothing else picks between `id`, `productId` and
//! `_id`.

use mirrorcraft_core::{IdFields, Money, ProductId};

use super::types::{
    AuthorRef, CategoryRef, ProductRef, RemoteBlog, RemoteCategory, RemoteOrder, RemoteOrderItem,
    RemoteProduct, RemoteUser, RemoteWishlistEntry,
};
use crate::models::{
    BlogPost, Category, Order, OrderItem, Product, UserProfile, WishlistItem,
};

/// First non-blank string.
fn first_text<'a>(candidates: impl IntoIterator<Item = Option<&'a String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// Catalog
// =============================================================================

impl RemoteProduct {
    fn display_title(&self) -> String {
        first_text([self.title.as_ref(), self.name.as_ref()]).unwrap_or_default()
    }

    fn image_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .images
            .iter()
            .map(|image| image.url().to_owned())
            .filter(|url| !url.is_empty())
            .collect();
        if urls.is_empty() {
            urls.extend(first_text([self.image.as_ref(), self.img.as_ref()]));
        }
        urls
    }
}

/// Convert a product document. Products without any identifier are dropped.
#[must_use]
pub fn product_from_remote(remote: RemoteProduct) -> Option<Product> {
    let title = remote.display_title();
    let images = remote.image_urls();
    let stock = remote
        .count_in_stock
        .or(remote.stock)
        .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX));
    let category = remote.category.and_then(|category| match category {
        CategoryRef::Named(name) => Some(name),
        CategoryRef::Populated(doc) => first_text([doc.name.as_ref(), doc.slug.as_ref()]),
    });

    Some(Product {
        id: remote.ids.into_resolved()?,
        title,
        price: remote.price.unwrap_or_default(),
        original_price: remote.original_price.or(remote.mrp),
        images,
        category,
        stock,
        description: remote.description,
    })
}

/// Convert a category document. Categories without an identifier are dropped.
#[must_use]
pub fn category_from_remote(remote: RemoteCategory) -> Option<Category> {
    let name = first_text([remote.name.as_ref(), remote.slug.as_ref()]).unwrap_or_default();
    Some(Category {
        id: remote.ids.into_resolved()?,
        name,
        slug: remote.slug,
        image: remote.image,
    })
}

// =============================================================================
// Wishlist
// =============================================================================

/// Convert a wishlist row.
///
/// The product reference (`productId`, bare or populated) wins over the
/// row's own `id` and `_id`. Rows that resolve to no identifier are dropped.
#[must_use]
pub fn wishlist_item_from_remote(entry: RemoteWishlistEntry) -> Option<WishlistItem> {
    let (referenced_id, populated) = match entry.product_id {
        Some(ProductRef::Id(id)) => (Some(id), entry.product),
        Some(ProductRef::Populated(doc)) => (doc.ids.resolve().cloned(), Some(*doc)),
        None => (
            entry.product.as_ref().and_then(|p| p.ids.resolve().cloned()),
            entry.product,
        ),
    };

    let ids = IdFields {
        id: entry.id,
        product_id: referenced_id,
        object_id: entry.object_id,
    };
    let product_id = ids.into_resolved()?;

    let title = first_text([
        entry.title.as_ref(),
        entry.name.as_ref(),
        populated.as_ref().and_then(|p| p.title.as_ref()),
        populated.as_ref().and_then(|p| p.name.as_ref()),
    ])
    .unwrap_or_default();
    let price = entry
        .price
        .or_else(|| populated.as_ref().and_then(|p| p.price))
        .unwrap_or(Money::ZERO);
    let img = first_text([entry.img.as_ref(), entry.image.as_ref()])
        .or_else(|| populated.and_then(|p| p.image_urls().into_iter().next()));

    Some(WishlistItem {
        product_id,
        title,
        price,
        img,
    })
}

// =============================================================================
// Orders
// =============================================================================

fn order_item_from_remote(remote: RemoteOrderItem) -> OrderItem {
    let (product_id, populated) = match remote.product {
        Some(ProductRef::Id(id)) => (Some(id), None),
        Some(ProductRef::Populated(doc)) => (doc.ids.resolve().cloned(), Some(*doc)),
        None => (None, None),
    };
    let product_id: Option<ProductId> = remote.product_id.or(product_id);

    let title = first_text([
        remote.name.as_ref(),
        remote.title.as_ref(),
        populated.as_ref().and_then(|p| p.title.as_ref()),
        populated.as_ref().and_then(|p| p.name.as_ref()),
    ])
    .unwrap_or_default();
    let price = remote
        .price
        .or_else(|| populated.as_ref().and_then(|p| p.price))
        .unwrap_or_default();
    let img = first_text([remote.image.as_ref(), remote.img.as_ref()])
        .or_else(|| populated.and_then(|p| p.image_urls().into_iter().next()));

    OrderItem {
        product_id,
        title,
        price,
        quantity: remote.quantity.unwrap_or(1).max(1),
        img,
    }
}

/// Convert an order document. Orders without an identifier are dropped.
#[must_use]
pub fn order_from_remote(remote: RemoteOrder) -> Option<Order> {
    let id = remote.ids.into_resolved()?;
    let items: Vec<OrderItem> = if remote.items.is_empty() {
        remote.order_items
    } else {
        remote.items
    }
    .into_iter()
    .map(order_item_from_remote)
    .collect();

    let total = remote
        .total_amount
        .or(remote.total_price)
        .or(remote.total)
        .unwrap_or_else(|| items.iter().map(|i| i.price.times(i.quantity)).sum());

    Some(Order {
        id,
        status: remote.order_status.or(remote.status).unwrap_or_default(),
        total,
        items,
        shipping_address: remote.shipping_address,
        created_at: remote.created_at,
    })
}

// =============================================================================
// Users
// =============================================================================

/// Convert a user document.
///
/// A lone `name` is split on the first space when first/last are absent.
#[must_use]
pub fn profile_from_remote(remote: RemoteUser) -> UserProfile {
    let (mut first_name, mut last_name) = (remote.first_name, remote.last_name);
    if first_name.is_none() && last_name.is_none() {
        if let Some(name) = remote.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            match name.split_once(' ') {
                Some((first, last)) => {
                    first_name = Some(first.to_owned());
                    last_name = Some(last.trim().to_owned());
                }
                None => first_name = Some(name.to_owned()),
            }
        }
    }

    UserProfile {
        id: remote.ids.into_resolved(),
        first_name,
        last_name,
        email: remote.email,
        phone: remote.phone,
        role: remote.role.unwrap_or_default(),
        date_of_birth: remote.date_of_birth,
        gender: remote.gender,
        preferences: remote.preferences.unwrap_or_default(),
    }
}

// =============================================================================
// Content
// =============================================================================

/// Convert a blog document. Posts without an identifier are dropped.
#[must_use]
pub fn blog_from_remote(remote: RemoteBlog) -> Option<BlogPost> {
    let author = remote.author.map(|author| match author {
        AuthorRef::Name(name) | AuthorRef::User { name } => name,
    });
    Some(BlogPost {
        id: remote.ids.into_resolved()?,
        title: remote.title.unwrap_or_default(),
        excerpt: remote.excerpt,
        content: remote.content,
        author,
        image: first_text([remote.cover_image.as_ref(), remote.image.as_ref()]),
        likes: remote.likes.map_or(0, |likes| likes.count()),
        tags: remote.tags,
        created_at: remote.created_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mirrorcraft_core::OrderStatus;
    use serde_json::json;

    use super::*;

    fn entry(value: serde_json::Value) -> RemoteWishlistEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_wishlist_row_prefers_product_reference() {
        let item = wishlist_item_from_remote(entry(json!({
            "_id": "row-1",
            "productId": "p-7",
            "title": "Oval Mirror",
            "price": 899
        })))
        .unwrap();
        assert_eq!(item.product_id.as_str(), "p-7");
        assert_eq!(item.price, Money::from_major(899));
    }

    #[test]
    fn test_wishlist_row_with_populated_product() {
        let item = wishlist_item_from_remote(entry(json!({
            "_id": "row-1",
            "productId": {"_id": "p-9", "name": "Arch Mirror", "price": "₹1,499", "images": ["/a.jpg"]}
        })))
        .unwrap();
        assert_eq!(item.product_id.as_str(), "p-9");
        assert_eq!(item.title, "Arch Mirror");
        assert_eq!(item.price, Money::from_major(1499));
        assert_eq!(item.img.as_deref(), Some("/a.jpg"));
    }

    #[test]
    fn test_wishlist_row_falls_back_to_row_ids() {
        let by_id = wishlist_item_from_remote(entry(json!({"_id": "x", "id": "p-1"}))).unwrap();
        assert_eq!(by_id.product_id.as_str(), "p-1");

        let by_object_id = wishlist_item_from_remote(entry(json!({"_id": "p-2"}))).unwrap();
        assert_eq!(by_object_id.product_id.as_str(), "p-2");

        assert!(wishlist_item_from_remote(entry(json!({"title": "orphan"}))).is_none());
    }

    #[test]
    fn test_order_from_remote() {
        let remote: RemoteOrder = serde_json::from_value(json!({
            "_id": "o1",
            "orderStatus": "Shipped",
            "orderItems": [
                {"product": {"_id": "p1", "name": "Arch"}, "price": 1000, "quantity": 2},
                {"productId": "p2", "name": "Oval", "price": "500"}
            ],
            "shippingAddress": {"city": "Pune"},
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        let order = order_from_remote(remote).unwrap();
        assert_eq!(order.id.as_str(), "o1");
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.total, Money::from_major(2500));
        assert_eq!(order.items[0].title, "Arch");
        assert_eq!(order.items[0].product_id.as_ref().unwrap().as_str(), "p1");
        assert_eq!(order.items[1].quantity, 1);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_order_prefers_explicit_total() {
        let remote: RemoteOrder = serde_json::from_value(json!({
            "id": "o2",
            "status": "processing",
            "totalAmount": 1299,
            "items": [{"name": "Arch", "price": 1000, "quantity": 1}]
        }))
        .unwrap();
        let order = order_from_remote(remote).unwrap();
        assert_eq!(order.total, Money::from_major(1299));
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn test_profile_splits_single_name() {
        let remote: RemoteUser = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Asha Rao",
            "email": "asha@example.in",
            "preferences": {"newsletter": true}
        }))
        .unwrap();
        let profile = profile_from_remote(remote);
        assert_eq!(profile.first_name.as_deref(), Some("Asha"));
        assert_eq!(profile.last_name.as_deref(), Some("Rao"));
        assert!(profile.preferences.newsletter);
        assert!(!profile.preferences.sms_updates);
    }

    #[test]
    fn test_product_from_remote() {
        let remote: RemoteProduct = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Sunburst",
            "price": "₹2,499",
            "mrp": 2999,
            "images": [{"url": "/s1.jpg"}, "/s2.jpg"],
            "category": {"_id": "c1", "name": "Wall Mirrors"},
            "countInStock": 4
        }))
        .unwrap();
        let product = product_from_remote(remote).unwrap();
        assert_eq!(product.title, "Sunburst");
        assert_eq!(product.price, Money::from_major(2499));
        assert_eq!(product.original_price, Some(Money::from_major(2999)));
        assert_eq!(product.images, vec!["/s1.jpg", "/s2.jpg"]);
        assert_eq!(product.category.as_deref(), Some("Wall Mirrors"));
        assert_eq!(product.stock, Some(4));
    }

    #[test]
    fn test_blog_from_remote() {
        let remote: RemoteBlog = serde_json::from_value(json!({
            "_id": "b1",
            "title": "Styling a hallway",
            "author": {"name": "Meera"},
            "likes": ["u1", "u2", "u3"]
        }))
        .unwrap();
        let blog = blog_from_remote(remote).unwrap();
        assert_eq!(blog.author.as_deref(), Some("Meera"));
        assert_eq!(blog.likes, 3);
    }
}
