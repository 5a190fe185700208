//! Wishlist entries.

use serde::{Deserialize, Serialize};

use mirrorcraft_core::{IdFields, Money, ProductId};

/// One saved product.
///
/// Snapshots written by older clients may carry the product identifier as
/// `id`, `productId` or `_id`; all three are accepted on read and resolved
/// through [`IdFields`]. New snapshots always write `productId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWishlistItem", rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub title: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl WishlistItem {
    /// Build an entry for `product_id`.
    #[must_use]
    pub fn new(product_id: ProductId, title: impl Into<String>, price: Money) -> Self {
        Self {
            product_id,
            title: title.into(),
            price,
            img: None,
        }
    }

    /// Attach an image URL.
    #[must_use]
    pub fn with_img(mut self, img: impl Into<String>) -> Self {
        self.img = Some(img.into());
        self
    }
}

#[derive(Deserialize)]
struct RawWishlistItem {
    #[serde(flatten)]
    ids: IdFields<ProductId>,
    #[serde(default, alias = "name")]
    title: String,
    #[serde(default)]
    price: Money,
    #[serde(default)]
    img: Option<String>,
}

impl TryFrom<RawWishlistItem> for WishlistItem {
    type Error = String;

    fn try_from(raw: RawWishlistItem) -> Result<Self, Self::Error> {
        let product_id = raw
            .ids
            .into_resolved()
            .ok_or_else(|| "wishlist entry has no id, productId or _id".to_string())?;
        Ok(Self {
            product_id,
            title: raw.title,
            price: raw.price,
            img: raw.img,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_accepts_all_identifier_shapes() {
        for body in [
            json!({"id": "p1", "title": "Oval"}),
            json!({"productId": "p1", "title": "Oval"}),
            json!({"_id": "p1", "title": "Oval"}),
        ] {
            let item: WishlistItem = serde_json::from_value(body).unwrap();
            assert_eq!(item.product_id.as_str(), "p1");
        }
    }

    #[test]
    fn test_rejects_missing_identifier() {
        let result: Result<WishlistItem, _> = serde_json::from_value(json!({"title": "Oval"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_writes_product_id() {
        let item = WishlistItem::new(ProductId::new("p1"), "Oval", Money::from_major(899))
            .with_img("/oval.jpg");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["productId"], "p1");
        assert_eq!(value["price"], "899");

        let back: WishlistItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }
}
