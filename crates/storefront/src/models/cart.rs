//! Cart line items.

use serde::{Deserialize, Serialize};

use mirrorcraft_core::{Money, ProductId};

/// What a caller hands the cart when adding a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Money,
    pub img: Option<String>,
}

/// One line of the cart.
///
/// Unique by `id` within a cart; `quantity` is never below 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    #[serde(alias = "name")]
    pub title: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// A fresh line for `product`.
    #[must_use]
    pub fn new(product: CartProduct, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            img: product.img,
            quantity,
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_legacy_snapshot_shape() {
        let item: CartItem = serde_json::from_value(json!({
            "id": 17,
            "name": "Sunburst Wall Mirror",
            "price": "₹1,234",
            "img": "/img/sunburst.jpg",
            "quantity": 2
        }))
        .unwrap();

        assert_eq!(item.id.as_str(), "17");
        assert_eq!(item.title, "Sunburst Wall Mirror");
        assert_eq!(item.line_total(), Money::from_major(2468));
    }
}
