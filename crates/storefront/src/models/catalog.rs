//! Catalog view shapes.

use serde::Serialize;

use mirrorcraft_core::{CategoryId, Money, ProductId};

use super::CartProduct;

/// A product as shown on listing and detail pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Money,
    pub original_price: Option<Money>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub description: Option<String>,
}

impl Product {
    /// First image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product can be bought at all. Unknown stock counts as
    /// available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock != Some(0)
    }

    /// Clamp a requested quantity to `1..=stock`.
    ///
    /// `None` when the product is out of stock; nothing may be added.
    /// Unknown stock only enforces the lower bound.
    #[must_use]
    pub fn clamp_quantity(&self, requested: u32) -> Option<u32> {
        let requested = requested.max(1);
        match self.stock {
            Some(0) => None,
            Some(stock) => Some(requested.min(stock)),
            None => Some(requested),
        }
    }

    /// The shape the cart takes.
    #[must_use]
    pub fn to_cart_product(&self) -> CartProduct {
        CartProduct {
            id: self.id.clone(),
            title: self.title.clone(),
            price: self.price,
            img: self.primary_image().map(str::to_owned),
        }
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Option<String>,
    pub image: Option<String>,
}

/// Filters for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl ProductQuery {
    /// Query-string pairs. Unset filters are left out.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: Option<u32>) -> Product {
        Product {
            id: ProductId::new("p1"),
            title: "Arch Mirror".to_string(),
            price: Money::from_major(1499),
            original_price: None,
            images: vec!["/arch.jpg".to_string()],
            category: None,
            stock,
            description: None,
        }
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(product(Some(3)).clamp_quantity(5), Some(3));
        assert_eq!(product(Some(3)).clamp_quantity(0), Some(1));
        assert_eq!(product(None).clamp_quantity(40), Some(40));
    }

    #[test]
    fn test_out_of_stock_refuses_any_quantity() {
        let sold_out = product(Some(0));
        assert!(!sold_out.in_stock());
        assert_eq!(sold_out.clamp_quantity(2), None);
        assert_eq!(sold_out.clamp_quantity(0), None);
    }

    #[test]
    fn test_to_cart_product() {
        let cart = product(None).to_cart_product();
        assert_eq!(cart.id.as_str(), "p1");
        assert_eq!(cart.img.as_deref(), Some("/arch.jpg"));
    }

    #[test]
    fn test_query_pairs_skip_unset() {
        let query = ProductQuery {
            category: Some("wall".to_string()),
            page: Some(2),
            ..ProductQuery::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![("category", "wall".to_string()), ("page", "2".to_string())]
        );
    }
}
