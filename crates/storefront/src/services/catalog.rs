//! Catalog service.
//!
//! Read-only access to products and categories. Responses are cached with
//! `moka` for the configured TTL. Read failures resolve to empty results so
//! a listing page degrades to "nothing to show" instead of an error.

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use mirrorcraft_core::ProductId;

use crate::api::conversions::{category_from_remote, product_from_remote};
use crate::api::types::{RemoteCategory, RemoteProduct};
use crate::api::{ApiClient, Auth, Envelope};
use crate::models::{Category, Product, ProductQuery};

/// Cached catalog responses.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
}

/// Catalog service.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl CatalogService {
    /// Create a service whose cache entries live for `ttl`.
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { api, cache }
    }

    /// Products matching `query` from `GET /products`.
    ///
    /// Search results are not cached.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Vec<Product> {
        let cache_key = format!(
            "products:{}:{}",
            query.category.as_deref().unwrap_or(""),
            query.page.unwrap_or(1)
        );
        let cacheable = query.search.is_none();

        if cacheable
            && let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return products;
        }

        let products: Vec<Product> = match self
            .api
            .get_with_query::<Envelope<Vec<RemoteProduct>>>(
                "products",
                &query.to_pairs(),
                Auth::Optional,
            )
            .await
        {
            Ok(body) => body
                .into_inner()
                .into_iter()
                .filter_map(product_from_remote)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load products");
                return Vec::new();
            }
        };

        if cacheable {
            self.cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }
        products
    }

    /// A single product from `GET /products/:id`.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Option<Product> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Some(*product);
        }

        let product = match self
            .api
            .get::<Envelope<RemoteProduct>>(&format!("products/{id}"), Auth::Optional)
            .await
        {
            Ok(body) => product_from_remote(body.into_inner())?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load product");
                return None;
            }
        };

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Some(product)
    }

    /// Every category from `GET /categories`.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Vec<Category> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return categories;
        }

        let categories: Vec<Category> = match self
            .api
            .get::<Envelope<Vec<RemoteCategory>>>("categories", Auth::Optional)
            .await
        {
            Ok(body) => body
                .into_inner()
                .into_iter()
                .filter_map(category_from_remote)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load categories");
                return Vec::new();
            }
        };

        self.cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;
        categories
    }

    /// Drop every cached response.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
